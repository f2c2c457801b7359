//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, Response, StatusCode, Uri};
use gatekeeper_proxy::config::ProxyConfig;
use gatekeeper_proxy::error::UpstreamError;
use gatekeeper_proxy::http::{UpstreamClient, UpstreamFuture};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// In-memory upstream that records every outbound request.
///
/// Host `server.error` fails at the transport level, `?start=now` answers
/// "now", anything else answers "ok".
#[derive(Debug, Default)]
pub struct MockUpstream {
    seen: Mutex<Vec<SeenRequest>>,
}

/// An outbound request as the upstream received it.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl MockUpstream {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn last(&self) -> SeenRequest {
        self.seen.lock().unwrap().last().cloned().expect("no upstream request recorded")
    }
}

impl UpstreamClient for MockUpstream {
    fn send(&self, request: Request<Bytes>) -> UpstreamFuture<'_> {
        Box::pin(async move {
            let host = request.uri().host().unwrap_or_default().to_string();
            let query = request.uri().query().unwrap_or_default().to_string();
            let (parts, body) = request.into_parts();
            self.seen.lock().unwrap().push(SeenRequest {
                method: parts.method,
                uri: parts.uri,
                headers: parts.headers,
                body,
            });

            if host == "server.error" {
                return Err(UpstreamError::new("dial tcp: lookup server.error: no such host"));
            }

            let body = if query.contains("start=now") { "now" } else { "ok" };
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header("connection", "keep-alive")
                .header("x-upstream", "mock")
                .body(Body::from(body))
                .unwrap())
        })
    }
}

/// Config with the allowlist and open endpoints used across tests.
pub fn test_config(destination: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.upstream.destination = destination.to_string();
    config.access.basic_auth_allowed = vec!["user:pass".into(), "foo:bar".into()];
    config.access.open_endpoints = vec!["/ping".into(), "/public".into()];
    config
}

/// Start a backend on an ephemeral port that answers 200 with the raw bytes
/// of the request it received.
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let received = read_request(&mut socket).await;
                        let head = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\nX-Backend: echo\r\n\r\n",
                            received.len()
                        );
                        let _ = socket.write_all(head.as_bytes()).await;
                        let _ = socket.write_all(&received).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a backend whose responses are chosen by request target.
///
/// `route` maps the target (`/path?query`) to a status line such as
/// `"302 Found"`, extra headers, and a body.
pub async fn start_routed_backend<F>(route: F) -> SocketAddr
where
    F: Fn(&str) -> (&'static str, Vec<(&'static str, String)>, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let route = Arc::new(route);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let route = route.clone();
                    tokio::spawn(async move {
                        let received = read_request(&mut socket).await;
                        let head = String::from_utf8_lossy(&received);
                        let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();

                        let (status, headers, body) = (*route)(&target);
                        let mut response = format!(
                            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n",
                            body.len()
                        );
                        for (name, value) in headers {
                            response.push_str(&format!("{name}: {value}\r\n"));
                        }
                        response.push_str("\r\n");
                        response.push_str(&body);

                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return buf,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        let Some(head_end) = find(&buf, b"\r\n\r\n") else { continue };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();

        if head.contains("transfer-encoding: chunked") {
            if buf.ends_with(b"0\r\n\r\n") {
                return buf;
            }
            continue;
        }

        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= head_end + 4 + content_length {
            return buf;
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

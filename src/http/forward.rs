//! Forwarding engine.
//!
//! Turns an admitted inbound request into an outbound one for the single
//! upstream destination, dispatches it once, and relays the response.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    http::{header, Request},
    response::Response,
};

use crate::error::ProxyError;
use crate::http::client::UpstreamClient;
use crate::http::request::{forwarded_host, outbound_uri, RequestId};
use crate::http::response::relay;
use crate::security::headers::{append_forwarded_for, copy_headers, strip_hop_by_hop};

/// Builds and dispatches outbound requests. Immutable after construction.
#[derive(Debug, Clone)]
pub struct Forwarder {
    destination: String,
    client: Arc<dyn UpstreamClient>,
}

impl Forwarder {
    pub fn new(destination: impl Into<String>, client: Arc<dyn UpstreamClient>) -> Self {
        Self {
            destination: destination.into(),
            client,
        }
    }

    /// Forward `inbound` to the destination and relay the upstream response.
    pub async fn forward(
        &self,
        request_id: &RequestId,
        inbound: Request<Body>,
    ) -> Result<Response, ProxyError> {
        let (parts, body) = inbound.into_parts();

        // A fixed-length body makes the client send Content-Length instead
        // of chunked encoding, which some gateway-style upstreams drop.
        let body = match axum::body::to_bytes(body, usize::MAX).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    error = %e,
                    "Unable to read body from inbound request"
                );
                Bytes::new()
            }
        };

        let uri = outbound_uri(&self.destination, &parts.uri);
        let scheme = uri
            .as_ref()
            .and_then(|uri| uri.scheme_str())
            .unwrap_or_default()
            .to_string();

        let mut outbound = Request::new(body);
        *outbound.method_mut() = parts.method;
        copy_headers(outbound.headers_mut(), &parts.headers);
        // The outbound Host comes from the destination, and the length from
        // the materialized body (which is empty if the read failed).
        outbound.headers_mut().remove(header::HOST);
        outbound.headers_mut().remove(header::CONTENT_LENGTH);

        let uri = match uri {
            Some(uri) if scheme == "http" || scheme == "https" => uri,
            _ => {
                let err = ProxyError::UnsupportedScheme(scheme);
                tracing::warn!(request_id = %request_id, "{}", err);
                return Err(err);
            }
        };

        let host = forwarded_host(&uri).unwrap_or_default().to_string();
        append_forwarded_for(outbound.headers_mut(), &host);
        strip_hop_by_hop(outbound.headers_mut());
        *outbound.uri_mut() = uri.clone();

        let response = match self.client.send(outbound).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "Upstream dispatch failed");
                return Err(ProxyError::UpstreamUnreachable(e));
            }
        };

        tracing::info!(
            request_id = %request_id,
            uri = %uri,
            status = %response.status(),
            "Upstream responded"
        );

        Ok(relay(response))
    }
}

//! Upstream HTTP client capability.
//!
//! The forwarder only needs one operation: submit a fully built request and
//! get back a response or a transport error. Keeping it behind a trait lets
//! tests substitute an in-memory upstream.

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

use axum::{
    body::{Body, Bytes},
    http::{Request, Response},
};

use crate::error::UpstreamError;

pub type UpstreamFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Response<Body>, UpstreamError>> + Send + 'a>>;

pub trait UpstreamClient: Send + Sync + Debug {
    /// Dispatch a single request. No retries.
    fn send(&self, request: Request<Bytes>) -> UpstreamFuture<'_>;
}

/// `reqwest`-backed client used in production.
///
/// Follows up to 10 redirects (reqwest's default policy) and relays the
/// final response.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, UpstreamError> {
        let inner = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { inner })
    }
}

impl UpstreamClient for HttpClient {
    fn send(&self, request: Request<Bytes>) -> UpstreamFuture<'_> {
        Box::pin(async move {
            let request = reqwest::Request::try_from(request)?;
            let response = self.inner.execute(request).await?;

            let mut builder = Response::builder()
                .status(response.status())
                .version(response.version());
            if let Some(headers) = builder.headers_mut() {
                *headers = response.headers().clone();
            }
            builder
                .body(Body::from_stream(response.bytes_stream()))
                .map_err(UpstreamError::new)
        })
    }
}

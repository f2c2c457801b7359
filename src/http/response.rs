//! Response relay.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers from the upstream response
//! - Copy the remaining headers and the status to the caller's response
//! - Stream the upstream body through unchanged
//!
//! # Design Decisions
//! - The body is streamed, not buffered; dropping the response releases
//!   the upstream connection on early exit

use axum::{body::Body, http::Response as HttpResponse, response::Response};

use crate::security::headers::{copy_headers, strip_hop_by_hop};

/// Convert an upstream response into the caller's response.
pub fn relay(upstream: HttpResponse<Body>) -> Response {
    let (mut parts, body) = upstream.into_parts();
    strip_hop_by_hop(&mut parts.headers);

    let mut response = Response::new(body);
    *response.status_mut() = parts.status;
    copy_headers(response.headers_mut(), &parts.headers);
    response
}

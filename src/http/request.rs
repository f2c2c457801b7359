//! Request identity and outbound request construction.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for log correlation
//! - Build the outbound URI from the destination base and inbound path
//! - Decode the inbound path for access checks
//!
//! # Design Decisions
//! - The request ID is passed explicitly; it is never written to headers
//! - The inbound path and query are appended verbatim (no rewriting)

use std::borrow::Cow;
use std::fmt;

use axum::http::Uri;
use percent_encoding::percent_decode_str;
use uuid::Uuid;

/// Per-request correlation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Concatenate `destination` with the inbound path and query.
///
/// Returns `None` when the result is not a valid URI.
pub fn outbound_uri(destination: &str, inbound: &Uri) -> Option<Uri> {
    let path_and_query = inbound
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| inbound.path());
    format!("{destination}{path_and_query}").parse().ok()
}

/// Percent-decoded path, for matching against open endpoints.
///
/// Invalid UTF-8 after decoding is replaced rather than rejected.
pub fn decoded_path(uri: &Uri) -> Cow<'_, str> {
    percent_decode_str(uri.path()).decode_utf8_lossy()
}

/// Host part of the URI authority, without port or IPv6 brackets.
pub fn forwarded_host(uri: &Uri) -> Option<&str> {
    uri.host()
        .map(|host| host.trim_start_matches('[').trim_end_matches(']'))
}

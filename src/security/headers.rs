//! Header manipulation for forwarded requests and relayed responses.
//!
//! # Responsibilities
//! - Copy header sets without losing repeated values
//! - Strip hop-by-hop headers in both directions
//! - Chain X-Forwarded-For
//!
//! # Design Decisions
//! - Names are matched case-insensitively (`HeaderName` is lowercase)
//! - Prior X-Forwarded-For values are folded into a single header

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Headers meaningful only for a single connection.
/// See <http://www.w3.org/Protocols/rfc2616/rfc2616-sec13.html>.
pub static HOP_BY_HOP_HEADERS: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    HeaderName::from_static("trailers"),
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Append every (name, value) pair of `src` onto `dst`.
pub fn copy_headers(dst: &mut HeaderMap, src: &HeaderMap) {
    for (name, value) in src {
        dst.append(name.clone(), value.clone());
    }
}

/// Remove all hop-by-hop headers, including every repeated value.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP_HEADERS.iter() {
        headers.remove(name);
    }
}

/// Append `host` to X-Forwarded-For.
///
/// With no prior header the result is `host`; otherwise prior values are
/// joined with `", "` and `host` is appended the same way.
pub fn append_forwarded_for(headers: &mut HeaderMap, host: &str) {
    let mut chain: Vec<&str> = headers
        .get_all(&X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    chain.push(host);

    match HeaderValue::from_str(&chain.join(", ")) {
        Ok(value) => {
            headers.insert(X_FORWARDED_FOR, value);
        }
        Err(e) => {
            tracing::warn!(host, error = %e, "Could not encode X-Forwarded-For; leaving header unchanged");
        }
    }
}

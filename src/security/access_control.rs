//! Basic-auth allowlist and open endpoints.
//!
//! A request is let through when it carries credentials from the allowlist,
//! whatever the path. Without them, only paths matching an open endpoint
//! pattern pass. Patterns are unanchored regular expressions, so `/ping` also
//! opens `/api/ping/status`; anchor with `^...$` for exact paths.

use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;

use crate::config::AccessConfig;

/// A `username:password` pair from the allowlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parse `username:password`, splitting at the first colon.
    pub fn parse(entry: &str) -> Option<Self> {
        let (username, password) = entry.split_once(':')?;
        Some(Self::new(username, password))
    }

    /// Extract credentials from an `Authorization: Basic ...` header.
    ///
    /// Returns `None` when the header is absent, uses another scheme, or does
    /// not decode to `username:password`.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let (scheme, encoded) = value.split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        Self::parse(&decoded)
    }
}

/// Compiled open-endpoint patterns.
#[derive(Debug, Clone, Default)]
pub struct OpenEndpoints {
    patterns: Vec<Regex>,
}

impl OpenEndpoints {
    /// Compile the patterns. Invalid ones are logged and skipped, so they
    /// never open a path.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|pattern| {
                let pattern = pattern.as_ref();
                match Regex::new(pattern) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        tracing::warn!(
                            pattern,
                            error = %e,
                            "Failed to compile open endpoint pattern; treating as non-match"
                        );
                        None
                    }
                }
            })
            .collect();
        Self { patterns }
    }

    /// True if any pattern matches somewhere in `path`.
    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(path))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// The access control gate. Immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct AccessControl {
    allowed: Vec<Credential>,
    open_endpoints: OpenEndpoints,
}

impl AccessControl {
    pub fn new(allowed: Vec<Credential>, open_endpoints: OpenEndpoints) -> Self {
        Self {
            allowed,
            open_endpoints,
        }
    }

    /// Build the gate from configuration. Allowlist entries without a colon
    /// are logged and ignored.
    pub fn from_config(config: &AccessConfig) -> Self {
        let allowed = config
            .basic_auth_allowed
            .iter()
            .filter_map(|entry| {
                let credential = Credential::parse(entry);
                if credential.is_none() {
                    tracing::warn!("Ignoring basic auth entry without ':' separator");
                }
                credential
            })
            .collect();

        Self::new(allowed, OpenEndpoints::compile(config.open_endpoints.as_slice()))
    }

    /// True if the credentials exactly match an allowlist entry.
    pub fn is_authenticated(&self, credentials: Option<&Credential>) -> bool {
        credentials.is_some_and(|given| self.allowed.iter().any(|c| c == given))
    }

    /// True if no open endpoint pattern matches `path`.
    pub fn is_private(&self, path: &str) -> bool {
        !self.open_endpoints.matches(path)
    }

    pub fn is_allowed(&self, path: &str, credentials: Option<&Credential>) -> bool {
        self.is_authenticated(credentials) || !self.is_private(path)
    }

    pub fn allowed_count(&self) -> usize {
        self.allowed.len()
    }

    pub fn open_endpoint_count(&self) -> usize {
        self.open_endpoints.len()
    }
}

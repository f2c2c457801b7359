//! Basic-auth gated single-upstream reverse proxy.

pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod security;

pub use config::schema::ProxyConfig;
pub use error::{ProxyError, UpstreamError};
pub use http::HttpServer;

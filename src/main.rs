//! Gatekeeper proxy.
//!
//! Forwards every request to one upstream, requiring basic auth on all paths
//! except the configured open endpoints.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request      ┌──────────┐    ┌────────────┐    ┌──────────┐
//!     ───────────────────▶│  server  │───▶│   access   │───▶│ forwarder│───▶ Upstream
//!                         │ (axum)   │    │  control   │    │          │
//!     Client Response     └──────────┘    └────────────┘    └────┬─────┘
//!     ◀──────────────────────────────────────────────────────────┘ relay
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use gatekeeper_proxy::config::{self, validation::validate_config, ConfigError, ProxyConfig};
use gatekeeper_proxy::observability::init_logging;
use gatekeeper_proxy::http::shutdown_signal;
use gatekeeper_proxy::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "gatekeeper-proxy", version)]
#[command(about = "Reverse proxy enforcing a basic auth allowlist outside open endpoints")]
#[command(long_about = "Reverse proxy enforcing a basic auth allowlist outside open endpoints.\n\n\
The following environment variables must be set:\n\n  \
BASIC_AUTH_ALLOWED\n    a list of comma-separated basic auth user:pass pairs\n  \
OPEN_ENDPOINTS\n    a list of comma-separated path patterns")]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// The binding for this proxy
    #[arg(long)]
    addr: Option<String>,

    /// Proxied destination
    #[arg(long)]
    dest: Option<String>,

    /// Comma-separated basic auth user:pass pairs
    #[arg(long, env = "BASIC_AUTH_ALLOWED", hide_env_values = true)]
    basic_auth_allowed: Option<String>,

    /// Comma-separated open endpoint patterns
    #[arg(long, env = "OPEN_ENDPOINTS")]
    open_endpoints: Option<String>,
}

impl Cli {
    /// Layer command line and environment values over the loaded config.
    fn resolve(self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(addr) = self.addr {
            config.listener.bind_address = normalize_addr(&addr);
        }
        if let Some(dest) = self.dest {
            config.upstream.destination = dest;
        }
        if let Some(raw) = self.basic_auth_allowed {
            config.access.basic_auth_allowed = config::parse_list(&raw);
        }
        if let Some(raw) = self.open_endpoints {
            config.access.open_endpoints = config::parse_list(&raw);
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

/// Accept the `:8080` shorthand for all interfaces.
fn normalize_addr(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().resolve()?;

    init_logging(&config.observability);

    tracing::info!("gatekeeper-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        destination = %config.upstream.destination,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

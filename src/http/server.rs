//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing)
//! - Run the access control gate before forwarding
//! - Bind server to listener and shut down gracefully

use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::error::{ProxyError, UpstreamError};
use crate::http::client::{HttpClient, UpstreamClient};
use crate::http::forward::Forwarder;
use crate::http::request::{decoded_path, RequestId};
use crate::security::{AccessControl, Credential};

/// Application state injected into handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub access: Arc<AccessControl>,
    pub forwarder: Arc<Forwarder>,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server that dispatches through the default HTTP client.
    pub fn new(config: ProxyConfig) -> Result<Self, UpstreamError> {
        let client = Arc::new(HttpClient::new()?);
        Ok(Self::with_client(config, client))
    }

    /// Create a server with an injected upstream client.
    pub fn with_client(config: ProxyConfig, client: Arc<dyn UpstreamClient>) -> Self {
        let access = AccessControl::from_config(&config.access);
        tracing::info!(
            credentials = access.allowed_count(),
            open_endpoints = access.open_endpoint_count(),
            "Access control configured"
        );

        let state = AppState {
            access: Arc::new(access),
            forwarder: Arc::new(Forwarder::new(config.upstream.destination.clone(), client)),
        };

        let router = build_router(state);
        Self { router, config }
    }

    /// The router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` resolves. In-flight requests are drained first.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            destination = %self.config.upstream.destination,
            "Listening, proxying requests"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolves on Ctrl+C. If the handler cannot be installed the server runs
/// until the process is killed.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/{*path}", any(proxy_handler))
        .route("/", any(proxy_handler))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Main proxy handler: gate, then forward.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = RequestId::new();

    tracing::info!(
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
        "Inbound request"
    );

    let credentials = Credential::from_headers(request.headers());
    let path = decoded_path(request.uri());
    if !state.access.is_allowed(&path, credentials.as_ref()) {
        let err = ProxyError::AuthorizationDenied;
        tracing::info!(request_id = %request_id, "{}", err);
        return err.into_response();
    }

    match state.forwarder.forward(&request_id, request).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

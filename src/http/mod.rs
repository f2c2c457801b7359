//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, access control gate)
//!     → forward.rs (body materialization, header rewrite, scheme check)
//!     → client.rs (single dispatch to the upstream)
//!     → response.rs (strip hop-by-hop, relay status/headers/body)
//!     → Send to client
//! ```

pub mod client;
pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use client::{HttpClient, UpstreamClient, UpstreamFuture};
pub use forward::Forwarder;
pub use request::RequestId;
pub use server::{shutdown_signal, AppState, HttpServer};

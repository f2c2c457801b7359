//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → access_control.rs (basic-auth allowlist, open endpoints)
//!     → headers.rs (copy, strip hop-by-hop, X-Forwarded-For)
//!     → Pass to forwarder
//! ```
//!
//! # Design Decisions
//! - Gate runs before any upstream contact
//! - Invalid open-endpoint patterns fail closed (path stays private)

pub mod access_control;
pub mod headers;

pub use access_control::{AccessControl, Credential, OpenEndpoints};

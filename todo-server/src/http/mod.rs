//! HTTP server layer
//!
//! Axum server with:
//! - Request ids and request tracing
//! - Graceful shutdown
//! - Status-only error responses

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, listen, run_server, serve, shutdown_signal, AppState, ServerError};

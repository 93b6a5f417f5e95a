//! Route handlers organized by resource

pub mod todos;

use axum::http::StatusCode;

/// Fallback for every path and method the server does not serve.
pub async fn not_implemented() -> (StatusCode, &'static str) {
    (StatusCode::NOT_IMPLEMENTED, "Not Implemented")
}

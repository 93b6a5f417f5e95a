//! Axum server setup
//!
//! Server skeleton with:
//! - `x-request-id` on every request and response
//! - Tracing middleware, one span per request
//! - Graceful shutdown driven by a caller-supplied future

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Request;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::config::Config;
use crate::db::pool::{create_pool, PoolError};
use crate::db::repos::{TodoRepo, TodoStore};

/// Shared application state
pub struct AppState {
    pub todos: Arc<dyn TodoStore>,
}

impl AppState {
    pub fn new(todos: impl TodoStore + 'static) -> Self {
        Self {
            todos: Arc::new(todos),
        }
    }
}

/// Build the application router.
///
/// Only `GET /todo` and `POST /todo` are served; everything else is 501.
pub fn build_router(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");

            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        }))
        .layer(PropagateRequestIdLayer::x_request_id());

    Router::new()
        .merge(routes::todos::router())
        .fallback(routes::not_implemented)
        .layer(middleware)
        .with_state(Arc::new(state))
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Bind `bind_addr` and serve until `shutdown` resolves.
pub async fn run_server<F>(state: AppState, bind_addr: SocketAddr, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(bind_addr).await?;
    serve(listener, state, shutdown).await
}

/// Connect to the database and serve until `shutdown` resolves.
///
/// The pool is closed once the server has drained.
///
/// # Example
///
/// ```ignore
/// let config = Config::builder().log_level("info").build()?;
/// listen(config, shutdown_signal()).await?;
/// ```
pub async fn listen<F>(config: Config, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::debug!(dsn = %config.database.redacted_dsn(), "connecting to database");
    let pool = create_pool(&config.database).await.inspect_err(|e| {
        tracing::error!(error = %e, "could not connect to database");
    })?;

    let repo = TodoRepo::new(pool.clone()).with_timeout(config.database.query_timeout);
    let result = run_server(AppState::new(repo), config.bind_addr, shutdown).await;

    pool.close().await;
    result
}

/// Wait for a termination signal (Ctrl+C, SIGTERM, SIGHUP or SIGQUIT).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let (terminate, hangup, quit) = {
        use tokio::signal::unix::SignalKind;
        (
            unix_signal(SignalKind::terminate(), "SIGTERM"),
            unix_signal(SignalKind::hangup(), "SIGHUP"),
            unix_signal(SignalKind::quit(), "SIGQUIT"),
        )
    };

    #[cfg(not(unix))]
    let (terminate, hangup, quit) = (
        std::future::pending::<()>(),
        std::future::pending::<()>(),
        std::future::pending::<()>(),
    );

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
        _ = hangup => {
            tracing::info!("Received SIGHUP, starting shutdown");
        }
        _ = quit => {
            tracing::info!("Received SIGQUIT, starting shutdown");
        }
    }
}

#[cfg(unix)]
async fn unix_signal(kind: tokio::signal::unix::SignalKind, name: &'static str) {
    match tokio::signal::unix::signal(kind) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            tracing::error!("failed to install {} handler: {}", name, e);
            std::future::pending::<()>().await;
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

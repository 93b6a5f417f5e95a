//! todo-server: HTTP API for todo items
//!
//! `GET /todo` lists todos (or fetches one with `?id=`), `POST /todo`
//! creates one. Todos live in PostgreSQL behind [`db::TodoStore`].

pub mod config;
pub mod db;
pub mod http;
pub mod models;

pub use config::{Config, ConfigBuilder, ConfigError, DatabaseConfig, LogLevel};
pub use db::{DbError, TodoRepo, TodoStore};
pub use http::{build_router, listen, shutdown_signal, AppState, ServerError};
pub use models::{NewTodo, Todo};

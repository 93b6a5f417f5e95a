//! Todo endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::not_implemented;
use crate::http::error::ApiError;
use crate::http::extractors::{TodoIdQuery, TodoPayload};
use crate::http::server::AppState;
use crate::models::Todo;

/// GET /todo - list all todos, or one when `?id=` is given
async fn list_or_get_todos(
    State(state): State<Arc<AppState>>,
    TodoIdQuery(id): TodoIdQuery,
) -> Result<Response, ApiError> {
    match id {
        Some(id) => {
            let todo = state.todos.get(id).await?;
            Ok(Json(todo).into_response())
        }
        None => {
            let todos = state.todos.list().await?;
            Ok(Json(todos).into_response())
        }
    }
}

/// POST /todo - create a todo
async fn create_todo(
    State(state): State<Arc<AppState>>,
    TodoPayload(new): TodoPayload,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let todo = state.todos.insert(new).await?;
    tracing::info!(id = %todo.id, "created todo");

    Ok((StatusCode::CREATED, Json(todo)))
}

/// Todo routes. Other methods on `/todo` answer 501.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/todo",
        get(list_or_get_todos)
            .post(create_todo)
            // axum would otherwise answer HEAD through the GET handler
            .head(not_implemented)
            .fallback(not_implemented),
    )
}

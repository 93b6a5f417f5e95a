//! Custom Axum extractors
//!
//! Both reject with [`ApiError::Validation`], so malformed input is turned
//! away before a handler touches the store.

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use uuid::Uuid;

use super::error::ApiError;
use crate::models::{CreateTodoRequest, NewTodo, ValidationError};

/// Optional `id` query parameter.
///
/// Absent yields `None`. Present but empty, or not a UUID, is rejected.
/// When `id` is repeated, the first value is used.
#[derive(Debug)]
pub struct TodoIdQuery(pub Option<Uuid>);

impl<S> FromRequestParts<S> for TodoIdQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs): Query<Vec<(String, String)>> = Query::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                ApiError::Validation(ValidationError::InvalidFormat {
                    field: "query",
                    reason: "malformed query string",
                })
            })?;

        let Some((_, id)) = pairs.into_iter().find(|(key, _)| key == "id") else {
            return Ok(Self(None));
        };

        if id.is_empty() {
            return Err(ApiError::Validation(ValidationError::Empty { field: "id" }));
        }

        let uuid = Uuid::parse_str(&id).map_err(|_| {
            ApiError::Validation(ValidationError::InvalidFormat {
                field: "id",
                reason: "invalid UUID format",
            })
        })?;

        Ok(Self(Some(uuid)))
    }
}

/// JSON body of a create request, decoded and validated.
///
/// The body is decoded regardless of `Content-Type`.
#[derive(Debug)]
pub struct TodoPayload(pub NewTodo);

impl<S> FromRequest<S> for TodoPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await.map_err(|e| {
            ApiError::Validation(ValidationError::MalformedBody {
                reason: e.body_text(),
            })
        })?;

        let request: CreateTodoRequest = serde_json::from_slice(&body).map_err(|e| {
            ApiError::Validation(ValidationError::MalformedBody {
                reason: e.to_string(),
            })
        })?;

        Ok(Self(request.validate()?))
    }
}

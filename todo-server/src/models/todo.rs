//! Todo record and its creation payload

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ValidationError;

/// Todo record as stored and as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub is_done: bool,
    pub message: String,
}

/// Body of `POST /todo`.
///
/// `id` and `created_at` are not part of the payload: serde skips unknown
/// fields, so values a client sends for them are dropped here and the
/// repository assigns its own.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub is_done: bool,
    pub message: String,
}

impl CreateTodoRequest {
    /// Validate into a candidate the repository accepts.
    pub fn validate(self) -> Result<NewTodo, ValidationError> {
        Ok(NewTodo {
            is_done: self.is_done,
            message: TodoMessage::new(self.message)?,
        })
    }
}

/// Validated todo message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoMessage(String);

impl TodoMessage {
    /// Create a new message.
    ///
    /// # Rules
    /// - Non-empty
    ///
    /// # Example
    /// ```
    /// use todo_server::models::TodoMessage;
    ///
    /// assert!(TodoMessage::new("Lorem ipsum").is_ok());
    /// assert!(TodoMessage::new("").is_err());
    /// ```
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "message" });
        }
        Ok(Self(s))
    }

    /// Get the message as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for TodoMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validated todo candidate, before the store assigns `id` and `created_at`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub is_done: bool,
    pub message: TodoMessage,
}

//! Todo repository
//!
//! Translates list/get/insert into parameterized queries against the
//! `todo` table. The repository is the only writer of that table.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{found_as, row_as, rows_as, with_deadline, DbError};
use crate::config::DEFAULT_QUERY_TIMEOUT;
use crate::models::{NewTodo, Todo};

/// Storage capability the HTTP layer depends on
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All todos, newest first. Empty when there are none.
    async fn list(&self) -> Result<Vec<Todo>, DbError>;

    /// One todo by id, or [`DbError::NotFound`].
    async fn get(&self, id: Uuid) -> Result<Todo, DbError>;

    /// Persist a todo with a freshly generated id and creation time.
    async fn insert(&self, todo: NewTodo) -> Result<Todo, DbError>;
}

/// PostgreSQL-backed todo repository
#[derive(Debug, Clone)]
pub struct TodoRepo {
    pool: PgPool,
    timeout: Duration,
}

impl TodoRepo {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Override the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl TodoStore for TodoRepo {
    async fn list(&self) -> Result<Vec<Todo>, DbError> {
        with_deadline(self.timeout, async {
            let rows = sqlx::query(
                r#"
                SELECT id, created_at, is_done, message
                FROM todo
                ORDER BY created_at DESC
                "#,
            )
            .fetch_all(&self.pool)
            .await?;

            rows_as::<Todo>(rows)
        })
        .await
    }

    async fn get(&self, id: Uuid) -> Result<Todo, DbError> {
        with_deadline(self.timeout, async {
            let row = sqlx::query(
                r#"
                SELECT id, created_at, is_done, message
                FROM todo
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DbError::execution(format!("could not fetch todo {}", id), e))?;

            found_as::<Todo>(row, "todo", id)
        })
        .await
    }

    async fn insert(&self, new: NewTodo) -> Result<Todo, DbError> {
        let id = Uuid::new_v4();
        // Postgres keeps microseconds; truncating here means the value
        // returned now equals the value read back later. It can sort up to
        // 1µs before a full-precision clock read taken just before the call,
        // so compare against a truncated start time.
        let created_at = Utc::now().trunc_subsecs(6);

        let todo: Todo = with_deadline(self.timeout, async {
            let row = sqlx::query(
                r#"
                INSERT INTO todo (id, created_at, is_done, message)
                VALUES ($1, $2, $3, $4)
                RETURNING id, created_at, is_done, message
                "#,
            )
            .bind(id)
            .bind(created_at)
            .bind(new.is_done)
            .bind(new.message.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DbError::execution("could not insert todo", e))?;

            row_as::<Todo>(&row)
        })
        .await?;

        tracing::debug!(id = %todo.id, "inserted todo");
        Ok(todo)
    }
}

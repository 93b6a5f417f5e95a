//! Repository implementations for database access
//!
//! Repositories return [`DbError`]. The only distinction callers are meant
//! to act on is [`DbError::NotFound`] versus everything else.

pub mod todos;

use std::future::Future;
use std::time::Duration;

use sqlx::postgres::PgRow;
use sqlx::FromRow;

pub use todos::{TodoRepo, TodoStore};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("{context}: {source}")]
    Execution {
        context: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("query did not complete within {after:?}")]
    Timeout { after: Duration },

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },
}

impl DbError {
    pub fn execution(context: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Execution {
            context: context.into(),
            source,
        }
    }

    /// Whether the lookup ran but matched nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        Self::execution("could not execute query", e)
    }
}

/// Decode every row; the first row that fails to decode fails the whole call.
///
/// Zero rows is an empty vec, not an error.
pub(crate) fn rows_as<T>(rows: Vec<PgRow>) -> Result<Vec<T>, DbError>
where
    T: for<'r> FromRow<'r, PgRow>,
{
    rows.iter().map(row_as::<T>).collect()
}

/// Decode a single row.
pub(crate) fn row_as<T>(row: &PgRow) -> Result<T, DbError>
where
    T: for<'r> FromRow<'r, PgRow>,
{
    T::from_row(row).map_err(|e| DbError::execution("could not scan row", e))
}

/// Decode an optional single-row result, mapping zero rows to `NotFound`.
pub(crate) fn found_as<T>(
    row: Option<PgRow>,
    resource: &'static str,
    id: impl ToString,
) -> Result<T, DbError>
where
    T: for<'r> FromRow<'r, PgRow>,
{
    match row {
        Some(row) => row_as(&row),
        None => Err(DbError::NotFound {
            resource,
            id: id.to_string(),
        }),
    }
}

/// Bound a repository call by a deadline.
///
/// Expiry drops the query future, which cancels the statement, and
/// surfaces as [`DbError::Timeout`].
pub(crate) async fn with_deadline<T, F>(after: Duration, fut: F) -> Result<T, DbError>
where
    F: Future<Output = Result<T, DbError>>,
{
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| DbError::Timeout { after })?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinguishable() {
        let err = DbError::NotFound {
            resource: "todo",
            id: "1".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found: todo '1'");

        let err = DbError::from(sqlx::Error::PoolTimedOut);
        assert!(!err.is_not_found());
        assert!(err.to_string().starts_with("could not execute query: "));
    }

    #[test]
    fn zero_rows_is_not_found() {
        let res: Result<crate::models::Todo, _> = found_as(None, "todo", 42);
        assert!(matches!(res, Err(DbError::NotFound { resource: "todo", .. })));
    }

    #[test]
    fn zero_rows_list_is_empty() {
        let res: Vec<crate::models::Todo> = rows_as(Vec::new()).unwrap();
        assert!(res.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_expiry_is_timeout() {
        let res: Result<(), DbError> = with_deadline(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(())
        })
        .await;
        assert!(matches!(res, Err(DbError::Timeout { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_passes_through_result() {
        let res = with_deadline(Duration::from_secs(1), async { Ok::<_, DbError>(7) }).await;
        assert_eq!(res.unwrap(), 7);
    }
}

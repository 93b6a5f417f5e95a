//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{ConnectOptions, Connection, PgPool};

use crate::config::{ConfigError, DatabaseConfig};

/// Default maximum connections for the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 25;

/// Connections are recycled after this long.
const DEFAULT_MAX_LIFETIME: Duration = Duration::from_secs(3 * 60);

/// Pool construction error
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("could not connect to database: {0}")]
    Connect(#[from] sqlx::Error),
}

/// Create a PostgreSQL connection pool.
///
/// A single connection is opened and closed first, so an unreachable or
/// misconfigured database fails here with the driver's own error rather
/// than a pool timeout or a failure on the first request.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&config.database).await?;
/// ```
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, PoolError> {
    create_pool_with_options(config, DEFAULT_MAX_CONNECTIONS).await
}

/// Create a PostgreSQL connection pool with custom options.
pub async fn create_pool_with_options(
    config: &DatabaseConfig,
    max_connections: u32,
) -> Result<PgPool, PoolError> {
    let options = config.connect_options()?;

    options.connect().await?.close().await?;

    let mut pool_options = PgPoolOptions::new()
        .max_connections(max_connections)
        .max_lifetime(DEFAULT_MAX_LIFETIME);
    if !config.query_timeout.is_zero() {
        pool_options = pool_options.acquire_timeout(config.query_timeout);
    }

    let pool = pool_options.connect_with(options).await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_sslmode_fails_before_connecting() {
        let config = DatabaseConfig {
            ssl_mode: "sometimes".into(),
            ..Default::default()
        };
        let err = create_pool(&config).await.unwrap_err();
        assert!(matches!(err, PoolError::Config(ConfigError::InvalidSslMode(_))));
    }

    #[tokio::test]
    async fn unreachable_database_reports_driver_error() {
        let config = DatabaseConfig {
            host: "127.0.0.1".into(),
            port: "1".into(),
            query_timeout: Duration::from_secs(1),
            ..Default::default()
        };

        let err = tokio::time::timeout(Duration::from_secs(5), create_pool(&config))
            .await
            .expect("pool creation should fail fast")
            .unwrap_err();

        match err {
            PoolError::Connect(sqlx::Error::Io(_)) => {}
            other => panic!("expected connection error, got {:?}", other),
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn pool_acquires_connection() {
        let config = DatabaseConfig {
            user: "todo".into(),
            password: "todo".into(),
            host: "localhost".into(),
            port: "5432".into(),
            name: "todo".into(),
            query_timeout: Duration::from_secs(5),
            ..Default::default()
        };
        let pool = create_pool(&config).await.expect("pool creation failed");

        let result: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query failed");

        assert_eq!(result.0, 1);
    }
}

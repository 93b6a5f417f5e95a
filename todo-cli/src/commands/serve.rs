//! HTTP server command
//!
//! Every flag falls back to an environment variable and then to a default
//! suited to a local development database.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use todo_server::{listen, shutdown_signal, Config, DatabaseConfig};

use crate::tracing_setup::{self, TracingConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "APPLICATION_ADDR", default_value = "127.0.0.1:8080")]
    pub bind: String,

    /// Database user
    #[arg(long, env = "DB_USERNAME", default_value = "todo")]
    pub db_user: String,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", default_value = "todo", hide_env_values = true)]
    pub db_password: String,

    /// Database host
    #[arg(long, env = "DB_ADDR", default_value = "localhost")]
    pub db_host: String,

    /// Database port
    #[arg(long, env = "DB_PORT", default_value = "5432")]
    pub db_port: String,

    /// Database name
    #[arg(long, env = "DB_NAME", default_value = "todo")]
    pub db_name: String,

    /// Database sslmode (disable, allow, prefer, require, verify-ca, verify-full)
    #[arg(long, env = "DB_SSL", default_value = "disable")]
    pub db_ssl: String,

    /// Path to the database root certificate
    #[arg(long, env = "DB_SSL_ROOT_CERT", default_value = "")]
    pub db_ssl_root_cert: String,

    /// Path to the database client certificate
    #[arg(long, env = "DB_SSL_CERT", default_value = "")]
    pub db_ssl_cert: String,

    /// Path to the database client key
    #[arg(long, env = "DB_SSL_KEY", default_value = "")]
    pub db_ssl_key: String,

    /// Deadline for each database call, in seconds
    #[arg(long, env = "DB_TIMEOUT_SECS", default_value_t = 10)]
    pub db_timeout_secs: u64,

    /// Log level (panic, fatal, error, warn, info, debug, trace)
    #[arg(long, env = "LOGLEVEL", default_value = "debug")]
    pub log_level: String,
}

impl ServeArgs {
    fn config(&self) -> Result<Config> {
        let config = Config::builder()
            .application_address(&self.bind)
            .database(DatabaseConfig {
                user: self.db_user.clone(),
                password: self.db_password.clone(),
                host: self.db_host.clone(),
                port: self.db_port.clone(),
                name: self.db_name.clone(),
                ca: self.db_ssl_root_cert.clone(),
                cert: self.db_ssl_cert.clone(),
                key: self.db_ssl_key.clone(),
                ssl_mode: self.db_ssl.clone(),
                query_timeout: Duration::ZERO,
            })
            .query_timeout(Duration::from_secs(self.db_timeout_secs))
            .log_level(&self.log_level)
            .build()
            .context("could not configure application")?;

        Ok(config)
    }
}

/// Run the HTTP server until a termination signal arrives
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.config()?;

    tracing_setup::init(&TracingConfig {
        level: config.log_level,
    })?;

    tracing::info!(
        bind = %config.bind_addr,
        db_host = %config.database.host,
        db_name = %config.database.name,
        "Starting todo server"
    );

    listen(config, shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

//! Tracing setup for the todo CLI
//!
//! Usage:
//!   todo serve --log-level debug       # Level from the flag or LOGLEVEL
//!   RUST_LOG=todo_server=trace todo    # Fine-grained log control
//!
//! Environment variables:
//!   RUST_LOG                           # Log filter, overrides the level

use anyhow::{anyhow, Result};
use todo_server::LogLevel;
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level used when RUST_LOG is not set
    pub level: LogLevel,
}

/// Initialize console tracing.
pub fn init(config: &TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.level.as_tracing_level().as_str().to_ascii_lowercase())
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.level == LogLevel::Trace)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

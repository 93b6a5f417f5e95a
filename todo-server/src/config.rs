//! Server configuration
//!
//! Options are applied through [`ConfigBuilder`]. Every setter validates its
//! input and the first invalid option is returned from [`ConfigBuilder::build`],
//! so a bad value aborts startup before anything is connected or bound.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use tracing::Level;

/// Default per-query deadline
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration error, reported at startup
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown loglevel: {0}")]
    UnknownLogLevel(String),

    #[error("invalid application address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("invalid database port '{0}'")]
    InvalidPort(String),

    #[error("invalid sslmode '{0}'")]
    InvalidSslMode(String),

    #[error("query timeout must be greater than zero")]
    InvalidQueryTimeout,
}

/// Log verbosity.
///
/// Accepts the level names `panic`, `fatal`, `error`, `warn`, `info`,
/// `debug` and `trace` (case-insensitive). tracing has nothing above ERROR,
/// so `panic` and `fatal` behave like `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Panic,
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Level used to build the subscriber filter
    pub fn as_tracing_level(self) -> Level {
        match self {
            Self::Panic | Self::Fatal | Self::Error => Level::ERROR,
            Self::Warn => Level::WARN,
            Self::Info => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "panic" => Ok(Self::Panic),
            "fatal" => Ok(Self::Fatal),
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(ConfigError::UnknownLogLevel(s.to_owned())),
        }
    }
}

/// PostgreSQL credentials and location.
///
/// Fields are kept as plain strings; an empty field is simply left out of
/// the connection settings.
#[derive(Clone, Default)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: String,
    pub name: String,
    /// Path to the root certificate (`sslrootcert`)
    pub ca: String,
    /// Path to the client certificate (`sslcert`)
    pub cert: String,
    /// Path to the client key (`sslkey`)
    pub key: String,
    /// `sslmode`; empty means `disable`
    pub ssl_mode: String,
    pub query_timeout: Duration,
}

impl DatabaseConfig {
    /// Render the keyword/value connection string.
    ///
    /// ```
    /// use todo_server::config::DatabaseConfig;
    ///
    /// let db = DatabaseConfig {
    ///     user: "todo".into(),
    ///     host: "localhost".into(),
    ///     ..Default::default()
    /// };
    /// assert_eq!(db.dsn(), "user=todo host=localhost sslmode=disable");
    /// ```
    pub fn dsn(&self) -> String {
        self.render_dsn(&self.password)
    }

    /// The connection string with the password masked, for logs.
    pub fn redacted_dsn(&self) -> String {
        if self.password.is_empty() {
            self.dsn()
        } else {
            self.render_dsn("<redacted>")
        }
    }

    fn render_dsn(&self, password: &str) -> String {
        let password = password.to_owned();
        let pairs = [
            ("user", &self.user),
            ("password", &password),
            ("host", &self.host),
            ("port", &self.port),
            ("dbname", &self.name),
            ("sslrootcert", &self.ca),
            ("sslcert", &self.cert),
            ("sslkey", &self.key),
        ];

        let mut parts: Vec<String> = pairs
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(keyword, value)| format!("{}={}", keyword, value))
            .collect();

        parts.push(format!("sslmode={}", self.ssl_mode_or_default()));
        parts.join(" ")
    }

    /// Map the same fields onto sqlx connect options.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        let mut opts = PgConnectOptions::new().ssl_mode(self.parsed_ssl_mode()?);

        if !self.user.is_empty() {
            opts = opts.username(&self.user);
        }
        if !self.password.is_empty() {
            opts = opts.password(&self.password);
        }
        if !self.host.is_empty() {
            opts = opts.host(&self.host);
        }
        if let Some(port) = self.parsed_port()? {
            opts = opts.port(port);
        }
        if !self.name.is_empty() {
            opts = opts.database(&self.name);
        }
        if !self.ca.is_empty() {
            opts = opts.ssl_root_cert(&self.ca);
        }
        if !self.cert.is_empty() {
            opts = opts.ssl_client_cert(&self.cert);
        }
        if !self.key.is_empty() {
            opts = opts.ssl_client_key(&self.key);
        }

        Ok(opts)
    }

    fn ssl_mode_or_default(&self) -> &str {
        if self.ssl_mode.is_empty() {
            "disable"
        } else {
            &self.ssl_mode
        }
    }

    fn parsed_ssl_mode(&self) -> Result<PgSslMode, ConfigError> {
        self.ssl_mode_or_default()
            .parse()
            .map_err(|_| ConfigError::InvalidSslMode(self.ssl_mode.clone()))
    }

    fn parsed_port(&self) -> Result<Option<u16>, ConfigError> {
        if self.port.is_empty() {
            return Ok(None);
        }
        self.port
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidPort(self.port.clone()))
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("ca", &self.ca)
            .field("cert", &self.cert)
            .field("key", &self.key)
            .field("ssl_mode", &self.ssl_mode)
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}

/// Validated server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind to (default: 127.0.0.1:8080)
    pub bind_addr: SocketAddr,
    pub database: DatabaseConfig,
    pub log_level: LogLevel,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            database: DatabaseConfig {
                query_timeout: DEFAULT_QUERY_TIMEOUT,
                ..Default::default()
            },
            log_level: LogLevel::Info,
        }
    }
}

/// Builder for [`Config`].
///
/// Once a setter fails, later setters are skipped and `build()` returns
/// that first error.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
    error: Option<ConfigError>,
}

impl ConfigBuilder {
    /// Listen address, e.g. `127.0.0.1:8080`.
    pub fn application_address(self, addr: &str) -> Self {
        self.apply(|cfg| {
            cfg.bind_addr = addr.parse().map_err(|source| ConfigError::InvalidAddress {
                addr: addr.to_owned(),
                source,
            })?;
            Ok(())
        })
    }

    /// Database credentials. Port and sslmode are checked here.
    pub fn database(self, database: DatabaseConfig) -> Self {
        self.apply(|cfg| {
            database.parsed_port()?;
            database.parsed_ssl_mode()?;
            let query_timeout = cfg.database.query_timeout;
            cfg.database = DatabaseConfig {
                query_timeout: if database.query_timeout.is_zero() {
                    query_timeout
                } else {
                    database.query_timeout
                },
                ..database
            };
            Ok(())
        })
    }

    /// Deadline applied to every repository call. Must be non-zero.
    pub fn query_timeout(self, timeout: Duration) -> Self {
        self.apply(|cfg| {
            if timeout.is_zero() {
                return Err(ConfigError::InvalidQueryTimeout);
            }
            cfg.database.query_timeout = timeout;
            Ok(())
        })
    }

    /// Log level by name.
    pub fn log_level(self, level: &str) -> Self {
        self.apply(|cfg| {
            cfg.log_level = level.parse()?;
            Ok(())
        })
    }

    /// Return the configuration, or the first invalid option.
    pub fn build(self) -> Result<Config, ConfigError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.config),
        }
    }

    fn apply(mut self, f: impl FnOnce(&mut Config) -> Result<(), ConfigError>) -> Self {
        if self.error.is_none() {
            if let Err(err) = f(&mut self.config) {
                self.error = Some(err);
            }
        }
        self
    }
}

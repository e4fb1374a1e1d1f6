//! Catalog runtime configuration.
//!
//! # Responsibility
//! - Resolve the database target from a connection string.
//! - Load connection settings from the process environment.
//!
//! # Invariants
//! - Configuration is validated up front; an invalid value never reaches
//!   the storage layer.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the catalog connection string.
pub const DATABASE_ENV: &str = "CATALOG_DATABASE";
/// Environment variable holding the SQLite busy timeout in milliseconds.
pub const BUSY_TIMEOUT_ENV: &str = "CATALOG_BUSY_TIMEOUT_MS";
/// Environment variable holding the log level (`trace|debug|info|warn|error`).
pub const LOG_LEVEL_ENV: &str = "CATALOG_LOG_LEVEL";
/// Connection string used when none is configured.
pub const DEFAULT_DATABASE: &str = "catalog.sqlite3";
/// Busy timeout applied when none is configured.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const MEMORY_MARKER: &str = ":memory:";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyConnectionString,
    UnsupportedConnectionString(String),
    InvalidBusyTimeout(String),
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyConnectionString => write!(f, "connection string cannot be empty"),
            Self::UnsupportedConnectionString(value) => {
                write!(f, "unsupported connection string `{value}`")
            }
            Self::InvalidBusyTimeout(value) => write!(
                f,
                "invalid {BUSY_TIMEOUT_ENV} value `{value}`; expected milliseconds"
            ),
            Self::InvalidLogLevel(value) => write!(
                f,
                "invalid {LOG_LEVEL_ENV} value `{value}`; expected trace|debug|info|warn|error"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Where the catalog database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    /// Private in-memory database, seeded on open.
    Memory,
    /// SQLite database file, created when missing.
    File(PathBuf),
}

impl DatabaseTarget {
    /// Parses a connection string.
    ///
    /// Accepted forms:
    /// - `:memory:` and `sqlite::memory:`
    /// - `sqlite://<path>` and `file:<path>` (query suffix ignored)
    /// - `Data Source=<path>` / `Filename=<path>` key-value lists
    /// - a bare filesystem path
    pub fn parse(connection: &str) -> ConfigResult<Self> {
        let trimmed = connection.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyConnectionString);
        }

        let lowered = trimmed.to_ascii_lowercase();
        if lowered == MEMORY_MARKER || lowered == "sqlite::memory:" {
            return Ok(Self::Memory);
        }

        if let Some(rest) = strip_prefix_ignore_case(trimmed, "sqlite://") {
            return Self::from_location(trimmed, strip_query(rest));
        }
        if let Some(rest) = strip_prefix_ignore_case(trimmed, "file:") {
            return Self::from_location(trimmed, strip_query(rest));
        }
        if trimmed.contains("://") {
            return Err(ConfigError::UnsupportedConnectionString(trimmed.to_string()));
        }
        if trimmed.contains('=') {
            let location = key_value_location(trimmed)
                .ok_or_else(|| ConfigError::UnsupportedConnectionString(trimmed.to_string()))?;
            return Self::from_location(trimmed, location);
        }

        Ok(Self::File(PathBuf::from(trimmed)))
    }

    fn from_location(original: &str, location: &str) -> ConfigResult<Self> {
        let location = location.trim();
        if location.is_empty() {
            return Err(ConfigError::UnsupportedConnectionString(original.to_string()));
        }
        if location.eq_ignore_ascii_case(MEMORY_MARKER) {
            return Ok(Self::Memory);
        }
        Ok(Self::File(PathBuf::from(location)))
    }
}

/// Settings needed to open a catalog connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub target: DatabaseTarget,
    pub busy_timeout: Duration,
    /// Normalized log level handed to `logging::init_logging`.
    pub log_level: &'static str,
}

impl CatalogConfig {
    /// Config for `target` with default connection settings.
    pub fn new(target: DatabaseTarget) -> Self {
        Self {
            target,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            log_level: default_log_level(),
        }
    }

    /// Config for an in-memory catalog.
    pub fn in_memory() -> Self {
        Self::new(DatabaseTarget::Memory)
    }

    /// Parses `connection` into a config with default settings.
    pub fn from_connection_string(connection: &str) -> ConfigResult<Self> {
        DatabaseTarget::parse(connection).map(Self::new)
    }

    /// Loads config from `CATALOG_DATABASE`, `CATALOG_BUSY_TIMEOUT_MS` and
    /// `CATALOG_LOG_LEVEL`.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads config through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let connection = lookup(DATABASE_ENV)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());
        let mut config = Self::from_connection_string(&connection)?;

        if let Some(raw) = lookup(BUSY_TIMEOUT_ENV).filter(|value| !value.trim().is_empty()) {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidBusyTimeout(raw.clone()))?;
            config.busy_timeout = Duration::from_millis(millis);
        }

        if let Some(raw) = lookup(LOG_LEVEL_ENV).filter(|value| !value.trim().is_empty()) {
            config.log_level =
                normalize_level(&raw).map_err(|_| ConfigError::InvalidLogLevel(raw.clone()))?;
        }

        Ok(config)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::new(DatabaseTarget::File(PathBuf::from(DEFAULT_DATABASE)))
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        value.get(prefix.len()..)
    } else {
        None
    }
}

fn strip_query(value: &str) -> &str {
    value.split_once('?').map_or(value, |(path, _)| path)
}

fn key_value_location(connection: &str) -> Option<&str> {
    connection
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| {
            let key = key.trim();
            key.eq_ignore_ascii_case("data source")
                || key.eq_ignore_ascii_case("datasource")
                || key.eq_ignore_ascii_case("filename")
        })
        .map(|(_, value)| value.trim())
}

#[cfg(test)]
mod tests {
    use super::{
        CatalogConfig, ConfigError, DatabaseTarget, BUSY_TIMEOUT_ENV, DATABASE_ENV,
        DEFAULT_BUSY_TIMEOUT, DEFAULT_DATABASE, LOG_LEVEL_ENV,
    };
    use crate::logging::default_log_level;
    use std::path::PathBuf;
    use std::time::Duration;

    fn file(path: &str) -> DatabaseTarget {
        DatabaseTarget::File(PathBuf::from(path))
    }

    #[test]
    fn parse_recognizes_memory_forms() {
        assert_eq!(DatabaseTarget::parse(":memory:"), Ok(DatabaseTarget::Memory));
        assert_eq!(
            DatabaseTarget::parse("SQLITE::MEMORY:"),
            Ok(DatabaseTarget::Memory)
        );
        assert_eq!(
            DatabaseTarget::parse("Data Source=:memory:"),
            Ok(DatabaseTarget::Memory)
        );
    }

    #[test]
    fn parse_recognizes_file_forms() {
        assert_eq!(
            DatabaseTarget::parse("sqlite:///var/lib/catalog.db?mode=rwc"),
            Ok(file("/var/lib/catalog.db"))
        );
        assert_eq!(
            DatabaseTarget::parse("file:catalog.db"),
            Ok(file("catalog.db"))
        );
        assert_eq!(
            DatabaseTarget::parse("Data Source=library.db;Cache=Shared"),
            Ok(file("library.db"))
        );
        assert_eq!(DatabaseTarget::parse("  ./lib.db "), Ok(file("./lib.db")));
    }

    #[test]
    fn parse_rejects_empty_and_foreign_schemes() {
        assert_eq!(
            DatabaseTarget::parse("   "),
            Err(ConfigError::EmptyConnectionString)
        );
        assert!(matches!(
            DatabaseTarget::parse("postgres://localhost/catalog"),
            Err(ConfigError::UnsupportedConnectionString(_))
        ));
        assert!(matches!(
            DatabaseTarget::parse("Server=db;Database=Library"),
            Err(ConfigError::UnsupportedConnectionString(_))
        ));
        assert!(matches!(
            DatabaseTarget::parse("sqlite://"),
            Err(ConfigError::UnsupportedConnectionString(_))
        ));
    }

    #[test]
    fn from_lookup_uses_defaults_when_unset() {
        let config = CatalogConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.target, file(DEFAULT_DATABASE));
        assert_eq!(config.busy_timeout, DEFAULT_BUSY_TIMEOUT);
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config, CatalogConfig::default());
    }

    #[test]
    fn from_lookup_reads_both_variables() {
        let config = CatalogConfig::from_lookup(|name| match name {
            DATABASE_ENV => Some(":memory:".to_string()),
            BUSY_TIMEOUT_ENV => Some(" 250 ".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.target, DatabaseTarget::Memory);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn from_lookup_rejects_bad_timeout() {
        let err = CatalogConfig::from_lookup(|name| {
            (name == BUSY_TIMEOUT_ENV).then(|| "soon".to_string())
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidBusyTimeout("soon".to_string()));
    }

    #[test]
    fn from_lookup_normalizes_and_validates_log_level() {
        let config = CatalogConfig::from_lookup(|name| {
            (name == LOG_LEVEL_ENV).then(|| " Warning ".to_string())
        })
        .unwrap();
        assert_eq!(config.log_level, "warn");

        let err = CatalogConfig::from_lookup(|name| {
            (name == LOG_LEVEL_ENV).then(|| "loud".to_string())
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidLogLevel("loud".to_string()));
        assert!(err.to_string().contains(LOG_LEVEL_ENV));
    }
}

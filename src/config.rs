//! Application configuration management.
//!
//! Configuration is loaded from a YAML file and environment variables, in
//! priority order:
//!
//! 1. `PCRELAY_*` environment variables (highest; `__` separates nesting,
//!    e.g. `PCRELAY_DATABASE__POOL__MAX_CONNECTIONS`)
//! 2. `DATABASE_URL`, which overrides `database.url`
//! 3. Values from the YAML file given by `-f`/`--config`
//! 4. Built-in defaults (lowest)

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "PCRELAY_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// Loaded from YAML and environment variables; every field has a default, so
/// an empty file is a valid configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Override applied on top of `database.url`; populated by the
    /// DATABASE_URL environment variable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// PostgreSQL connection settings
    pub database: DatabaseConfig,
    /// What callers see when the database cannot be reached
    pub on_connect_failure: ConnectFailurePolicy,
    /// Upload size limits
    pub limits: LimitsConfig,
    /// Diagnostic trace file settings
    pub diagnostics: DiagnosticsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: None,
            database: DatabaseConfig::default(),
            on_connect_failure: ConnectFailurePolicy::Report,
            limits: LimitsConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection string for the playthrough database
    pub url: String,
    /// Connection pool settings
    pub pool: PoolSettings,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost:5432/playthroughs".to_string(),
            pool: PoolSettings::default(),
        }
    }
}

/// Individual pool configuration with all SQLx parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection (seconds)
    pub acquire_timeout_secs: u64,
    /// Time before idle connections are closed (seconds, 0 = never)
    pub idle_timeout_secs: u64,
    /// Maximum lifetime of a connection (seconds, 0 = never)
    pub max_lifetime_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,  // 10 minutes
            max_lifetime_secs: 1800, // 30 minutes
        }
    }
}

/// How a failed connection acquisition is reported to the caller.
///
/// The collector this service replaces answered 200 even when it could not
/// reach its database. `Report` surfaces the failure as 502 instead;
/// `Silent` keeps the historical shape for clients that cannot handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectFailurePolicy {
    Report,
    Silent,
}

/// Resource limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Whole-request body cap in bytes, covering the multipart envelope
    pub max_upload_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_size: 25 * 1024 * 1024, // 25MB
        }
    }
}

/// Diagnostic trace file settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticsConfig {
    /// Where the trace file is written
    pub path: PathBuf,
    /// Write informational lines (error lines are always written)
    pub log_info: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("submit-playthrough.log"),
            log_info: false,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        // if DATABASE_URL was set, it wins (pool settings are preserved)
        if let Some(url) = config.database_url.take() {
            config.database.url = url;
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.host.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: host cannot be empty".to_string(),
            });
        }

        if self.database.url.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: database.url cannot be empty. \
                 Set it in the config file or via DATABASE_URL."
                    .to_string(),
            });
        }

        if self.database.pool.max_connections == 0 {
            return Err(Error::Internal {
                operation: "Config validation: database.pool.max_connections must be at least 1"
                    .to_string(),
            });
        }

        if self.limits.max_upload_size == 0 {
            return Err(Error::Internal {
                operation: "Config validation: limits.max_upload_size must be positive".to_string(),
            });
        }

        if self.diagnostics.path.as_os_str().is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: diagnostics.path cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables override specific values
            .merge(Env::prefixed("PCRELAY_").split("__"))
            // Common DATABASE_URL pattern
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

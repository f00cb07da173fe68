//! Service configuration
//!
//! Layered from built-in defaults, an optional config file and
//! `CLIMATE__`-prefixed environment variables, in that order.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::rate_limit::RateLimitConfig;

/// Config file used when `CLIMATE_CONFIG_FILE` is unset (extension optional)
pub const DEFAULT_CONFIG_FILE: &str = "config/climate";
/// Environment variable naming an alternative config file
pub const CONFIG_FILE_ENV: &str = "CLIMATE_CONFIG_FILE";
/// Prefix for environment overrides, e.g. `CLIMATE__SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "CLIMATE";

/// Station reported by the tobs route unless configured otherwise
pub const DEFAULT_TOBS_STATION: &str = "USC00519281";

/// Top-level service configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub precipitation: PrecipitationConfig,
    pub tobs: TobsConfig,
    pub aggregate: AggregateConfig,
    pub rate_limit: RateLimitConfig,
    pub metrics: MetricsConfig,
}

/// HTTP listener
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Observation store
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the pre-populated SQLite file
    pub path: String,
    /// Pool size
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "Resources/hawaii.sqlite".to_string(),
            max_connections: 5,
        }
    }
}

/// Log output
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// How the precipitation route chooses its rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecipitationWindow {
    /// The last `rows` rows by insertion order
    #[default]
    RowCount,
    /// Rows dated within twelve months of the latest stored date
    LastYear,
}

/// Precipitation route
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrecipitationConfig {
    pub window: PrecipitationWindow,
    /// Row count for [`PrecipitationWindow::RowCount`]
    pub rows: u32,
}

impl Default for PrecipitationConfig {
    fn default() -> Self {
        Self {
            window: PrecipitationWindow::RowCount,
            rows: 349,
        }
    }
}

/// Temperature observations route
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TobsConfig {
    /// Station to report when `most_active` is off
    pub station: String,
    /// Report the station with the most observations instead
    pub most_active: bool,
    /// Maximum number of (date, temp) pairs
    pub limit: usize,
}

impl Default for TobsConfig {
    fn default() -> Self {
        Self {
            station: DEFAULT_TOBS_STATION.to_string(),
            most_active: false,
            limit: 356,
        }
    }
}

/// Start/end summary routes
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Include rows dated `end` in the window
    pub end_inclusive: bool,
}

/// Prometheus exposition
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl ServiceConfig {
    /// Load from the default sources
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var(CONFIG_FILE_ENV)
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&file, environment())
    }

    /// Load from `file` (if it exists) overlaid with `env`
    pub fn load_from(file: &str, env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(file).required(false))
            .add_source(env)
            .build()?
            .try_deserialize()
    }
}

/// Environment source for `CLIMATE__SECTION__KEY` variables
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

//! Application configuration
//!
//! Split into focused sub-modules by domain:
//! - `server`: HTTP server and logging settings
//! - `integrations`: CalDAV server and bridge behaviour

mod integrations;
mod server;

use std::fmt;

use domain::CalendarRoutes;
use serde::{Deserialize, Serialize};

pub use integrations::{BridgeAppConfig, CalDavAppConfig};
pub use server::{LogFormat, ServerConfig};

/// Environment variable naming an alternative configuration file
pub const CONFIG_PATH_ENV: &str = "RESA_BRIDGE_CONFIG";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "RESA_BRIDGE";

/// Application environment (development or production)
///
/// Controls whether internal error details reach API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment - internal error details are exposed
    #[default]
    Development,
    /// Production environment - internal error details are hidden
    Production,
}

impl Environment {
    /// Whether this is a production deployment
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development or production)
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// CalDAV server configuration
    #[serde(default)]
    pub caldav: CalDavAppConfig,

    /// Bridge behaviour
    #[serde(default)]
    pub bridge: BridgeAppConfig,

    /// Public calendar name to CalDAV collection
    ///
    /// Configured as a table: `[calendars]` with `music = "music_test"`.
    /// Replaces the built-in routes entirely when present.
    #[serde(default)]
    pub calendars: CalendarRoutes,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// Reads `config.toml` from the working directory, or the file named by
    /// `RESA_BRIDGE_CONFIG`, then applies `RESA_BRIDGE_*` overrides
    /// (e.g. `RESA_BRIDGE_SERVER__PORT=9000`).
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).ok();
        Self::load_from(path.as_deref().unwrap_or("config"))
    }

    /// Load configuration from an explicit file path plus environment
    ///
    /// A missing file is not an error.
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            // Load from file if exists
            .add_source(config::File::with_name(path).required(false))
            // Override with environment variables (e.g., RESA_BRIDGE_CALDAV__USERNAME)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would produce unusable resource paths
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        self.bridge.validate().map_err(config::ConfigError::Message)
    }
}

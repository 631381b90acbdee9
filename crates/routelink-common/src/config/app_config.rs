//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub gateway: ServerConfig,
    pub cors: CorsConfig,
    pub relay: RelayConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(ConfigError::InvalidValue("APP_ENV", s.to_string())),
        }
    }
}

/// Server bind configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// CORS configuration
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Relay and connection-lifecycle tuning
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Capacity of each connection's outbound queue
    pub outbound_buffer: usize,
    /// Heartbeat interval advertised to clients, in milliseconds
    pub heartbeat_interval_ms: u64,
    /// Idle time after which the server closes a silent connection, in milliseconds
    pub heartbeat_timeout_ms: u64,
}

impl RelayConfig {
    #[must_use]
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.heartbeat_timeout_ms)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            outbound_buffer: default_outbound_buffer(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            heartbeat_timeout_ms: default_heartbeat_timeout_ms(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "routelink-relay".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_outbound_buffer() -> usize {
    100
}

fn default_heartbeat_interval_ms() -> u64 {
    25_000
}

fn default_heartbeat_timeout_ms() -> u64 {
    60_000
}

/// Parse an optional variable, treating an unparsable value as an error
fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(None),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is present but cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// # Errors
    /// Returns an error if a variable is present but cannot be parsed
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = match lookup("APP_ENV") {
            Some(raw) => raw.parse()?,
            None => default_env(),
        };

        // `PORT` is what most hosting platforms inject, so it takes precedence
        let port: u16 = match parse_var::<u16>(&lookup, "PORT")? {
            Some(port) => port,
            None => parse_var::<u16>(&lookup, "GATEWAY_PORT")?.unwrap_or_else(default_port),
        };

        let mut allowed_origins: Vec<String> = lookup("CORS_ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        if let Some(frontend) = lookup("FRONTEND_URL") {
            let frontend = frontend.trim().to_string();
            if !frontend.is_empty() && !allowed_origins.contains(&frontend) {
                allowed_origins.push(frontend);
            }
        }

        let relay = RelayConfig {
            outbound_buffer: parse_var(&lookup, "RELAY_OUTBOUND_BUFFER")?
                .unwrap_or_else(default_outbound_buffer),
            heartbeat_interval_ms: parse_var(&lookup, "RELAY_HEARTBEAT_INTERVAL_MS")?
                .unwrap_or_else(default_heartbeat_interval_ms),
            heartbeat_timeout_ms: parse_var(&lookup, "RELAY_HEARTBEAT_TIMEOUT_MS")?
                .unwrap_or_else(default_heartbeat_timeout_ms),
        };

        if relay.outbound_buffer == 0 {
            return Err(ConfigError::InvalidValue("RELAY_OUTBOUND_BUFFER", "0".to_string()));
        }
        if relay.heartbeat_timeout_ms <= relay.heartbeat_interval_ms {
            return Err(ConfigError::InvalidValue(
                "RELAY_HEARTBEAT_TIMEOUT_MS",
                format!(
                    "{} (must exceed RELAY_HEARTBEAT_INTERVAL_MS = {})",
                    relay.heartbeat_timeout_ms, relay.heartbeat_interval_ms
                ),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            gateway: ServerConfig {
                host: lookup("GATEWAY_HOST").unwrap_or_else(default_host),
                port,
            },
            cors: CorsConfig { allowed_origins },
            relay,
        })
    }

    /// Configuration suitable for tests: loopback host, ephemeral port, defaults elsewhere
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: Environment::Development,
            },
            gateway: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            cors: CorsConfig::default(),
            relay: RelayConfig::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

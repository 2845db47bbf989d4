//! Configuration file support.
//!
//! Settings live in an optional TOML file. Every field has a default, so a
//! missing file or a missing table behaves like an empty one.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "connect_four.toml";

/// Default relay port.
pub const DEFAULT_PORT: u16 = 8000;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct AppConfig {
    /// Relay server settings.
    #[serde(default)]
    server: ServerConfig,

    /// Network client settings.
    #[serde(default)]
    client: ClientConfig,
}

/// Relay server settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind. Zero lets the OS pick one.
    #[serde(default = "default_port")]
    port: u16,

    /// Seconds a mover may take before the session is aborted.
    #[serde(default)]
    turn_timeout_secs: Option<u64>,
}

/// Network client settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server host to connect to.
    #[serde(default = "default_host")]
    host: String,

    /// Server port to connect to.
    #[serde(default = "default_port")]
    port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            turn_timeout_secs: None,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Applies command-line overrides on top of file values.
    #[instrument(skip(self))]
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        turn_timeout_secs: Option<u64>,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if turn_timeout_secs.is_some() {
            self.turn_timeout_secs = turn_timeout_secs;
        }
        self
    }

    /// Per-turn deadline, if one is configured.
    pub fn turn_timeout(&self) -> Option<Duration> {
        self.turn_timeout_secs.map(Duration::from_secs)
    }

    /// `host:port` string to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Checks values that parse but cannot be used.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::new("server.host must not be empty"));
        }
        if self.turn_timeout_secs == Some(0) {
            return Err(ConfigError::new(
                "server.turn_timeout_secs must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl ClientConfig {
    /// Applies command-line overrides on top of file values.
    #[instrument(skip(self))]
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// `host:port` string to connect to.
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Checks values that parse but cannot be used.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::new("client.host must not be empty"));
        }
        if self.port == 0 {
            return Err(ConfigError::new("client.port must not be 0"));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(
            server_port = config.server.port,
            client_port = config.client.port,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Loads the file when it exists, otherwise returns defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server().port(), &DEFAULT_PORT);
        assert_eq!(config.client().host(), "127.0.0.1");
        assert_eq!(config.server().turn_timeout(), None);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str("[server]\nturn_timeout_secs = 30\n").unwrap();
        assert_eq!(config.server().port(), &DEFAULT_PORT);
        assert_eq!(config.server().turn_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.client(), &ClientConfig::default());
    }

    #[test]
    fn test_overrides_win() {
        let server = ServerConfig::default().with_overrides(None, Some(9100), Some(5));
        assert_eq!(server.bind_address(), "127.0.0.1:9100");
        assert_eq!(server.turn_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_validation() {
        let server = ServerConfig::default().with_overrides(None, None, Some(0));
        assert!(server.validate().is_err());
        let client = ClientConfig::default().with_overrides(None, Some(0));
        let err = client.validate().unwrap_err();
        assert!(err.message.contains("port"));
        assert!(err.file.ends_with("config.rs"));
    }
}

//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `shadowhome.toml` in the working directory, or the file named
//! by `SHADOWHOME_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use serde::Deserialize;
use shadowhome_adapter_mqtt::MqttConfig;
use shadowhome_app::config::EngineConfig;
use shadowhome_app::reconnect::ReconnectPolicy;

const DEFAULT_PATH: &str = "shadowhome.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Broker connection and thing name.
    pub mqtt: MqttConfig,
    /// Engine timings.
    pub engine: EngineConfig,
    /// Backoff applied when the broker connection drops.
    pub reconnect: ReconnectPolicy,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "shadowhomed=info,shadowhome=info,rumqttc=warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the config file (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("SHADOWHOME_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("SHADOWHOME_BROKER_HOST") {
            self.mqtt.broker_host = val;
        }
        if let Some(port) = var("SHADOWHOME_BROKER_PORT").and_then(|val| val.parse().ok()) {
            self.mqtt.broker_port = port;
        }
        if let Some(val) = var("SHADOWHOME_THING") {
            self.mqtt.thing_name = val;
        }
        if let Some(val) = var("SHADOWHOME_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.broker_port == 0 {
            return Err(ConfigError::Validation("broker port must be non-zero".to_string()));
        }
        if self.mqtt.thing_name.trim().is_empty() {
            return Err(ConfigError::Validation("thing name must not be empty".to_string()));
        }
        if self.mqtt.keep_alive_secs < 5 {
            return Err(ConfigError::Validation(
                "keep-alive must be at least 5 seconds".to_string(),
            ));
        }
        if self.mqtt.request_capacity == 0 {
            return Err(ConfigError::Validation(
                "request capacity must be non-zero".to_string(),
            ));
        }
        if self.engine.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "poll interval must be non-zero".to_string(),
            ));
        }
        if self.reconnect.initial_delay_secs > self.reconnect.max_delay_secs {
            return Err(ConfigError::Validation(
                "initial reconnect delay exceeds the maximum delay".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

//! Embedding Server Configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use crate::models::{EmbeddingError, EmbeddingResult, ModelConfig};

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "EMBED_SERVER_CONFIG";

/// Configuration file used when the environment variable is unset
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub network: NetworkConfig,
    pub model: ModelConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub bind_address: String,
    pub max_body_bytes: usize,
    pub shutdown_on_ctrl_c: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5050".to_string(),
            max_body_bytes: 1024 * 1024,
            shutdown_on_ctrl_c: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub log_level: String,
    pub log_request_timings: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_request_timings: true,
        }
    }
}

impl MonitoringConfig {
    /// `EnvFilter` directive for the configured level
    pub fn filter_directive(&self) -> String {
        let level = match self.log_level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "warn" => "warn",
            "error" => "error",
            _ => "info",
        };
        format!("text_embed_server={},{}", level, level)
    }
}

impl ServerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> EmbeddingResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> EmbeddingResult<Self> {
        let config: ServerConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load from `$EMBED_SERVER_CONFIG` or `config.toml`, falling back to
    /// defaults when the file does not exist.
    pub fn load() -> EmbeddingResult<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_or_default(path)
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> EmbeddingResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            // Runs before the tracing subscriber exists
            eprintln!("⚠️  Config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn socket_addr(&self) -> EmbeddingResult<SocketAddr> {
        self.network.bind_address.parse().map_err(|e| EmbeddingError::ConfigError {
            message: format!("Invalid network.bind_address '{}': {}", self.network.bind_address, e),
        })
    }

    pub fn validate(&self) -> EmbeddingResult<()> {
        self.socket_addr()?;
        if self.network.max_body_bytes == 0 {
            return Err(EmbeddingError::ConfigError {
                message: "network.max_body_bytes must be greater than 0".to_string(),
            });
        }
        self.model.validate()
    }
}

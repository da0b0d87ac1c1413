//! Configuration management for pairwallet
//!
//! This module handles loading, validation, and management of
//! pairwallet configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins, empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Document storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding one JSON document per user
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// Largest accepted state document, in bytes
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            max_document_bytes: default_max_document_bytes(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_max_document_bytes() -> usize {
    8 * 1024 * 1024
}

/// Client-side state synchronisation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the user-state server
    #[serde(default = "default_remote_url")]
    pub remote_url: String,
    /// Delay after the last mutation before the state is saved
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Upper bound for the initial load on startup
    #[serde(default = "default_load_timeout_ms")]
    pub load_timeout_ms: u64,
    /// Per-request timeout for remote calls
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            remote_url: default_remote_url(),
            debounce_ms: default_debounce_ms(),
            load_timeout_ms: default_load_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_remote_url() -> String {
    "http://127.0.0.1:8081".to_string()
}

fn default_debounce_ms() -> u64 {
    1500
}

fn default_load_timeout_ms() -> u64 {
    5000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

/// AI chat assistant proxy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// OpenAI-compatible chat completion endpoint; chat is disabled when unset
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Model name sent with every request
    #[serde(default = "default_chat_model")]
    pub model: String,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum number of history messages forwarded
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: default_chat_model(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_history: default_max_history(),
        }
    }
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "PAIRWALLET_CHAT_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_history() -> usize {
    20
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Document storage settings
    #[serde(default)]
    pub data: DataConfig,
    /// Client sync settings
    #[serde(default)]
    pub sync: SyncConfig,
    /// Chat assistant settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::InvalidYaml { message: e.to_string() })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.sync.debounce_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sync.debounce_ms".to_string(),
                reason: "Debounce delay must be greater than 0".to_string(),
            });
        }

        if self.sync.load_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sync.load_timeout_ms".to_string(),
                reason: "Load timeout must be greater than 0".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&self.chat.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "chat.temperature".to_string(),
                reason: "Temperature must be between 0 and 2".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Log level must be one of {}", LOG_LEVELS.join(", ")),
            });
        }

        if self.data.max_document_bytes == 0 {
            return Err(ConfigError::ValidationError {
                message: "data.max_document_bytes must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Whether the chat proxy has an endpoint to forward to
    pub fn chat_enabled(&self) -> bool {
        self.chat.endpoint.as_deref().map_or(false, |e| !e.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.sync.debounce_ms, 1500);
        assert!(!config.chat_enabled());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config =
            Config::from_yaml("server:\n  port: 9000\nsync:\n  debounce_ms: 300\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.sync.debounce_ms, 300);
        assert_eq!(config.sync.load_timeout_ms, 5000);
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
    }

    #[test]
    fn test_generated_default_parses() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.data.path, PathBuf::from("./data"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Config::from_yaml("server:\n  port: 0\n").unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "server.port")
        );

        let err = Config::from_yaml("logging:\n  level: loud\n").unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "logging.level")
        );

        let err = Config::from_yaml("chat:\n  temperature: 3.5\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "chat.temperature"
        ));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml { .. }));
    }

    #[test]
    fn test_chat_enabled() {
        let yaml = "chat:\n  endpoint: \"https://llm.example/v1/chat/completions\"\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert!(config.chat_enabled());

        let config = Config::from_yaml("chat:\n  endpoint: \"  \"\n").unwrap();
        assert!(!config.chat_enabled());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load("/definitely/not/here/config.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}

//! Configuration module
//!
//! Loaded from a TOML file; every section and field has a default so a
//! partial (or empty) file is valid.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::{DatabaseConfig, StoreTimeouts};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// `~/.config/ev-reservations/config.toml` (platform equivalent).
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ev-reservations")
        .join("config.toml")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub store: StoreConfig,
    pub directory: DirectoryConfig,
    pub security: SecurityConfig,
    pub registry: RegistryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds allowed for cleanup after a shutdown signal
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sql,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub backend: StoreBackend,
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let db = DatabaseConfig::default();
        Self {
            backend: StoreBackend::Sql,
            url: db.url,
            max_connections: db.max_connections,
        }
    }
}

impl DatabaseSection {
    pub fn connection_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Bound for create / get / update / delete
    pub write_timeout_secs: u64,
    /// Bound for list / filtered list
    pub read_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            write_timeout_secs: 5,
            read_timeout_secs: 10,
        }
    }
}

impl StoreConfig {
    pub fn timeouts(&self) -> StoreTimeouts {
        StoreTimeouts {
            single: Duration::from_secs(self.write_timeout_secs),
            listing: Duration::from_secs(self.read_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Registry key holding the charger service base address
    pub service_key: String,
    pub timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            service_key: "chargersService".to_string(),
            timeout_secs: 5,
        }
    }
}

impl DirectoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Registry key holding the JWT signing secret
    pub jwt_secret_key: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret_key: "jwtSecret".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    Static,
    Consul,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub kind: RegistryKind,
    pub consul_address: String,
    pub timeout_secs: u64,
    /// Key/value table served by the static registry
    pub values: HashMap<String, String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            kind: RegistryKind::Static,
            consul_address: "http://127.0.0.1:8500".to_string(),
            timeout_secs: 5,
            values: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON lines instead of human readable output
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

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: AppConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.write_timeout_secs == 0 || self.store.read_timeout_secs == 0 {
            return Err(ConfigError::Invalid("store timeouts must be positive".into()));
        }
        if self.directory.timeout_secs == 0 {
            return Err(ConfigError::Invalid("directory.timeout_secs must be positive".into()));
        }
        if self.directory.service_key.is_empty() || self.security.jwt_secret_key.is_empty() {
            return Err(ConfigError::Invalid("registry keys must not be empty".into()));
        }
        Ok(())
    }
}

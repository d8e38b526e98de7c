pub mod catalog;

pub use catalog::{CatalogModel, ModelCatalog};

use crate::backend_client::DEFAULT_BACKEND_URL;
use crate::error::ConfigError;
use crate::executor::{ExecutorSettings, FallbackPolicy};
use crate::providers::SamplingParams;
use crate::providers::body::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

use common::ErrorLocation;
use models::ProviderId;

use std::collections::HashMap;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;
const MAX_TIMEOUT_SECS: u64 = 300;
const MAX_TOKENS_LIMIT: u32 = 32_000;

// ============================================
// ENUMS WITH DEFAULTS
// ============================================

/// Who holds the vendor keys and the credit ledger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// The user's own API key or a backend-issued redemption code.
    #[default]
    Extension,
    /// Server-held vendor keys, local credit ledger, template fallback.
    Backend,
}

impl DeploymentMode {
    pub fn fallback_policy(&self) -> FallbackPolicy {
        match self {
            DeploymentMode::Extension => FallbackPolicy::Surface,
            DeploymentMode::Backend => FallbackPolicy::LocalTemplate,
        }
    }
}

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub base_url: String,
    /// The backend races its own vendor call before answering, so this
    /// must outlast `network.timeout_secs`.
    #[serde(default = "default_backend_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            timeout_secs: default_backend_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl NetworkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub default_provider: ProviderId,
    /// Endpoint overrides keyed by provider id.
    #[serde(default)]
    pub endpoints: HashMap<ProviderId, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnhancerConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub deployment: DeploymentMode,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            deployment: DeploymentMode::default(),
            backend: BackendConfig::default(),
            network: NetworkConfig::default(),
            providers: ProvidersConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}
fn default_backend_timeout_secs() -> u64 {
    30
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}
fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

// ============================================
// IMPLEMENTATION
// ============================================

impl EnhancerConfig {
    /// Platform config directory for the app (`{config_dir}/prompt-enhancer`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DirectoryNotFound`] if the platform has no
    /// config directory.
    #[track_caller]
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(crate::APP_DIR_NAME))
            .ok_or(ConfigError::DirectoryNotFound {
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Load config from {config_dir}/config.json.
    ///
    /// # Returns
    ///
    /// Returns `Ok(EnhancerConfig)` if loaded successfully or defaults if file missing.
    /// Returns `Err(ConfigError)` if file exists but is corrupted/invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: EnhancerConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/config.json using atomic write.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation,
    /// serialization, the write or the rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(validation_error(format!(
                "Invalid version: {} (expected 1-{})",
                self.version, CONFIG_VERSION
            )));
        }

        if self.network.timeout_secs == 0 || self.network.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(validation_error(format!(
                "Invalid timeout: {}s (must be 1-{MAX_TIMEOUT_SECS})",
                self.network.timeout_secs
            )));
        }

        if self.backend.timeout_secs == 0 || self.backend.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(validation_error(format!(
                "Invalid backend timeout: {}s (must be 1-{MAX_TIMEOUT_SECS})",
                self.backend.timeout_secs
            )));
        }

        if !(0.0..=2.0).contains(&self.network.temperature) {
            return Err(validation_error(format!(
                "Invalid temperature: {} (must be 0.0-2.0)",
                self.network.temperature
            )));
        }

        if self.network.max_tokens == 0 || self.network.max_tokens > MAX_TOKENS_LIMIT {
            return Err(validation_error(format!(
                "Invalid max_tokens: {} (must be 1-{MAX_TOKENS_LIMIT})",
                self.network.max_tokens
            )));
        }

        validate_url("backend.base_url", &self.backend.base_url)?;
        for (provider, endpoint) in &self.providers.endpoints {
            validate_url(&format!("providers.endpoints.{provider}"), endpoint)?;
        }

        Ok(())
    }

    pub fn executor_settings(&self) -> ExecutorSettings {
        ExecutorSettings {
            timeout: self.network.timeout(),
            sampling: SamplingParams {
                temperature: self.network.temperature,
                max_tokens: self.network.max_tokens,
            },
            endpoints: self.providers.endpoints.clone(),
        }
    }
}

#[track_caller]
fn validation_error(reason: String) -> ConfigError {
    ConfigError::ValidationError {
        location: ErrorLocation::from(Location::caller()),
        reason,
    }
}

fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(validation_error(format!("{field} cannot be empty string")));
    }

    let url = url::Url::parse(value)
        .map_err(|e| validation_error(format!("Invalid URL for {field}: {value} ({e})")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(validation_error(format!("Invalid URL format for {field}: {value}")));
    }

    Ok(())
}

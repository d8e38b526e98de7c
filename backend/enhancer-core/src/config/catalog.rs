//! Selectable model lists, optionally overridden by `models.toml`.
//!
//! ```toml
//! [[providers]]
//! id = "openai"
//! default_model = "gpt-4o"
//! models = [
//!     { id = "gpt-4o", name = "GPT-4o" },
//!     { id = "gpt-4o-mini", name = "GPT-4o Mini" },
//! ]
//! ```
//!
//! Providers missing from the file keep their built-in list.

use crate::error::ConfigError;
use crate::providers;

use common::ErrorLocation;
use models::ProviderId;

use std::collections::HashMap;
use std::panic::Location;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

const MODELS_FILE_NAME: &str = "models.toml";

// ============================================
// CATALOG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogModel {
    pub id: String,
    pub name: String,
}

impl CatalogModel {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogProvider {
    pub id: ProviderId,
    /// Defaults to the first listed model.
    #[serde(default)]
    pub default_model: Option<String>,
    #[serde(default)]
    pub models: Vec<CatalogModel>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    providers: Vec<CatalogProvider>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    providers: HashMap<ProviderId, CatalogProvider>,
}

impl Default for ModelCatalog {
    /// The registry's built-in lists.
    fn default() -> Self {
        let providers = providers::all()
            .map(|config| {
                let entry = CatalogProvider {
                    id: config.id,
                    default_model: Some(config.default_model.to_string()),
                    models: config
                        .models
                        .iter()
                        .map(|option| CatalogModel::new(option.id, option.name))
                        .collect(),
                };
                (config.id, entry)
            })
            .collect();

        Self { providers }
    }
}

// ============================================
// IMPLEMENTATION
// ============================================

impl ModelCatalog {
    /// Load models.toml from `dir`.
    ///
    /// Tries `{dir}/config/models.toml`, then `{dir}/models.toml`.
    ///
    /// # Returns
    ///
    /// Always returns `Ok(ModelCatalog)` - either loaded or built-in.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let paths = [
            dir.join("config").join(MODELS_FILE_NAME),
            dir.join(MODELS_FILE_NAME),
        ];

        for path in &paths {
            if path.exists() {
                match Self::load_from_path(path) {
                    Ok(catalog) => {
                        info!("Model catalog loaded from {}", path.display());
                        return Ok(catalog);
                    }
                    Err(e) => {
                        warn!("Failed to load models from {}: {}", path.display(), e);
                    }
                }
            }
        }

        info!("No models.toml found, using built-in model lists");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            location: ErrorLocation::from(Location::caller()),
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_toml_str(&contents).map_err(|reason| ConfigError::ParseError {
            location: ErrorLocation::from(Location::caller()),
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parse catalog TOML and layer it over the built-in lists.
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        let file: CatalogFile = toml::from_str(contents).map_err(|e| e.to_string())?;

        let mut catalog = Self::default();
        for entry in file.providers {
            if entry.models.is_empty() {
                warn!("models.toml lists no models for {}, keeping built-in list", entry.id);
                continue;
            }
            if let Some(default) = &entry.default_model
                && !entry.models.iter().any(|model| &model.id == default)
            {
                return Err(format!(
                    "default_model '{default}' for {} is not in its model list",
                    entry.id
                ));
            }
            catalog.providers.insert(entry.id, entry);
        }

        Ok(catalog)
    }

    pub fn models(&self, provider: ProviderId) -> &[CatalogModel] {
        self.providers
            .get(&provider)
            .map(|entry| entry.models.as_slice())
            .unwrap_or_default()
    }

    pub fn default_model(&self, provider: ProviderId) -> &str {
        self.providers
            .get(&provider)
            .and_then(|entry| {
                entry
                    .default_model
                    .as_deref()
                    .or_else(|| entry.models.first().map(|model| model.id.as_str()))
            })
            .unwrap_or_else(|| providers::default_model(provider))
    }
}

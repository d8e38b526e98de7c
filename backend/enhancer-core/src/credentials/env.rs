//! Server-held vendor keys for the backend deployment.
//!
//! Keys come from a `.env` file (cwd first, then the executable's
//! directory) layered under the process environment. Blank values are
//! skipped. Keys are wrapped in [`RedactedSecret`] and only their lengths
//! are ever logged.

use crate::providers;

use common::RedactedSecret;
use models::ProviderId;

use std::collections::HashMap;
use std::path::PathBuf;

use log::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct ServerKeys {
    keys: HashMap<ProviderId, RedactedSecret>,
}

impl ServerKeys {
    /// Build from any variable lookup (`std::env::var`, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut keys = HashMap::new();

        for config in providers::all() {
            match lookup(config.api_key_env) {
                Some(value) if !value.trim().is_empty() => {
                    let key = RedactedSecret::new(value.trim());
                    info!(
                        "Found server key for provider: {} (from {}, {} chars)",
                        config.id,
                        config.api_key_env,
                        key.len()
                    );
                    keys.insert(config.id, key);
                }
                Some(_) => warn!("{} is set but blank, ignoring", config.api_key_env),
                None => debug!("No {} env var found for provider {}", config.api_key_env, config.id),
            }
        }

        Self { keys }
    }

    pub fn with_key(mut self, provider: ProviderId, key: impl Into<String>) -> Self {
        self.keys.insert(provider, RedactedSecret::new(key));
        self
    }

    pub fn get(&self, provider: ProviderId) -> Option<&RedactedSecret> {
        self.keys.get(&provider)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Load `.env` (non-fatal if missing) then read each provider's variable.
pub fn load_server_keys() -> ServerKeys {
    if try_load_dotenv().is_none() {
        debug!("No .env file found - will check existing environment variables");
    }

    ServerKeys::from_lookup(|name| std::env::var(name).ok())
}

fn try_load_dotenv() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded .env from: {:?}", path);
        return Some(path);
    }

    let exe_path = std::env::current_exe().ok()?;
    let env_path = exe_path.parent()?.join(".env");
    if !env_path.exists() {
        return None;
    }

    match dotenvy::from_path(&env_path) {
        Ok(()) => {
            info!("Loaded .env from: {:?}", env_path);
            Some(env_path)
        }
        Err(e) => {
            warn!("Failed to parse .env at {:?}: {}", env_path, e);
            None
        }
    }
}

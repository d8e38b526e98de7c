use super::{PersistedState, StateStore};
use crate::error::StoreError;

use common::ErrorLocation;
use models::{Credential, EnhancementSettings, UsageStats};

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use log::{debug, info};

pub const STATE_FILE_NAME: &str = "state.json";

/// JSON file store: one `state.json` under a data directory.
///
/// Every mutation rewrites the whole file through a temp file + rename.
#[derive(Debug)]
pub struct FileStateStore {
    dir: PathBuf,
    guard: Mutex<()>,
}

impl FileStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STATE_FILE_NAME)
    }

    fn read(&self) -> Result<PersistedState, StoreError> {
        let _lock = self.lock()?;
        load_state(&self.path())
    }

    fn update(&self, apply: impl FnOnce(&mut PersistedState)) -> Result<(), StoreError> {
        let _lock = self.lock()?;
        let path = self.path();

        let mut state = load_state(&path)?;
        apply(&mut state);
        write_state(&self.dir, &path, &state)
    }

    #[track_caller]
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, StoreError> {
        self.guard.lock().map_err(|e| StoreError::Lock {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })
    }
}

fn load_state(path: &Path) -> Result<PersistedState, StoreError> {
    if !path.exists() {
        debug!("State file not found at {}, starting empty", path.display());
        return Ok(PersistedState::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| StoreError::Read {
        location: ErrorLocation::from(Location::caller()),
        path: path.to_path_buf(),
        source: e,
    })?;

    if contents.trim().is_empty() {
        return Ok(PersistedState::default());
    }

    serde_json::from_str(&contents).map_err(|e| StoreError::Parse {
        location: ErrorLocation::from(Location::caller()),
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn write_state(dir: &Path, path: &Path, state: &PersistedState) -> Result<(), StoreError> {
    std::fs::create_dir_all(dir).map_err(|e| StoreError::Write {
        location: ErrorLocation::from(Location::caller()),
        path: dir.to_path_buf(),
        source: e,
    })?;

    let json = serde_json::to_string_pretty(state).map_err(|e| StoreError::Serialize {
        location: ErrorLocation::from(Location::caller()),
        reason: e.to_string(),
    })?;

    let temp_path = dir.join(format!("{STATE_FILE_NAME}.tmp"));
    std::fs::write(&temp_path, json).map_err(|e| StoreError::Write {
        location: ErrorLocation::from(Location::caller()),
        path: temp_path.clone(),
        source: e,
    })?;

    std::fs::rename(&temp_path, path).map_err(|e| StoreError::Write {
        location: ErrorLocation::from(Location::caller()),
        path: path.to_path_buf(),
        source: e,
    })?;

    debug!("State saved to {}", path.display());
    Ok(())
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn credential(&self) -> Result<Option<Credential>, StoreError> {
        Ok(self.read()?.credential())
    }

    async fn save_credential(&self, credential: Option<&Credential>) -> Result<(), StoreError> {
        self.update(|state| state.set_credential(credential))?;
        match credential {
            Some(credential) => info!(
                "Saved {} (length {})",
                credential.kind(),
                credential.secret().len()
            ),
            None => info!("Cleared stored credential"),
        }
        Ok(())
    }

    async fn settings(&self) -> Result<EnhancementSettings, StoreError> {
        Ok(self.read()?.settings)
    }

    async fn save_settings(&self, settings: &EnhancementSettings) -> Result<(), StoreError> {
        self.update(|state| state.settings = settings.clone())
    }

    async fn usage_stats(&self) -> Result<UsageStats, StoreError> {
        Ok(self.read()?.stats)
    }

    async fn save_usage_stats(&self, stats: &UsageStats) -> Result<(), StoreError> {
        self.update(|state| state.stats = stats.clone())
    }

    async fn credit_balance(&self) -> Result<Option<u32>, StoreError> {
        Ok(self.read()?.credits_remaining)
    }

    async fn save_credit_balance(&self, balance: u32) -> Result<(), StoreError> {
        self.update(|state| state.credits_remaining = Some(balance))
    }
}

use super::{PersistedState, StateStore};
use crate::error::StoreError;

use common::ErrorLocation;
use models::{Credential, EnhancementSettings, UsageStats};

use std::panic::Location;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

/// In-process store for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: Mutex<PersistedState>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Result<PersistedState, StoreError> {
        Ok(self.lock()?.clone())
    }

    #[track_caller]
    fn lock(&self) -> Result<MutexGuard<'_, PersistedState>, StoreError> {
        self.state.lock().map_err(|e| StoreError::Lock {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn credential(&self) -> Result<Option<Credential>, StoreError> {
        Ok(self.lock()?.credential())
    }

    async fn save_credential(&self, credential: Option<&Credential>) -> Result<(), StoreError> {
        self.lock()?.set_credential(credential);
        Ok(())
    }

    async fn settings(&self) -> Result<EnhancementSettings, StoreError> {
        Ok(self.lock()?.settings.clone())
    }

    async fn save_settings(&self, settings: &EnhancementSettings) -> Result<(), StoreError> {
        self.lock()?.settings = settings.clone();
        Ok(())
    }

    async fn usage_stats(&self) -> Result<UsageStats, StoreError> {
        Ok(self.lock()?.stats.clone())
    }

    async fn save_usage_stats(&self, stats: &UsageStats) -> Result<(), StoreError> {
        self.lock()?.stats = stats.clone();
        Ok(())
    }

    async fn credit_balance(&self) -> Result<Option<u32>, StoreError> {
        Ok(self.lock()?.credits_remaining)
    }

    async fn save_credit_balance(&self, balance: u32) -> Result<(), StoreError> {
        self.lock()?.credits_remaining = Some(balance);
        Ok(())
    }
}

//! Persistence port for everything that outlives a single enhancement:
//! the credential, settings, usage statistics and cached credit balance.

pub mod file;
pub mod memory;

pub use file::FileStateStore;
pub use memory::MemoryStateStore;

use crate::error::StoreError;

use common::RedactedSecret;
use models::{Credential, EnhancementSettings, UsageStats};

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Async key/value view of the persisted state.
///
/// Implementations serialize their own read-modify-write; callers never
/// hold a lock across an `.await`.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn credential(&self) -> Result<Option<Credential>, StoreError>;

    /// `None` clears both the API key and the redemption code.
    async fn save_credential(&self, credential: Option<&Credential>) -> Result<(), StoreError>;

    /// Stored settings with missing keys filled from the defaults.
    async fn settings(&self) -> Result<EnhancementSettings, StoreError>;

    async fn save_settings(&self, settings: &EnhancementSettings) -> Result<(), StoreError>;

    async fn usage_stats(&self) -> Result<UsageStats, StoreError>;

    async fn save_usage_stats(&self, stats: &UsageStats) -> Result<(), StoreError>;

    /// Last known balance of the stored redemption code, if any.
    async fn credit_balance(&self) -> Result<Option<u32>, StoreError>;

    async fn save_credit_balance(&self, balance: u32) -> Result<(), StoreError>;
}

/// On-disk layout shared by the store implementations.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redemption_code: Option<String>,
    pub settings: EnhancementSettings,
    pub stats: UsageStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits_remaining: Option<u32>,
}

impl PersistedState {
    /// A stored redemption code takes precedence over a stored API key.
    pub fn credential(&self) -> Option<Credential> {
        let non_blank = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(RedactedSecret::new)
        };

        non_blank(&self.redemption_code)
            .map(Credential::RedemptionCode)
            .or_else(|| non_blank(&self.api_key).map(Credential::ApiKey))
    }

    pub fn set_credential(&mut self, credential: Option<&Credential>) {
        let previous_code = self.redemption_code.take();
        self.api_key = None;

        match credential {
            Some(Credential::ApiKey(secret)) => {
                self.api_key = Some(secret.expose().to_string());
                self.credits_remaining = None;
            }
            Some(Credential::RedemptionCode(secret)) => {
                // A new code starts without a known balance.
                if previous_code.as_deref() != Some(secret.expose()) {
                    self.credits_remaining = None;
                }
                self.redemption_code = Some(secret.expose().to_string());
            }
            None => self.credits_remaining = None,
        }
    }
}

impl fmt::Debug for PersistedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedState")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("redemption_code", &self.redemption_code.as_ref().map(|_| "[REDACTED]"))
            .field("settings", &self.settings)
            .field("stats", &self.stats)
            .field("credits_remaining", &self.credits_remaining)
            .finish()
    }
}

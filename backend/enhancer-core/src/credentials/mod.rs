//! Credential and quota gate run before any enhancement.
//!
//! The resolver decides *whether* an enhancement may proceed and with
//! which secret. It never writes: persisting a freshly fetched balance is
//! the orchestrator's job.

pub mod env;

pub use env::{ServerKeys, load_server_keys};

use crate::error::{BACKEND_PROVIDER, BackendError, EnhanceError};

use common::RedactedSecret;
use models::Credential;

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};

/// Asks an authority how many credits a redemption code has left.
#[async_trait]
pub trait CreditChecker: Send + Sync {
    async fn check_credits(&self, code: &RedactedSecret) -> Result<u32, BackendError>;
}

/// Where a redemption-code balance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceSource {
    /// Fresh answer from the companion backend.
    Backend,
    /// Backend unreachable; last value seen locally.
    Cached,
    /// The local store is the ledger (backend deployment).
    Ledger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    ApiKey(RedactedSecret),
    RedemptionCode {
        code: RedactedSecret,
        balance: u32,
        source: BalanceSource,
    },
}

#[derive(Clone, Default)]
pub struct QuotaResolver {
    checker: Option<Arc<dyn CreditChecker>>,
}

impl QuotaResolver {
    /// Resolver whose cached balance is authoritative.
    pub fn ledger() -> Self {
        Self { checker: None }
    }

    /// Resolver that asks `checker` first and degrades to the cache.
    pub fn with_checker(checker: Arc<dyn CreditChecker>) -> Self {
        Self {
            checker: Some(checker),
        }
    }

    /// Gate an enhancement on the stored credential.
    ///
    /// # Errors
    ///
    /// - [`EnhanceError::NoCredential`] if nothing usable is stored
    /// - [`EnhanceError::InvalidCredential`] if the backend rejects the code
    /// - [`EnhanceError::NoCredits`] if the balance is zero
    /// - [`EnhanceError::NetworkFailure`] / [`EnhanceError::Timeout`] if the
    ///   backend is unreachable and no balance was ever cached
    pub async fn resolve(
        &self,
        credential: Option<&Credential>,
        cached_balance: Option<u32>,
    ) -> Result<Resolution, EnhanceError> {
        let credential = match credential {
            Some(credential) if !credential.secret().is_blank() => credential,
            _ => return Err(EnhanceError::no_credential()),
        };

        let code = match credential {
            Credential::ApiKey(key) => return Ok(Resolution::ApiKey(key.clone())),
            Credential::RedemptionCode(code) => code,
        };

        let (balance, source) = match &self.checker {
            None => (cached_balance.unwrap_or(0), BalanceSource::Ledger),
            Some(checker) => match checker.check_credits(code).await {
                Ok(balance) => (balance, BalanceSource::Backend),
                Err(BackendError::NoCredits { .. }) => (0, BalanceSource::Backend),
                Err(error) if error.is_unreachable() => match cached_balance {
                    Some(balance) => {
                        warn!("Credit check failed, using cached balance {balance}: {error}");
                        (balance, BalanceSource::Cached)
                    }
                    None => {
                        return Err(match error {
                            BackendError::Timeout { timeout_ms, .. } => {
                                EnhanceError::timeout(BACKEND_PROVIDER, timeout_ms)
                            }
                            error => EnhanceError::network(BACKEND_PROVIDER, error.to_string()),
                        });
                    }
                },
                Err(error) => return Err(EnhanceError::from_backend(error)),
            },
        };

        debug!("Redemption code balance {balance} ({source:?})");

        if balance == 0 {
            return Err(EnhanceError::no_credits());
        }

        Ok(Resolution::RedemptionCode {
            code: code.clone(),
            balance,
            source,
        })
    }
}

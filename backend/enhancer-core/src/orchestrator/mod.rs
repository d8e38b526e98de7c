//! Inbound surface: one call per user action.
//!
//! Each call reads the current state from the [`StateStore`], performs at
//! most one outbound enhancement, and writes credits and usage back only
//! when the enhancement succeeded. The orchestrator itself holds nothing
//! but immutable configuration between calls.

use crate::backend_client::BackendClient;
use crate::config::{CatalogModel, DeploymentMode, EnhancerConfig, ModelCatalog};
use crate::credentials::{BalanceSource, QuotaResolver, Resolution, ServerKeys};
use crate::error::{BACKEND_PROVIDER, BackendError, CoreError, EnhanceError};
use crate::executor::{Enhancement, EnhancementExecutor, EnhancementSource, KeyProbe};
use crate::prompt;
use crate::providers;
use crate::store::StateStore;

use common::RedactedSecret;
use models::{Credential, EnhancementRequest, EnhancementSettings, ProviderId, UsageStats};

use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::Serialize;

type Today = Arc<dyn Fn() -> String + Send + Sync>;

/// Outcome of [`Enhancer::enhance`], shaped for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stable failure code (`NO_CREDITS`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl EnhanceResponse {
    pub fn succeeded(text: impl Into<String>) -> Self {
        Self {
            success: true,
            enhanced_prompt: Some(text.into()),
            error: None,
            code: None,
        }
    }

    pub fn failed(error: &EnhanceError) -> Self {
        Self {
            success: false,
            enhanced_prompt: None,
            error: Some(error.user_message()),
            code: Some(error.kind().code()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub total: u64,
    pub today: u64,
    pub last_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<u32>,
}

pub struct Enhancer<S: StateStore> {
    config: EnhancerConfig,
    store: S,
    executor: EnhancementExecutor,
    resolver: QuotaResolver,
    backend: Option<Arc<BackendClient>>,
    server_keys: ServerKeys,
    catalog: ModelCatalog,
    today: Today,
}

impl<S: StateStore> Enhancer<S> {
    /// Wire the components for `config.deployment`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] if the config is invalid or an HTTP client
    /// cannot be built.
    pub fn new(config: EnhancerConfig, store: S) -> Result<Self, CoreError> {
        config.validate()?;

        let executor = EnhancementExecutor::new(
            config.executor_settings(),
            config.deployment.fallback_policy(),
        )?;

        let (backend, resolver) = match config.deployment {
            DeploymentMode::Extension => {
                let client = Arc::new(BackendClient::with_timeout(
                    &config.backend.base_url,
                    config.backend.timeout(),
                )?);
                (Some(client.clone()), QuotaResolver::with_checker(client))
            }
            DeploymentMode::Backend => (None, QuotaResolver::ledger()),
        };

        info!("Enhancer ready ({:?} deployment)", config.deployment);

        Ok(Self {
            config,
            store,
            executor,
            resolver,
            backend,
            server_keys: ServerKeys::default(),
            catalog: ModelCatalog::default(),
            today: Arc::new(local_today),
        })
    }

    pub fn with_server_keys(mut self, server_keys: ServerKeys) -> Self {
        self.server_keys = server_keys;
        self
    }

    pub fn with_catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace the calendar used for daily usage counts.
    pub fn with_today(mut self, today: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.today = Arc::new(today);
        self
    }

    pub fn config(&self) -> &EnhancerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ============================================
    // ENHANCEMENT
    // ============================================

    /// Enhance `prompt` with the stored settings and credential.
    ///
    /// Never fails: every error becomes `success: false` with the
    /// human-readable message.
    pub async fn enhance(
        &self,
        prompt: &str,
        provider: Option<&str>,
        model: Option<&str>,
    ) -> EnhanceResponse {
        let settings = match self.store.settings().await {
            Ok(settings) => settings,
            Err(e) => {
                let error = EnhanceError::from(e);
                error!("Failed to read settings: {error}");
                return EnhanceResponse::failed(&error);
            }
        };

        let provider = provider
            .map(|name| providers::lookup_str(name).id)
            .unwrap_or(self.config.providers.default_provider);
        let request = EnhancementRequest::new(prompt, settings, provider, model.map(str::to_string));

        match self.execute(&request).await {
            Ok(enhancement) => EnhanceResponse::succeeded(enhancement.text),
            Err(error) => {
                warn!("Enhancement failed: {error}");
                EnhanceResponse::failed(&error)
            }
        }
    }

    /// Gate, run and account for one enhancement.
    ///
    /// # Errors
    ///
    /// Any [`EnhanceError`]; on error neither credits nor usage change.
    pub async fn execute(&self, request: &EnhancementRequest) -> Result<Enhancement, EnhanceError> {
        prompt::validate_prompt(&request.original_prompt)?;

        let credential = self.store.credential().await?;
        let cached_balance = self.store.credit_balance().await?;
        let resolution = self
            .resolver
            .resolve(credential.as_ref(), cached_balance)
            .await?;

        if let Resolution::RedemptionCode {
            balance,
            source: BalanceSource::Backend,
            ..
        } = &resolution
            && cached_balance != Some(*balance)
        {
            self.store.save_credit_balance(*balance).await?;
        }

        let enhancement = match (&resolution, self.config.deployment) {
            (Resolution::ApiKey(key), _) => self.executor.execute(request, Some(key)).await?,
            (Resolution::RedemptionCode { code, .. }, DeploymentMode::Extension) => {
                self.relay(request, code).await?
            }
            (Resolution::RedemptionCode { balance, .. }, DeploymentMode::Backend) => {
                let key = self.server_keys.get(request.provider);
                if key.is_none() {
                    warn!(
                        "No server key for {}, enhancement will use the local fallback",
                        request.provider
                    );
                }
                let enhancement = self.executor.execute(request, key).await?;
                self.store.save_credit_balance(balance.saturating_sub(1)).await?;
                enhancement
            }
        };

        self.record_usage().await?;

        debug!("Enhancement source: {:?}", enhancement.source);
        Ok(enhancement)
    }

    async fn relay(
        &self,
        request: &EnhancementRequest,
        code: &RedactedSecret,
    ) -> Result<Enhancement, EnhanceError> {
        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| EnhanceError::network(BACKEND_PROVIDER, "no backend configured"))?;

        let relayed = backend
            .enhance(code, &request.original_prompt)
            .await
            .map_err(EnhanceError::from_backend)?;

        if let Some(credits) = relayed.credits_remaining {
            self.store.save_credit_balance(credits).await?;
        }

        Ok(Enhancement {
            text: relayed.enhanced_prompt,
            provider: request.provider,
            model: self.resolved_model(request),
            source: EnhancementSource::Backend,
        })
    }

    async fn record_usage(&self) -> Result<UsageStats, EnhanceError> {
        let mut stats = self.store.usage_stats().await?;
        stats.record_enhancement(&(self.today)());
        self.store.save_usage_stats(&stats).await?;
        Ok(stats)
    }

    fn resolved_model(&self, request: &EnhancementRequest) -> String {
        request
            .effective_model()
            .map(str::to_string)
            .unwrap_or_else(|| self.catalog.default_model(request.provider).to_string())
    }

    // ============================================
    // STATE ACCESSORS
    // ============================================

    pub async fn settings(&self) -> Result<EnhancementSettings, EnhanceError> {
        Ok(self.store.settings().await?)
    }

    pub async fn save_settings(&self, settings: &EnhancementSettings) -> Result<(), EnhanceError> {
        self.store.save_settings(settings).await?;
        info!("Settings saved");
        Ok(())
    }

    pub async fn credential(&self) -> Result<Option<Credential>, EnhanceError> {
        Ok(self.store.credential().await?)
    }

    /// Store the value from the "API key or code" field.
    ///
    /// With a companion backend, a redemption code is checked before it is
    /// stored and the balance it reports is cached. An unreachable backend
    /// does not block saving.
    ///
    /// # Errors
    ///
    /// - [`EnhanceError::NoCredential`] for blank input
    /// - [`EnhanceError::InvalidCredential`] if the backend rejects the code
    pub async fn save_api_key_or_code(&self, value: &str) -> Result<Credential, EnhanceError> {
        let credential = Credential::parse(value).ok_or_else(EnhanceError::no_credential)?;

        let verified_balance = match (&credential, &self.backend) {
            (Credential::RedemptionCode(code), Some(backend)) => {
                match backend.check_credits(code).await {
                    Ok(credits) => Some(credits),
                    Err(BackendError::NoCredits { .. }) => Some(0),
                    Err(e) if e.is_unreachable() => {
                        warn!("Could not verify redemption code, saving it unchecked: {e}");
                        None
                    }
                    Err(e) => return Err(EnhanceError::from_backend(e)),
                }
            }
            _ => None,
        };

        // Saving a different code clears the cached balance, so cache after.
        self.store.save_credential(Some(&credential)).await?;
        if let Some(credits) = verified_balance {
            self.store.save_credit_balance(credits).await?;
            info!("Redemption code verified with {credits} credits");
        }

        Ok(credential)
    }

    pub async fn clear_credential(&self) -> Result<(), EnhanceError> {
        Ok(self.store.save_credential(None).await?)
    }

    pub async fn stats(&self) -> Result<StatsView, EnhanceError> {
        let stats = self.store.usage_stats().await?;
        let credits = self.store.credit_balance().await?;
        let today = (self.today)();

        Ok(StatsView {
            total: stats.total,
            today: stats.today_count(&today),
            last_date: stats.last_date,
            credits,
        })
    }

    /// Current balance of the stored redemption code.
    ///
    /// Asks the backend when it is reachable and caches the answer;
    /// otherwise reports the cached value. `None` when no code is stored.
    pub async fn refresh_credits(&self) -> Result<Option<u32>, EnhanceError> {
        let Some(Credential::RedemptionCode(code)) = self.store.credential().await? else {
            return Ok(None);
        };
        let cached = self.store.credit_balance().await?;

        let Some(backend) = &self.backend else {
            return Ok(Some(cached.unwrap_or(0)));
        };

        match backend.check_credits(&code).await {
            Ok(credits) => {
                self.store.save_credit_balance(credits).await?;
                Ok(Some(credits))
            }
            Err(e) if e.is_unreachable() => {
                warn!("Credit check failed, reporting cached balance: {e}");
                Ok(cached)
            }
            Err(e) => Err(EnhanceError::from_backend(e)),
        }
    }

    /// Test an API key against `provider` before saving it.
    pub async fn probe_api_key(
        &self,
        value: &str,
        provider: Option<&str>,
        model: Option<&str>,
    ) -> Result<KeyProbe, EnhanceError> {
        let key = value.trim();
        if key.is_empty() {
            return Err(EnhanceError::no_credential());
        }

        let provider = provider
            .map(|name| providers::lookup_str(name).id)
            .unwrap_or(self.config.providers.default_provider);
        let probe = self
            .executor
            .probe_api_key(provider, model, &RedactedSecret::new(key))
            .await;

        info!("API key probe for {provider}: {probe:?}");
        Ok(probe)
    }

    pub fn models(&self, provider: ProviderId) -> &[CatalogModel] {
        self.catalog.models(provider)
    }

    pub fn default_model(&self, provider: ProviderId) -> &str {
        self.catalog.default_model(provider)
    }
}

fn local_today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

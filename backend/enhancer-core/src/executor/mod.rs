//! One outbound enhancement call: build the request for the selected
//! vendor, race it against a timeout, classify the answer and, when the
//! policy allows, fall back to the local template.

use crate::error::EnhanceError;
use crate::fallback;
use crate::prompt;
use crate::providers::{self, ProviderConfig, SamplingParams};

use common::{HttpStatusCode, RedactedSecret};
use models::{EnhancementRequest, ProviderId};

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const PROBE_TEXT: &str = "Test connection";
const PROBE_PARAMS: SamplingParams = SamplingParams {
    temperature: 0.1,
    max_tokens: 5,
};

/// What to do when the provider cannot produce an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Return the error to the caller.
    #[default]
    Surface,
    /// Answer with the local template on transport failures, timeouts,
    /// unreadable responses and missing keys.
    LocalTemplate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnhancementSource {
    Provider,
    LocalFallback,
    Backend,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enhancement {
    pub text: String,
    pub provider: ProviderId,
    pub model: String,
    pub source: EnhancementSource,
}

/// Outcome of testing an API key before it is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyProbe {
    Accepted,
    Rejected,
    /// The provider could not confirm either way; callers treat the key as usable.
    Inconclusive,
}

#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    pub timeout: Duration,
    pub sampling: SamplingParams,
    /// Per-provider endpoint overrides (proxies, test servers).
    pub endpoints: HashMap<ProviderId, String>,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            sampling: SamplingParams::default(),
            endpoints: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnhancementExecutor {
    client: Client,
    settings: ExecutorSettings,
    fallback: FallbackPolicy,
}

impl EnhancementExecutor {
    pub fn new(settings: ExecutorSettings, fallback: FallbackPolicy) -> Result<Self, EnhanceError> {
        // The timeout is enforced by the race in `send`, not by the client.
        let client = Client::builder()
            .build()
            .map_err(|e| EnhanceError::network("http-client", e.to_string()))?;

        Ok(Self {
            client,
            settings,
            fallback,
        })
    }

    pub fn settings(&self) -> &ExecutorSettings {
        &self.settings
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        self.fallback
    }

    /// Enhance `request.original_prompt` through its provider.
    ///
    /// # Errors
    ///
    /// Any [`EnhanceError`] the call produced, except those absorbed by
    /// [`FallbackPolicy::LocalTemplate`].
    pub async fn execute(
        &self,
        request: &EnhancementRequest,
        api_key: Option<&RedactedSecret>,
    ) -> Result<Enhancement, EnhanceError> {
        let original_prompt = prompt::validate_prompt(&request.original_prompt)?;
        let config = providers::lookup(request.provider);
        let model = request
            .effective_model()
            .unwrap_or(config.default_model)
            .to_string();

        let outcome = match api_key.filter(|key| !key.is_blank()) {
            Some(key) => {
                let system_text = prompt::build(&request.settings, &request.original_prompt);
                self.complete(config, &model, &system_text, key).await
            }
            None => Err(EnhanceError::no_credential()),
        };

        match outcome {
            Ok(text) => {
                info!(
                    "Enhancement completed via {} ({}), {} chars",
                    config.id,
                    model,
                    text.len()
                );
                Ok(Enhancement {
                    text,
                    provider: config.id,
                    model,
                    source: EnhancementSource::Provider,
                })
            }
            Err(error) if self.absorbs(&error) => {
                warn!("Using local fallback enhancement: {error}");
                Ok(Enhancement {
                    text: fallback::generate(original_prompt),
                    provider: config.id,
                    model,
                    source: EnhancementSource::LocalFallback,
                })
            }
            Err(error) => Err(error),
        }
    }

    /// Send a tiny request to find out whether `api_key` is accepted.
    pub async fn probe_api_key(
        &self,
        provider: ProviderId,
        model: Option<&str>,
        api_key: &RedactedSecret,
    ) -> KeyProbe {
        let config = providers::lookup(provider);
        let model = model
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .unwrap_or(config.default_model);

        let status = match self
            .send(config, model, PROBE_TEXT, api_key, &PROBE_PARAMS)
            .await
        {
            Ok((status, _)) => status,
            Err(EnhanceError::InvalidCredential { .. }) => return KeyProbe::Rejected,
            Err(error) => {
                debug!("Key probe for {provider} inconclusive: {error}");
                return KeyProbe::Inconclusive;
            }
        };

        match status {
            HttpStatusCode::UNAUTHORIZED => KeyProbe::Rejected,
            HttpStatusCode::PAYMENT_REQUIRED | HttpStatusCode::TOO_MANY_REQUESTS => {
                KeyProbe::Accepted
            }
            status if status.is_success() => KeyProbe::Accepted,
            status => {
                debug!("Key probe for {provider} got HTTP {status}");
                KeyProbe::Inconclusive
            }
        }
    }

    fn absorbs(&self, error: &EnhanceError) -> bool {
        self.fallback == FallbackPolicy::LocalTemplate
            && (error.triggers_fallback() || matches!(error, EnhanceError::NoCredential { .. }))
    }

    async fn complete(
        &self,
        config: &ProviderConfig,
        model: &str,
        system_text: &str,
        api_key: &RedactedSecret,
    ) -> Result<String, EnhanceError> {
        let (status, body) = self
            .send(config, model, system_text, api_key, &self.settings.sampling)
            .await?;

        if !status.is_success() {
            warn!("{} returned HTTP {status}", config.id);
            return Err(EnhanceError::from_http_response(config.id, status.0, body));
        }

        let json: Value = serde_json::from_str(&body)
            .map_err(|e| EnhanceError::malformed_response(config.id, e.to_string()))?;

        config.extract(&json)
    }

    /// POST and read the body, raced against the configured timeout.
    ///
    /// Dropping the losing future releases the connection.
    async fn send(
        &self,
        config: &ProviderConfig,
        model: &str,
        text: &str,
        api_key: &RedactedSecret,
        params: &SamplingParams,
    ) -> Result<(HttpStatusCode, String), EnhanceError> {
        let url = self.endpoint(config);
        let headers = config.headers(api_key)?;
        let body = config.body_shape.build_body(model, text, params);
        let timeout_ms = self.settings.timeout.as_millis();

        debug!(
            "POST {url} provider={} model={model} key_len={}",
            config.id,
            api_key.len()
        );

        let call = async {
            let response = self
                .client
                .post(url)
                .headers(headers)
                .json(&body)
                .send()
                .await?;
            let status = HttpStatusCode(response.status().as_u16());
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, text))
        };

        match tokio::time::timeout(self.settings.timeout, call).await {
            Ok(Ok(answer)) => Ok(answer),
            Ok(Err(e)) => Err(EnhanceError::from_reqwest(config.id, &e, timeout_ms)),
            Err(_) => Err(EnhanceError::timeout(config.id.as_str(), timeout_ms)),
        }
    }

    fn endpoint<'a>(&'a self, config: &'a ProviderConfig) -> &'a str {
        self.settings
            .endpoints
            .get(&config.id)
            .map(String::as_str)
            .unwrap_or(config.endpoint_url)
    }
}

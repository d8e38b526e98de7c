//! HTTP client for the companion backend that owns redemption codes.
//!
//! Two endpoints are used:
//! - `GET /api/check_credits?redemption_code=…` → `{success, remaining_credits}`
//! - `POST /api/enhance {code, prompt}` → `{success, enhanced_prompt, credits_remaining}`

use crate::credentials::CreditChecker;
use crate::error::BackendError;

use common::{ErrorLocation, HttpStatusCode, RedactedSecret};

use std::panic::Location;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use url::Url;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_DURATION: Duration = Duration::from_secs(10);
const CHECK_CREDITS_ENDPOINT: &str = "api/check_credits";
const ENHANCE_ENDPOINT: &str = "api/enhance";
const REDEMPTION_CODE_PARAM: &str = "redemption_code";

/// Result of a backend-relayed enhancement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayedEnhancement {
    pub enhanced_prompt: String,
    /// Authoritative balance after the backend charged for this call.
    pub credits_remaining: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CheckCreditsResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    remaining_credits: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EnhanceResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    enhanced_prompt: Option<String>,
    #[serde(default)]
    credits_remaining: Option<i64>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: Url,
    client: Client,
    timeout: Duration,
}

impl BackendClient {
    pub fn new(base_url_str: &str) -> Result<Self, BackendError> {
        Self::with_timeout(base_url_str, DEFAULT_TIMEOUT_DURATION)
    }

    pub fn with_timeout(base_url_str: &str, timeout: Duration) -> Result<Self, BackendError> {
        let mut base_url = Url::parse(base_url_str)?;
        // `Url::join` drops the last segment unless the base ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            client,
            timeout,
        })
    }

    /// Remaining credits for `code`, never below zero.
    ///
    /// # Errors
    ///
    /// - [`BackendError::Rejected`] if the backend does not know the code
    /// - [`BackendError::Network`] / [`BackendError::Timeout`] /
    ///   [`BackendError::Server`] if it cannot answer
    pub async fn check_credits(&self, code: &RedactedSecret) -> Result<u32, BackendError> {
        let mut url = self.base_url.join(CHECK_CREDITS_ENDPOINT)?;
        url.query_pairs_mut()
            .append_pair(REDEMPTION_CODE_PARAM, code.expose());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = Self::ensure_success(response).await?;

        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        let body: CheckCreditsResponse = serde_json::from_str(&text)?;

        if !body.success {
            return Err(BackendError::Rejected {
                message: body
                    .message
                    .unwrap_or_else(|| "Invalid redemption code".to_string()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let credits = clamp_credits(body.remaining_credits).unwrap_or(0);
        debug!("Backend reports {credits} credits remaining");
        Ok(credits)
    }

    /// Have the backend enhance `prompt` and charge `code` one credit.
    ///
    /// # Errors
    ///
    /// - [`BackendError::Timeout`] if no answer arrives within the client timeout
    /// - [`BackendError::Rejected`] on 404 (unknown code)
    /// - [`BackendError::NoCredits`] on 403
    /// - [`BackendError::Server`] on any other non-2xx
    /// - [`BackendError::Json`] if a 2xx body has no enhanced prompt
    pub async fn enhance(
        &self,
        code: &RedactedSecret,
        prompt: &str,
    ) -> Result<RelayedEnhancement, BackendError> {
        let url = self.base_url.join(ENHANCE_ENDPOINT)?;
        let body = json!({ "code": code.expose(), "prompt": prompt });

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = Self::ensure_success(response).await?;

        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        let body: EnhanceResponse = serde_json::from_str(&text)?;

        let enhanced_prompt = body
            .enhanced_prompt
            .filter(|text| body.success && !text.trim().is_empty())
            .ok_or_else(|| BackendError::Json {
                message: body
                    .error
                    .unwrap_or_else(|| "response has no enhanced_prompt".to_string()),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let credits_remaining = clamp_credits(body.credits_remaining);
        info!("Backend enhancement succeeded, credits remaining: {credits_remaining:?}");

        Ok(RelayedEnhancement {
            enhanced_prompt: enhanced_prompt.trim().to_string(),
            credits_remaining,
        })
    }

    #[track_caller]
    fn transport_error(&self, error: reqwest::Error) -> BackendError {
        BackendError::from_reqwest(error, self.timeout)
    }

    async fn ensure_success(response: Response) -> Result<Response, BackendError> {
        let status = HttpStatusCode(response.status().as_u16());
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.error.or(body.message))
            .unwrap_or(text);
        let location = ErrorLocation::from(Location::caller());

        Err(match status {
            HttpStatusCode::NOT_FOUND => BackendError::Rejected { message, location },
            HttpStatusCode::FORBIDDEN => BackendError::NoCredits { message, location },
            status => BackendError::Server {
                status,
                message,
                location,
            },
        })
    }
}

fn clamp_credits(value: Option<i64>) -> Option<u32> {
    value.map(|credits| u32::try_from(credits.max(0)).unwrap_or(u32::MAX))
}

#[async_trait]
impl CreditChecker for BackendClient {
    async fn check_credits(&self, code: &RedactedSecret) -> Result<u32, BackendError> {
        BackendClient::check_credits(self, code).await
    }
}

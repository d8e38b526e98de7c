//! Error types for the enhancement pipeline.
//!
//! Key design decisions:
//! - HTTP status codes stored directly (not parsed from strings)
//! - `Display` carries the ErrorLocation for logs, `user_message()` is what the UI shows
//! - `triggers_fallback()` decides local fallback from the variant, never from message text
//! - `#[track_caller]` constructors for automatic location capture

use crate::error::{BackendError, StoreError};

use common::{ErrorLocation, HttpStatusCode};
use models::ProviderId;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Provider label used when the failure came from the companion backend.
pub const BACKEND_PROVIDER: &str = "backend";

/// Stable machine-readable code for each failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnhanceErrorKind {
    EmptyPrompt,
    NoCredential,
    NoCredits,
    InvalidCredential,
    RateLimited,
    ProviderBilling,
    ProviderError,
    MalformedResponse,
    NetworkFailure,
    Timeout,
    Storage,
}

impl EnhanceErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            EnhanceErrorKind::EmptyPrompt => "EMPTY_PROMPT",
            EnhanceErrorKind::NoCredential => "NO_CREDENTIAL",
            EnhanceErrorKind::NoCredits => "NO_CREDITS",
            EnhanceErrorKind::InvalidCredential => "INVALID_CREDENTIAL",
            EnhanceErrorKind::RateLimited => "RATE_LIMITED",
            EnhanceErrorKind::ProviderBilling => "PROVIDER_BILLING",
            EnhanceErrorKind::ProviderError => "PROVIDER_ERROR",
            EnhanceErrorKind::MalformedResponse => "MALFORMED_RESPONSE",
            EnhanceErrorKind::NetworkFailure => "NETWORK_FAILURE",
            EnhanceErrorKind::Timeout => "TIMEOUT",
            EnhanceErrorKind::Storage => "STORAGE",
        }
    }
}

/// Errors that can end an enhancement attempt.
#[derive(Debug, ThisError)]
pub enum EnhanceError {
    #[error("Empty Prompt Error {location}")]
    EmptyPrompt { location: ErrorLocation },

    #[error("No Credential Error {location}")]
    NoCredential { location: ErrorLocation },

    #[error("No Credits Error {location}")]
    NoCredits { location: ErrorLocation },

    #[error("Invalid Credential Error for '{provider}': {message} {location}")]
    InvalidCredential {
        provider: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Rate Limited Error for '{provider}' {location}")]
    RateLimited {
        provider: String,
        location: ErrorLocation,
    },

    #[error("Provider Billing Error for '{provider}' {location}")]
    ProviderBilling {
        provider: String,
        location: ErrorLocation,
    },

    #[error("Provider Error for '{provider}': HTTP {status} - {body} {location}")]
    ProviderError {
        provider: String,
        status: HttpStatusCode,
        body: String,
        location: ErrorLocation,
    },

    #[error("Malformed Response Error for '{provider}': {reason} {location}")]
    MalformedResponse {
        provider: String,
        reason: String,
        location: ErrorLocation,
    },

    #[error("Network Error for '{provider}': {message} {location}")]
    NetworkFailure {
        provider: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Timeout Error for '{provider}' after {timeout_ms}ms {location}")]
    Timeout {
        provider: String,
        timeout_ms: u128,
        location: ErrorLocation,
    },

    #[error("Storage Error: {source}")]
    Storage {
        #[from]
        source: StoreError,
    },
}

impl EnhanceError {
    #[track_caller]
    pub fn empty_prompt() -> Self {
        EnhanceError::EmptyPrompt {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn no_credential() -> Self {
        EnhanceError::NoCredential {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn no_credits() -> Self {
        EnhanceError::NoCredits {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_credential(provider: impl Into<String>, message: impl Into<String>) -> Self {
        EnhanceError::InvalidCredential {
            provider: provider.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn malformed_response(provider: ProviderId, reason: impl Into<String>) -> Self {
        EnhanceError::MalformedResponse {
            provider: provider.to_string(),
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        EnhanceError::NetworkFailure {
            provider: provider.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn timeout(provider: impl Into<String>, timeout_ms: u128) -> Self {
        EnhanceError::Timeout {
            provider: provider.into(),
            timeout_ms,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Classify a non-2xx vendor response by status code.
    #[track_caller]
    pub fn from_http_response(provider: ProviderId, status_code: u16, body: impl Into<String>) -> Self {
        let location = ErrorLocation::from(Location::caller());
        let provider = provider.to_string();

        match HttpStatusCode(status_code) {
            HttpStatusCode::UNAUTHORIZED => EnhanceError::InvalidCredential {
                provider,
                message: String::from("provider rejected the API key"),
                location,
            },
            HttpStatusCode::PAYMENT_REQUIRED => EnhanceError::ProviderBilling { provider, location },
            HttpStatusCode::TOO_MANY_REQUESTS => EnhanceError::RateLimited { provider, location },
            status => EnhanceError::ProviderError {
                provider,
                status,
                body: body.into(),
                location,
            },
        }
    }

    /// Categorize a transport error before it is flattened to a string.
    #[track_caller]
    pub fn from_reqwest(provider: ProviderId, error: &reqwest::Error, timeout_ms: u128) -> Self {
        if error.is_timeout() {
            return EnhanceError::timeout(provider.to_string(), timeout_ms);
        }

        EnhanceError::network(provider.to_string(), error.to_string())
    }

    /// Map a companion-backend failure onto the enhancement taxonomy.
    #[track_caller]
    pub fn from_backend(error: BackendError) -> Self {
        let location = ErrorLocation::from(Location::caller());
        let provider = BACKEND_PROVIDER.to_string();

        match error {
            BackendError::Rejected { message, .. } => EnhanceError::InvalidCredential {
                provider,
                message,
                location,
            },
            BackendError::NoCredits { .. } => EnhanceError::NoCredits { location },
            BackendError::Server {
                status, message, ..
            } => EnhanceError::ProviderError {
                provider,
                status,
                body: message,
                location,
            },
            BackendError::Json { message, .. } => EnhanceError::MalformedResponse {
                provider,
                reason: message,
                location,
            },
            BackendError::Timeout { timeout_ms, .. } => EnhanceError::Timeout {
                provider,
                timeout_ms,
                location,
            },
            BackendError::Network { message, .. } | BackendError::UrlParse { message, .. } => {
                EnhanceError::NetworkFailure {
                    provider,
                    message,
                    location,
                }
            }
        }
    }

    pub fn kind(&self) -> EnhanceErrorKind {
        match self {
            EnhanceError::EmptyPrompt { .. } => EnhanceErrorKind::EmptyPrompt,
            EnhanceError::NoCredential { .. } => EnhanceErrorKind::NoCredential,
            EnhanceError::NoCredits { .. } => EnhanceErrorKind::NoCredits,
            EnhanceError::InvalidCredential { .. } => EnhanceErrorKind::InvalidCredential,
            EnhanceError::RateLimited { .. } => EnhanceErrorKind::RateLimited,
            EnhanceError::ProviderBilling { .. } => EnhanceErrorKind::ProviderBilling,
            EnhanceError::ProviderError { .. } => EnhanceErrorKind::ProviderError,
            EnhanceError::MalformedResponse { .. } => EnhanceErrorKind::MalformedResponse,
            EnhanceError::NetworkFailure { .. } => EnhanceErrorKind::NetworkFailure,
            EnhanceError::Timeout { .. } => EnhanceErrorKind::Timeout,
            EnhanceError::Storage { .. } => EnhanceErrorKind::Storage,
        }
    }

    /// Whether the backend deployment may answer with the local template
    /// instead of surfacing this error.
    pub fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            EnhanceError::NetworkFailure { .. }
                | EnhanceError::Timeout { .. }
                | EnhanceError::MalformedResponse { .. }
        )
    }

    /// Human-readable text shown to the user (no source locations).
    pub fn user_message(&self) -> String {
        match self {
            EnhanceError::EmptyPrompt { .. } => String::from("Please enter a prompt to enhance"),
            EnhanceError::NoCredential { .. } => String::from(
                "API key or redemption code not configured. Please set one in the extension settings.",
            ),
            EnhanceError::NoCredits { .. } => String::from("No credits remaining"),
            EnhanceError::InvalidCredential { provider, .. } if provider == BACKEND_PROVIDER => {
                String::from("Invalid redemption code. Please check the code and try again.")
            }
            EnhanceError::InvalidCredential { provider, .. } => {
                format!("Invalid API key or code. Please check your {provider} credentials.")
            }
            EnhanceError::RateLimited { .. } => {
                String::from("Rate limit exceeded. Please try again later.")
            }
            EnhanceError::ProviderBilling { provider, .. } => {
                format!("Insufficient credits. Please add credits to your {provider} account.")
            }
            EnhanceError::ProviderError { status, body, .. } => {
                let body = body.trim();
                if body.is_empty() {
                    format!("API Error: {status} - Unknown error")
                } else {
                    format!("API Error: {status} - {body}")
                }
            }
            EnhanceError::MalformedResponse { .. } => String::from("Invalid API response format"),
            EnhanceError::NetworkFailure { provider, .. } => {
                format!("Could not reach {provider}. Please check your connection.")
            }
            EnhanceError::Timeout { provider, .. } => {
                format!("{provider} did not respond in time. Please try again.")
            }
            EnhanceError::Storage { .. } => String::from("Failed to access local extension storage"),
        }
    }

    /// Get the provider name if applicable.
    pub fn provider(&self) -> Option<&str> {
        match self {
            EnhanceError::InvalidCredential { provider, .. } => Some(provider),
            EnhanceError::RateLimited { provider, .. } => Some(provider),
            EnhanceError::ProviderBilling { provider, .. } => Some(provider),
            EnhanceError::ProviderError { provider, .. } => Some(provider),
            EnhanceError::MalformedResponse { provider, .. } => Some(provider),
            EnhanceError::NetworkFailure { provider, .. } => Some(provider),
            EnhanceError::Timeout { provider, .. } => Some(provider),
            _ => None,
        }
    }

    /// Get HTTP status code if applicable.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            EnhanceError::ProviderError { status, .. } => Some(status.0),
            _ => None,
        }
    }
}

//! Errors talking to the companion backend (`/api/enhance`, `/api/check_credits`).

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;
use std::time::Duration;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum BackendError {
    #[error("Backend Network Error: {message} {location}")]
    Network {
        message: String,
        location: ErrorLocation,
    },

    #[error("Backend Timeout: no answer within {timeout_ms}ms {location}")]
    Timeout {
        timeout_ms: u128,
        location: ErrorLocation,
    },

    #[error("Backend Rejected Code: {message} {location}")]
    Rejected {
        message: String,
        location: ErrorLocation,
    },

    #[error("Backend No Credits: {message} {location}")]
    NoCredits {
        message: String,
        location: ErrorLocation,
    },

    #[error("Backend Server Error: HTTP {status} - {message} {location}")]
    Server {
        status: HttpStatusCode,
        message: String,
        location: ErrorLocation,
    },

    #[error("Backend JSON Error: {message} {location}")]
    Json {
        message: String,
        location: ErrorLocation,
    },

    #[error("Backend URL Parse Error: {message} {location}")]
    UrlParse {
        message: String,
        location: ErrorLocation,
    },
}

impl BackendError {
    /// The backend could not be reached or did not answer usefully, as
    /// opposed to answering with a definite verdict about the code.
    pub fn is_unreachable(&self) -> bool {
        match self {
            BackendError::Network { .. } => true,
            BackendError::Timeout { .. } => true,
            BackendError::Server { status, .. } => status.is_server_error(),
            BackendError::Json { .. } => true,
            BackendError::Rejected { .. } => false,
            BackendError::NoCredits { .. } => false,
            BackendError::UrlParse { .. } => false,
        }
    }
}

impl From<url::ParseError> for BackendError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        BackendError::UrlParse {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl BackendError {
    /// Transport failure of a client whose requests give up after `timeout`.
    #[track_caller]
    pub fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        let location = ErrorLocation::from(Location::caller());
        if error.is_timeout() {
            BackendError::Timeout {
                timeout_ms: timeout.as_millis(),
                location,
            }
        } else {
            BackendError::Network {
                message: error.to_string(),
                location,
            }
        }
    }
}

impl From<reqwest::Error> for BackendError {
    #[track_caller]
    fn from(error: reqwest::Error) -> Self {
        BackendError::Network {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for BackendError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        BackendError::Json {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

use common::ErrorLocation;
use enhancer_core::error::{ConfigError, CoreError, EnhanceError};

use std::panic::Location;

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by CLI commands.
///
/// Printed as JSON on stderr, so every variant stays serializable and
/// carries the location where it was raised.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum AppError {
    /// Error from this app (logger, directories, argument handling)
    #[error("App Error: {message} {location}")]
    App {
        message: String,
        location: ErrorLocation,
    },

    /// Error from enhancer-core operations
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        /// Stable code for enhancement failures (`NO_CREDITS`, ...).
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<&'static str>,
        location: ErrorLocation,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },
}

impl AppError {
    #[track_caller]
    pub fn app(message: impl Into<String>) -> Self {
        AppError::App {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<EnhanceError> for AppError {
    #[track_caller]
    fn from(error: EnhanceError) -> Self {
        AppError::Core {
            message: error.user_message(),
            code: Some(error.kind().code()),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for AppError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        AppError::Config {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<CoreError> for AppError {
    #[track_caller]
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Enhance(e) => AppError::from(e),
            CoreError::Config(e) => AppError::from(e),
            other => AppError::Core {
                message: other.to_string(),
                code: None,
                location: ErrorLocation::from(Location::caller()),
            },
        }
    }
}

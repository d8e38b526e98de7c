//! Domain models for the prompt enhancer.
//!
//! Pure data structures shared by the orchestration layer and the CLI.
//! Nothing in here performs I/O.
//!
//! ## Architecture
//!
//! - **common**: error location, secret redaction, status codes
//! - **models** (this crate): providers, settings, credentials, usage, requests
//! - **enhancer-core**: orchestration operating on these models
//! - **prompt-enhancer**: CLI wiring everything together

pub mod credential;
pub mod error;
pub mod provider;
pub mod request;
pub mod settings;
pub mod usage;

#[cfg(test)]
mod tests;

pub use credential::Credential;
pub use error::model_error::ModelError;
pub use provider::ProviderId;
pub use request::EnhancementRequest;
pub use settings::{Description, EnhancementSettings, Format, Length, Tone};
pub use usage::UsageStats;

//! Prompt enhancement orchestration.
//!
//! ```text
//! caller → credentials (gate) → prompt (render) → providers (lookup)
//!        → executor (call, race, classify, fallback) → store (credits, usage)
//! ```
//!
//! [`orchestrator::Enhancer`] ties the pieces together; everything else is
//! usable on its own.

pub mod backend_client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod executor;
pub mod fallback;
pub mod orchestrator;
pub mod prompt;
pub mod providers;
pub mod store;

#[cfg(test)]
mod tests;

pub use orchestrator::{EnhanceResponse, Enhancer, StatsView};

/// Directory name under the platform config/data directories.
pub const APP_DIR_NAME: &str = "prompt-enhancer";

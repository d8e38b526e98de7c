//! Shared primitives for the prompt enhancer workspace.
//!
//! Everything here is domain-agnostic plumbing used by both the data
//! models and the orchestration layer:
//!
//! - **ErrorLocation**: call-site capture attached to every error variant
//! - **RedactedSecret**: API keys and redemption codes that never leak into logs
//! - **HttpStatusCode**: status classification for vendor and backend responses

pub mod error;
pub mod http_status;
pub mod redacted_secret;


pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use http_status::HttpStatusCode;
pub use redacted_secret::RedactedSecret;

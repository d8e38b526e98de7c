use crate::ModelError;

use common::ErrorLocation;

use std::fmt;
use std::panic::Location;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Third-party LLM vendor an enhancement can be routed to.
///
/// Closed set: adding a vendor means adding a variant here and a matching
/// arm in the provider registry, which the compiler enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenRouter,
    OpenAi,
    Anthropic,
    Groq,
    Perplexity,
}

impl ProviderId {
    pub const ALL: [ProviderId; 5] = [
        ProviderId::OpenRouter,
        ProviderId::OpenAi,
        ProviderId::Anthropic,
        ProviderId::Groq,
        ProviderId::Perplexity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenRouter => "openrouter",
            ProviderId::OpenAi => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Groq => "groq",
            ProviderId::Perplexity => "perplexity",
        }
    }
}

impl Default for ProviderId {
    fn default() -> Self {
        ProviderId::OpenRouter
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ModelError;

    #[track_caller]
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        ProviderId::ALL
            .into_iter()
            .find(|id| id.as_str() == normalized)
            .ok_or_else(|| ModelError::Validation {
                message: format!("Unknown provider: {value}"),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

//! Static adapter data for the five supported LLM vendors.
//!
//! One [`ProviderConfig`] per [`ProviderId`]; lookups are total over the
//! enum, and string lookups fall back to OpenRouter. Nothing here touches
//! the network or holds mutable state.

pub mod body;

pub use body::{BodyShape, SamplingParams};

use crate::error::EnhanceError;

use common::RedactedSecret;
use models::ProviderId;

use const_format::concatcp;
use log::warn;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;

const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
const PERPLEXITY_API_BASE: &str = "https://api.perplexity.ai";

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
const MESSAGES_PATH: &str = "/messages";

pub const APP_TITLE: &str = "AI Prompt Enhancer";
pub const APP_REFERER: &str = "https://ai-prompt-enhancer.local";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// How the API key travels to the vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `x-api-key: <key>`
    ApiKeyHeader,
}

/// A selectable model offered for a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelOption {
    pub id: &'static str,
    pub name: &'static str,
}

/// Everything needed to talk to one vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub id: ProviderId,
    pub display_name: &'static str,
    pub default_model: &'static str,
    pub endpoint_url: &'static str,
    pub auth: AuthScheme,
    /// Lowercase names, as `HeaderName::from_static` requires.
    pub extra_headers: &'static [(&'static str, &'static str)],
    pub body_shape: BodyShape,
    /// Environment variable holding a server-side key for this vendor.
    pub api_key_env: &'static str,
    /// Selectable models; the first one is `default_model`.
    pub models: &'static [ModelOption],
}

// ============================================
// REGISTRY DATA
// ============================================

const OPENROUTER_MODELS: &[ModelOption] = &[
    ModelOption { id: "microsoft/phi-4-reasoning-plus:free", name: "Microsoft Phi-4 Reasoning Plus (Free)" },
    ModelOption { id: "sarvamai/sarvam-m:free", name: "SarvaMAI Sarvam-M (Free)" },
    ModelOption { id: "qwen/qwen3-30b-a3b:free", name: "Qwen3 30B A3B (Free)" },
    ModelOption { id: "anthropic/claude-3-haiku", name: "Claude 3 Haiku" },
    ModelOption { id: "openai/gpt-4o-mini", name: "GPT-4o Mini" },
];

const OPENAI_MODELS: &[ModelOption] = &[
    ModelOption { id: "gpt-4o-mini", name: "GPT-4o Mini" },
    ModelOption { id: "gpt-4o", name: "GPT-4o" },
    ModelOption { id: "gpt-3.5-turbo", name: "GPT-3.5 Turbo" },
];

const ANTHROPIC_MODELS: &[ModelOption] = &[
    ModelOption { id: "claude-3-haiku-20240307", name: "Claude 3 Haiku" },
    ModelOption { id: "claude-3-sonnet-20240229", name: "Claude 3 Sonnet" },
    ModelOption { id: "claude-3-opus-20240229", name: "Claude 3 Opus" },
];

const GROQ_MODELS: &[ModelOption] = &[
    ModelOption { id: "llama-3.1-8b-instant", name: "Llama 3.1 8B" },
    ModelOption { id: "llama-3.1-70b-versatile", name: "Llama 3.1 70B" },
    ModelOption { id: "mixtral-8x7b-32768", name: "Mixtral 8x7B" },
];

const PERPLEXITY_MODELS: &[ModelOption] = &[
    ModelOption { id: "llama-3.1-sonar-large-128k-online", name: "Sonar Large (Online)" },
    ModelOption { id: "llama-3.1-sonar-small-128k-online", name: "Sonar Small (Online)" },
    ModelOption { id: "llama-3.1-8b-instruct", name: "Llama 3.1 8B Instruct" },
];

static OPENROUTER: ProviderConfig = ProviderConfig {
    id: ProviderId::OpenRouter,
    display_name: "OpenRouter",
    default_model: "microsoft/phi-4-reasoning-plus:free",
    endpoint_url: concatcp!(OPENROUTER_API_BASE, CHAT_COMPLETIONS_PATH),
    auth: AuthScheme::Bearer,
    extra_headers: &[("x-title", APP_TITLE), ("http-referer", APP_REFERER)],
    body_shape: BodyShape::OpenAiChat,
    api_key_env: "OPENROUTER_API_KEY",
    models: OPENROUTER_MODELS,
};

static OPENAI: ProviderConfig = ProviderConfig {
    id: ProviderId::OpenAi,
    display_name: "OpenAI",
    default_model: "gpt-4o-mini",
    endpoint_url: concatcp!(OPENAI_API_BASE, CHAT_COMPLETIONS_PATH),
    auth: AuthScheme::Bearer,
    extra_headers: &[],
    body_shape: BodyShape::OpenAiChat,
    api_key_env: "OPENAI_API_KEY",
    models: OPENAI_MODELS,
};

static ANTHROPIC: ProviderConfig = ProviderConfig {
    id: ProviderId::Anthropic,
    display_name: "Anthropic",
    default_model: "claude-3-haiku-20240307",
    endpoint_url: concatcp!(ANTHROPIC_API_BASE, MESSAGES_PATH),
    auth: AuthScheme::ApiKeyHeader,
    extra_headers: &[("anthropic-version", ANTHROPIC_VERSION)],
    body_shape: BodyShape::AnthropicMessages,
    api_key_env: "ANTHROPIC_API_KEY",
    models: ANTHROPIC_MODELS,
};

static GROQ: ProviderConfig = ProviderConfig {
    id: ProviderId::Groq,
    display_name: "Groq",
    default_model: "llama-3.1-8b-instant",
    endpoint_url: concatcp!(GROQ_API_BASE, CHAT_COMPLETIONS_PATH),
    auth: AuthScheme::Bearer,
    extra_headers: &[],
    body_shape: BodyShape::OpenAiChat,
    api_key_env: "GROQ_API_KEY",
    models: GROQ_MODELS,
};

static PERPLEXITY: ProviderConfig = ProviderConfig {
    id: ProviderId::Perplexity,
    display_name: "Perplexity",
    default_model: "llama-3.1-sonar-large-128k-online",
    endpoint_url: concatcp!(PERPLEXITY_API_BASE, CHAT_COMPLETIONS_PATH),
    auth: AuthScheme::Bearer,
    extra_headers: &[],
    body_shape: BodyShape::OpenAiChat,
    api_key_env: "PERPLEXITY_API_KEY",
    models: PERPLEXITY_MODELS,
};

// ============================================
// LOOKUP
// ============================================

pub fn lookup(id: ProviderId) -> &'static ProviderConfig {
    match id {
        ProviderId::OpenRouter => &OPENROUTER,
        ProviderId::OpenAi => &OPENAI,
        ProviderId::Anthropic => &ANTHROPIC,
        ProviderId::Groq => &GROQ,
        ProviderId::Perplexity => &PERPLEXITY,
    }
}

/// Look up by raw id; unknown ids get the OpenRouter adapter.
pub fn lookup_str(id: &str) -> &'static ProviderConfig {
    match id.parse::<ProviderId>() {
        Ok(id) => lookup(id),
        Err(_) => {
            warn!("Unknown provider '{id}', using {}", OPENROUTER.id);
            &OPENROUTER
        }
    }
}

pub fn default_model(id: ProviderId) -> &'static str {
    lookup(id).default_model
}

pub fn all() -> impl Iterator<Item = &'static ProviderConfig> {
    ProviderId::ALL.into_iter().map(lookup)
}

impl ProviderConfig {
    /// Authentication plus vendor-specific headers for one request.
    ///
    /// # Errors
    ///
    /// Returns [`EnhanceError::InvalidCredential`] if the key cannot be
    /// carried in an HTTP header (control characters, non-ASCII).
    #[track_caller]
    pub fn headers(&self, api_key: &RedactedSecret) -> Result<HeaderMap, EnhanceError> {
        let mut headers = HeaderMap::new();

        let (name, value) = match self.auth {
            AuthScheme::Bearer => (
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", api_key.expose().trim()),
            ),
            AuthScheme::ApiKeyHeader => (
                HeaderName::from_static("x-api-key"),
                api_key.expose().trim().to_string(),
            ),
        };

        let mut value = HeaderValue::from_str(&value).map_err(|_| {
            EnhanceError::invalid_credential(self.id.as_str(), "API key contains invalid characters")
        })?;
        value.set_sensitive(true);
        headers.insert(name, value);

        for (name, value) in self.extra_headers {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }

        Ok(headers)
    }

    /// Pull the generated text out of a vendor success payload.
    ///
    /// # Errors
    ///
    /// Returns [`EnhanceError::MalformedResponse`] if the expected field is
    /// missing, not a string, or blank after trimming.
    #[track_caller]
    pub fn extract(&self, json: &Value) -> Result<String, EnhanceError> {
        let pointer = self.body_shape.content_pointer();

        let content = json
            .pointer(pointer)
            .ok_or_else(|| EnhanceError::malformed_response(self.id, format!("missing {pointer}")))?
            .as_str()
            .ok_or_else(|| {
                EnhanceError::malformed_response(self.id, format!("{pointer} is not a string"))
            })?
            .trim();

        if content.is_empty() {
            return Err(EnhanceError::malformed_response(self.id, "empty response content"));
        }

        Ok(content.to_string())
    }

    pub fn has_model(&self, model: &str) -> bool {
        self.models.iter().any(|option| option.id == model)
    }
}

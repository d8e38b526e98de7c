use crate::{EnhancementSettings, ProviderId};

/// One user-initiated enhancement. Built per action and dropped after the
/// round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancementRequest {
    pub original_prompt: String,
    pub settings: EnhancementSettings,
    pub provider: ProviderId,
    pub model: Option<String>,
}

impl EnhancementRequest {
    pub fn new(
        original_prompt: impl Into<String>,
        settings: EnhancementSettings,
        provider: ProviderId,
        model: Option<String>,
    ) -> Self {
        Self {
            original_prompt: original_prompt.into(),
            settings,
            provider,
            model,
        }
    }

    /// Explicitly requested model, ignoring blank values.
    pub fn effective_model(&self) -> Option<&str> {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
    }
}

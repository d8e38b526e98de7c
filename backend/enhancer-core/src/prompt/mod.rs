//! Renders the master enhancement template.

use crate::error::EnhanceError;

use models::EnhancementSettings;

use std::sync::OnceLock;

use regex::{Captures, Regex};

pub const PROMPT_TEMPLATE: &str = "You are an expert prompt engineer. Transform the following basic prompt into a perfect, role-based prompt that will generate better AI responses.
ENHANCEMENT REQUIREMENTS:
- Role: {{ROLE}}
- Description Level: {{DESCRIPTION}}
- Output Length: {{LENGTH}}
- Format Style: {{FORMAT}}
- Response Tone: {{TONE}}
ORIGINAL PROMPT:
{{ORIGINAL_PROMPT}}
ENHANCED PROMPT:
Create a comprehensive, role-based prompt that:
1. Establishes clear context and role
2. Provides specific instructions
3. Defines the desired output format
4. Sets appropriate tone and style
5. Includes relevant constraints or requirements
Return only the enhanced prompt, nothing else.";

const PLACEHOLDER_PATTERN: &str = r"\{\{(ROLE|DESCRIPTION|LENGTH|FORMAT|TONE|ORIGINAL_PROMPT)\}\}";

pub const PLACEHOLDERS: [&str; 6] = [
    "{{ROLE}}",
    "{{DESCRIPTION}}",
    "{{LENGTH}}",
    "{{FORMAT}}",
    "{{TONE}}",
    "{{ORIGINAL_PROMPT}}",
];

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).expect("valid regex pattern"))
}

/// Substitute settings and the original prompt into [`PROMPT_TEMPLATE`].
///
/// Replacement happens in a single pass over the template, so placeholder
/// tokens inside the user's prompt come through verbatim.
pub fn build(settings: &EnhancementSettings, original_prompt: &str) -> String {
    placeholder_regex()
        .replace_all(PROMPT_TEMPLATE, |caps: &Captures| match &caps[1] {
            "ROLE" => settings.role_or_default().to_string(),
            "DESCRIPTION" => settings.description.as_str().to_string(),
            "LENGTH" => settings.length.as_str().to_string(),
            "FORMAT" => settings.format.as_str().to_string(),
            "TONE" => settings.tone.as_str().to_string(),
            _ => original_prompt.to_string(),
        })
        .into_owned()
}

/// Trimmed prompt, or [`EnhanceError::EmptyPrompt`] when nothing is left.
#[track_caller]
pub fn validate_prompt(prompt: &str) -> Result<&str, EnhanceError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(EnhanceError::empty_prompt());
    }
    Ok(trimmed)
}

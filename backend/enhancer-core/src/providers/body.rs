use serde_json::{Value, json};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Request/response JSON layout spoken by a vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyShape {
    /// `{model, messages, temperature, max_tokens}` in, `choices[0].message.content` out.
    OpenAiChat,
    /// `{model, max_tokens, messages, temperature}` in, `content[0].text` out.
    AnthropicMessages,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl BodyShape {
    pub fn build_body(&self, model: &str, text: &str, params: &SamplingParams) -> Value {
        let messages = json!([{ "role": "user", "content": text }]);

        match self {
            BodyShape::OpenAiChat => json!({
                "model": model,
                "messages": messages,
                "temperature": params.temperature,
                "max_tokens": params.max_tokens,
            }),
            BodyShape::AnthropicMessages => json!({
                "model": model,
                "max_tokens": params.max_tokens,
                "messages": messages,
                "temperature": params.temperature,
            }),
        }
    }

    /// JSON pointer to the generated text in a success payload.
    pub fn content_pointer(&self) -> &'static str {
        match self {
            BodyShape::OpenAiChat => "/choices/0/message/content",
            BodyShape::AnthropicMessages => "/content/0/text",
        }
    }
}

use crate::error::{EnhanceError, EnhanceErrorKind};
use crate::providers::{self, AuthScheme, BodyShape, SamplingParams};

use common::RedactedSecret;
use models::ProviderId;

use serde_json::json;

/// **VALUE**: Pins the endpoint, auth scheme and default model of every vendor.
///
/// **WHY THIS MATTERS**: These values are only ever exercised against live APIs. A typo in an
/// endpoint or a swapped auth scheme ships silently and every request 404s or 401s.
///
/// **BUG THIS CATCHES**: Would catch a broken `concatcp!` join (missing/double slash) or a
/// provider wired to the wrong record in `lookup`.
#[test]
fn given_each_provider_when_looked_up_then_matches_vendor_table() {
    let cases = [
        (
            ProviderId::OpenRouter,
            "https://openrouter.ai/api/v1/chat/completions",
            AuthScheme::Bearer,
            "microsoft/phi-4-reasoning-plus:free",
        ),
        (
            ProviderId::OpenAi,
            "https://api.openai.com/v1/chat/completions",
            AuthScheme::Bearer,
            "gpt-4o-mini",
        ),
        (
            ProviderId::Anthropic,
            "https://api.anthropic.com/v1/messages",
            AuthScheme::ApiKeyHeader,
            "claude-3-haiku-20240307",
        ),
        (
            ProviderId::Groq,
            "https://api.groq.com/openai/v1/chat/completions",
            AuthScheme::Bearer,
            "llama-3.1-8b-instant",
        ),
        (
            ProviderId::Perplexity,
            "https://api.perplexity.ai/chat/completions",
            AuthScheme::Bearer,
            "llama-3.1-sonar-large-128k-online",
        ),
    ];

    for (id, endpoint, auth, model) in cases {
        let config = providers::lookup(id);
        assert_eq!(config.id, id);
        assert_eq!(config.endpoint_url, endpoint, "endpoint for {id}");
        assert_eq!(config.auth, auth, "auth for {id}");
        assert_eq!(config.default_model, model, "default model for {id}");
        assert_eq!(providers::default_model(id), model);
    }
}

#[test]
fn given_same_id_when_looked_up_twice_then_returns_identical_record() {
    for id in ProviderId::ALL {
        assert_eq!(providers::lookup(id), providers::lookup(id));
        assert!(std::ptr::eq(providers::lookup(id), providers::lookup(id)));
    }
}

#[test]
fn given_unknown_id_when_looked_up_by_string_then_falls_back_to_openrouter() {
    let config = providers::lookup_str("mistral");

    assert_eq!(config.id, ProviderId::OpenRouter);
    assert_eq!(providers::lookup_str("").id, ProviderId::OpenRouter);
    assert_eq!(providers::lookup_str("Groq").id, ProviderId::Groq);
}

#[test]
fn given_each_provider_when_listing_models_then_default_model_comes_first() {
    for config in providers::all() {
        assert!(!config.models.is_empty(), "{} has no models", config.id);
        assert_eq!(config.models[0].id, config.default_model);
        assert!(config.has_model(config.default_model));
    }
}

#[test]
fn given_openrouter_when_building_headers_then_sends_bearer_and_attribution_headers() {
    // GIVEN: The OpenRouter adapter and a key with stray whitespace
    let config = providers::lookup(ProviderId::OpenRouter);
    let key = RedactedSecret::new("  sk-or-test  ");

    // WHEN: Building headers
    let headers = config.headers(&key).expect("headers should build");

    // THEN: Bearer auth with the trimmed key plus both attribution headers
    assert_eq!(headers["authorization"], "Bearer sk-or-test");
    assert_eq!(headers["x-title"], providers::APP_TITLE);
    assert_eq!(headers["http-referer"], providers::APP_REFERER);
    assert!(headers["authorization"].is_sensitive());
}

/// **BUG THIS CATCHES**: Would catch a mixed-case extra header name, which makes
/// `HeaderName::from_static` panic on the first request to that vendor.
#[test]
fn given_every_provider_when_building_headers_then_extra_header_names_are_lowercase() {
    let key = RedactedSecret::new("sk-test");

    for config in providers::all() {
        for (name, _) in config.extra_headers {
            assert_eq!(*name, name.to_ascii_lowercase(), "{} header {name}", config.id);
        }
        let headers = config.headers(&key).expect("headers should build");
        assert_eq!(headers.len(), config.extra_headers.len() + 1);
    }
}

#[test]
fn given_anthropic_when_building_headers_then_uses_api_key_header_and_version() {
    let config = providers::lookup(ProviderId::Anthropic);

    let headers = config
        .headers(&RedactedSecret::new("sk-ant-test"))
        .expect("headers should build");

    assert_eq!(headers["x-api-key"], "sk-ant-test");
    assert_eq!(headers["anthropic-version"], "2023-06-01");
    assert!(headers.get("authorization").is_none());
}

#[test]
fn given_key_with_newline_when_building_headers_then_invalid_credential() {
    let config = providers::lookup(ProviderId::OpenAi);

    let result = config.headers(&RedactedSecret::new("sk-abc\ninjected: yes"));

    let error = result.expect_err("control characters must be rejected");
    assert_eq!(error.kind(), EnhanceErrorKind::InvalidCredential);
}

#[test]
fn given_openai_chat_shape_when_building_body_then_has_single_user_message() {
    let params = SamplingParams::default();

    let body = BodyShape::OpenAiChat.build_body("gpt-4o-mini", "hello", &params);

    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["messages"], json!([{ "role": "user", "content": "hello" }]));
    assert_eq!(body["max_tokens"], 1000);
    assert!((body["temperature"].as_f64().unwrap_or_default() - 0.7).abs() < 1e-6);
}

#[test]
fn given_anthropic_shape_when_building_body_then_includes_max_tokens() {
    let params = SamplingParams {
        temperature: 0.2,
        max_tokens: 64,
    };

    let body = BodyShape::AnthropicMessages.build_body("claude-3-haiku-20240307", "hi", &params);

    assert_eq!(body["max_tokens"], 64);
    assert_eq!(body["messages"][0]["content"], "hi");
}

/// **VALUE**: Verifies response extraction trims text and rejects blank content.
///
/// **BUG THIS CATCHES**: Would catch returning `""` as a "successful" enhancement when a vendor
/// answers 200 with whitespace, which would wipe the user's text box.
#[test]
fn given_success_payloads_when_extracting_then_trims_or_reports_malformed() {
    let openai = providers::lookup(ProviderId::OpenAi);
    let anthropic = providers::lookup(ProviderId::Anthropic);

    let text = openai
        .extract(&json!({ "choices": [{ "message": { "content": "  Better prompt \n" } }] }))
        .expect("content present");
    assert_eq!(text, "Better prompt");

    let text = anthropic
        .extract(&json!({ "content": [{ "type": "text", "text": "Claude says" }] }))
        .expect("content present");
    assert_eq!(text, "Claude says");

    let malformed = [
        json!({}),
        json!({ "choices": [] }),
        json!({ "choices": [{ "message": { "content": 42 } }] }),
        json!({ "choices": [{ "message": { "content": "   " } }] }),
    ];
    for payload in malformed {
        let error = openai.extract(&payload).expect_err("should be malformed");
        assert!(matches!(error, EnhanceError::MalformedResponse { .. }), "{payload}");
    }
}

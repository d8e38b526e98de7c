use crate::helpers::{
    TEST_API_KEY, anthropic_success, executor, openai_success, provider_path,
};

use enhancer_core::error::{EnhanceError, EnhanceErrorKind};
use enhancer_core::executor::{EnhancementSource, FallbackPolicy, KeyProbe};

use common::RedactedSecret;
use models::{EnhancementRequest, EnhancementSettings, ProviderId};

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{any, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FAST: Duration = Duration::from_secs(5);

fn request(provider: ProviderId, prompt: &str) -> EnhancementRequest {
    EnhancementRequest::new(prompt, EnhancementSettings::default(), provider, None)
}

fn key() -> RedactedSecret {
    RedactedSecret::new(TEST_API_KEY)
}

/// **VALUE**: End-to-end happy path against an OpenAI-shaped endpoint.
///
/// **WHY THIS MATTERS**: Verifies the pieces agree with each other: the registry default model,
/// the rendered template in the body, the bearer header and the extraction path.
///
/// **BUG THIS CATCHES**: Would catch sending the raw prompt instead of the rendered template,
/// or forgetting the default model when none was requested.
#[tokio::test]
async fn given_openai_success_when_executing_then_returns_trimmed_provider_text() {
    // GIVEN: A mock OpenAI endpoint expecting the default model and bearer auth
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(provider_path(ProviderId::OpenAi)))
        .and(header("authorization", format!("Bearer {TEST_API_KEY}").as_str()))
        .and(body_partial_json(json!({ "model": "gpt-4o-mini", "max_tokens": 1000 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_success("  Enhanced!  ")))
        .expect(1)
        .mount(&server)
        .await;

    let executor = executor(&server, FAST, FallbackPolicy::Surface);

    // WHEN: Executing a request without an explicit model
    let enhancement = executor
        .execute(&request(ProviderId::OpenAi, "write a haiku"), Some(&key()))
        .await
        .expect("enhancement should succeed");

    // THEN: Trimmed text from the provider
    assert_eq!(enhancement.text, "Enhanced!");
    assert_eq!(enhancement.model, "gpt-4o-mini");
    assert_eq!(enhancement.source, EnhancementSource::Provider);

    let received = server.received_requests().await.expect("recording enabled");
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).expect("json body");
    let content = body["messages"][0]["content"].as_str().unwrap_or_default();
    assert!(content.contains("write a haiku"));
    assert!(content.contains("- Role: AI Assistant"));
}

/// **BUG THIS CATCHES**: Would catch the template receiving the trimmed prompt, which loses
/// indentation the user typed on purpose (code snippets, quoted blocks).
#[tokio::test]
async fn given_prompt_with_surrounding_whitespace_when_executing_then_template_gets_it_verbatim() {
    // GIVEN: A prompt whose first line is indented
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(provider_path(ProviderId::OpenAi)))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_success("ok")))
        .expect(1)
        .mount(&server)
        .await;
    let executor = executor(&server, FAST, FallbackPolicy::Surface);
    let prompt = "    fn main() {}\nexplain this\n";

    // WHEN: Executing
    executor
        .execute(&request(ProviderId::OpenAi, prompt), Some(&key()))
        .await
        .expect("enhancement should succeed");

    // THEN: The rendered template carries the prompt untouched
    let received = server.received_requests().await.expect("recording enabled");
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).expect("json body");
    let content = body["messages"][0]["content"].as_str().unwrap_or_default();
    assert!(content.contains("ORIGINAL PROMPT:\n    fn main() {}\nexplain this\n"));
}

#[tokio::test]
async fn given_anthropic_success_when_executing_then_uses_messages_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(provider_path(ProviderId::Anthropic)))
        .and(header("x-api-key", TEST_API_KEY))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_success("From Claude")))
        .expect(1)
        .mount(&server)
        .await;

    let enhancement = executor(&server, FAST, FallbackPolicy::Surface)
        .execute(&request(ProviderId::Anthropic, "summarize this"), Some(&key()))
        .await
        .expect("enhancement should succeed");

    assert_eq!(enhancement.text, "From Claude");
    assert_eq!(enhancement.model, "claude-3-haiku-20240307");
}

#[tokio::test]
async fn given_explicit_model_when_executing_then_body_uses_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "model": "qwen/qwen3-30b-a3b:free" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_success("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let mut req = request(ProviderId::OpenRouter, "hi there");
    req.model = Some(String::from("qwen/qwen3-30b-a3b:free"));

    let enhancement = executor(&server, FAST, FallbackPolicy::Surface)
        .execute(&req, Some(&key()))
        .await
        .expect("enhancement should succeed");

    assert_eq!(enhancement.model, "qwen/qwen3-30b-a3b:free");
}

#[tokio::test]
async fn given_vendor_error_statuses_when_executing_then_classified() {
    let cases = [
        (401, EnhanceErrorKind::InvalidCredential),
        (402, EnhanceErrorKind::ProviderBilling),
        (429, EnhanceErrorKind::RateLimited),
        (500, EnhanceErrorKind::ProviderError),
    ];

    for (status, kind) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_string("vendor says no"))
            .expect(1)
            .mount(&server)
            .await;

        let error = executor(&server, FAST, FallbackPolicy::Surface)
            .execute(&request(ProviderId::Groq, "hello"), Some(&key()))
            .await
            .expect_err("should fail");

        assert_eq!(error.kind(), kind, "status {status}");
    }
}

#[tokio::test]
async fn given_500_with_body_when_executing_then_user_message_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model overloaded"))
        .mount(&server)
        .await;

    let error = executor(&server, FAST, FallbackPolicy::Surface)
        .execute(&request(ProviderId::OpenAi, "hello"), Some(&key()))
        .await
        .expect_err("should fail");

    assert_eq!(error.user_message(), "API Error: 500 - model overloaded");
}

/// **VALUE**: The timeout race fires and surfaces `Timeout` in the extension deployment.
///
/// **BUG THIS CATCHES**: Would catch awaiting the response without a race (test would hang
/// for the full delay and then succeed).
#[tokio::test]
async fn given_slow_provider_when_executing_without_fallback_then_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(openai_success("too late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let error = executor(&server, Duration::from_millis(200), FallbackPolicy::Surface)
        .execute(&request(ProviderId::OpenAi, "hello"), Some(&key()))
        .await
        .expect_err("should time out");

    assert!(matches!(error, EnhanceError::Timeout { timeout_ms: 200, .. }));
}

#[tokio::test]
async fn given_slow_provider_when_executing_with_local_template_then_fallback_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(openai_success("too late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let enhancement = executor(&server, Duration::from_millis(200), FallbackPolicy::LocalTemplate)
        .execute(&request(ProviderId::OpenRouter, "How do I learn to code?"), Some(&key()))
        .await
        .expect("fallback never fails");

    assert_eq!(enhancement.source, EnhancementSource::LocalFallback);
    assert!(enhancement.text.contains("**ROLE**"));
    assert!(enhancement.text.contains("**OBJECTIVE**"));
    assert!(enhancement.text.contains("**TASK**"));
    assert!(enhancement.text.contains("\"How do I learn to code?\""));
}

#[tokio::test]
async fn given_non_json_success_when_executing_then_malformed_or_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let error = executor(&server, FAST, FallbackPolicy::Surface)
        .execute(&request(ProviderId::OpenAi, "hello"), Some(&key()))
        .await
        .expect_err("not json");
    assert_eq!(error.kind(), EnhanceErrorKind::MalformedResponse);

    let enhancement = executor(&server, FAST, FallbackPolicy::LocalTemplate)
        .execute(&request(ProviderId::OpenAi, "hello"), Some(&key()))
        .await
        .expect("fallback");
    assert_eq!(enhancement.source, EnhancementSource::LocalFallback);
}

#[tokio::test]
async fn given_local_template_when_provider_rejects_key_then_error_is_not_absorbed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let error = executor(&server, FAST, FallbackPolicy::LocalTemplate)
        .execute(&request(ProviderId::OpenAi, "hello"), Some(&key()))
        .await
        .expect_err("401 is not a fallback trigger");

    assert_eq!(error.kind(), EnhanceErrorKind::InvalidCredential);
}

#[tokio::test]
async fn given_no_key_when_executing_then_no_network_call() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let error = executor(&server, FAST, FallbackPolicy::Surface)
        .execute(&request(ProviderId::OpenAi, "hello"), None)
        .await
        .expect_err("no key");
    assert_eq!(error.kind(), EnhanceErrorKind::NoCredential);

    let enhancement = executor(&server, FAST, FallbackPolicy::LocalTemplate)
        .execute(&request(ProviderId::OpenAi, "hello"), None)
        .await
        .expect("missing server key falls back");
    assert_eq!(enhancement.source, EnhancementSource::LocalFallback);
}

#[tokio::test]
async fn given_probe_statuses_when_probing_key_then_maps_to_verdicts() {
    let cases = [
        (200, KeyProbe::Accepted),
        (401, KeyProbe::Rejected),
        (402, KeyProbe::Accepted),
        (429, KeyProbe::Accepted),
        (500, KeyProbe::Inconclusive),
    ];

    for (status, verdict) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "max_tokens": 5,
                "messages": [{ "role": "user", "content": "Test connection" }]
            })))
            .respond_with(ResponseTemplate::new(status).set_body_json(openai_success("hi")))
            .expect(1)
            .mount(&server)
            .await;

        let probe = executor(&server, FAST, FallbackPolicy::Surface)
            .probe_api_key(ProviderId::OpenAi, None, &key())
            .await;

        assert_eq!(probe, verdict, "status {status}");
    }
}

#[tokio::test]
async fn given_unreachable_provider_when_probing_key_then_inconclusive() {
    let settings = enhancer_core::executor::ExecutorSettings {
        timeout: FAST,
        endpoints: [(ProviderId::Groq, String::from("http://127.0.0.1:1/chat"))]
            .into_iter()
            .collect(),
        ..Default::default()
    };
    let executor = enhancer_core::executor::EnhancementExecutor::new(settings, FallbackPolicy::Surface)
        .expect("executor should build");

    let probe = executor.probe_api_key(ProviderId::Groq, None, &key()).await;

    assert_eq!(probe, KeyProbe::Inconclusive);
}

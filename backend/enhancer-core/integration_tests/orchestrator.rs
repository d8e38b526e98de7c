use crate::helpers::{
    TEST_API_KEY, TEST_CODE, TEST_DATE, api_key_state, code_state, config, enhancer,
    openai_success, provider_path,
};

use enhancer_core::config::DeploymentMode;
use enhancer_core::credentials::ServerKeys;
use enhancer_core::executor::KeyProbe;
use enhancer_core::store::{MemoryStateStore, PersistedState};
use enhancer_core::{EnhanceResponse, Enhancer};

use models::{Credential, EnhancementSettings, ProviderId, Tone, UsageStats};

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{any, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_openrouter_success(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path(provider_path(ProviderId::OpenRouter)))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_success(text)))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_check_credits(server: &MockServer, credits: i64) {
    Mock::given(method("GET"))
        .and(path("/api/check_credits"))
        .and(query_param("redemption_code", TEST_CODE))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "remaining_credits": credits })),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn snapshot(enhancer: &Enhancer<MemoryStateStore>) -> PersistedState {
    enhancer.store().snapshot().expect("snapshot")
}

// ============================================
// VALIDATION AND GATING
// ============================================

#[tokio::test]
async fn given_whitespace_prompt_when_enhancing_then_empty_prompt_without_network() {
    // GIVEN: Any outbound call would be a bug
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let enhancer = enhancer(&server, DeploymentMode::Extension, api_key_state());

    // WHEN: Enhancing a blank prompt
    let response = enhancer.enhance("   \n\t", None, None).await;

    // THEN: Rejected up front, stats untouched
    assert!(!response.success);
    assert_eq!(response.code, Some("EMPTY_PROMPT"));
    assert_eq!(response.error.as_deref(), Some("Please enter a prompt to enhance"));
    assert_eq!(snapshot(&enhancer).stats, UsageStats::default());
}

#[tokio::test]
async fn given_no_credential_when_enhancing_then_no_credential() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let enhancer = enhancer(&server, DeploymentMode::Extension, PersistedState::default());

    let response = enhancer.enhance("hello", None, None).await;

    assert_eq!(response.code, Some("NO_CREDENTIAL"));
}

/// **VALUE**: A code with no credits never reaches a provider and changes nothing.
///
/// **WHY THIS MATTERS**: A failed enhancement must not cost a credit or count as usage.
///
/// **BUG THIS CATCHES**: Would catch the ledger going negative (u32 underflow) or the stats
/// being recorded before the gate.
#[tokio::test]
async fn given_backend_mode_with_zero_credits_when_enhancing_then_no_credits_and_state_unchanged() {
    // GIVEN: Backend deployment, a code with 0 credits, some existing stats
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let stats = UsageStats {
        total: 5,
        today: 2,
        last_date: String::from("2024-01-01"),
    };
    let state = PersistedState {
        stats: stats.clone(),
        ..code_state(Some(0))
    };
    let enhancer = enhancer(&server, DeploymentMode::Backend, state)
        .with_server_keys(ServerKeys::default().with_key(ProviderId::OpenRouter, "sk-server"));

    // WHEN: Enhancing
    let response = enhancer.enhance("Write a story", None, None).await;

    // THEN: NO_CREDITS, balance and stats exactly as before
    assert_eq!(
        response,
        EnhanceResponse {
            success: false,
            enhanced_prompt: None,
            error: Some(String::from("No credits remaining")),
            code: Some("NO_CREDITS"),
        }
    );
    let after = snapshot(&enhancer);
    assert_eq!(after.credits_remaining, Some(0));
    assert_eq!(after.stats, stats);
}

// ============================================
// PROVIDER OUTCOMES
// ============================================

#[tokio::test]
async fn given_rejected_api_key_when_enhancing_then_invalid_credential_and_stats_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .expect(1)
        .mount(&server)
        .await;
    let enhancer = enhancer(&server, DeploymentMode::Extension, api_key_state());

    let response = enhancer.enhance("Write a story", Some("openai"), None).await;

    assert!(!response.success);
    assert_eq!(response.code, Some("INVALID_CREDENTIAL"));
    assert_eq!(
        response.error.as_deref(),
        Some("Invalid API key or code. Please check your openai credentials.")
    );
    assert_eq!(snapshot(&enhancer).stats, UsageStats::default());
}

#[tokio::test]
async fn given_rate_limited_provider_when_enhancing_then_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;
    let enhancer = enhancer(&server, DeploymentMode::Extension, api_key_state());

    let response = enhancer.enhance("Write a story", None, None).await;

    assert_eq!(response.code, Some("RATE_LIMITED"));
    assert_eq!(
        response.error.as_deref(),
        Some("Rate limit exceeded. Please try again later.")
    );
}

/// **VALUE**: Daily counter rolls over on the first success of a new day.
///
/// **BUG THIS CATCHES**: Would catch incrementing `today` from the stale value (giving 3)
/// instead of restarting it.
#[tokio::test]
async fn given_stats_from_yesterday_when_enhancement_succeeds_then_today_restarts() {
    // GIVEN: Stats {5, 2, 2024-01-01} and "today" pinned to 2024-01-02
    let server = MockServer::start().await;
    mount_openrouter_success(&server, "Enhanced story prompt").await;
    let state = PersistedState {
        stats: UsageStats {
            total: 5,
            today: 2,
            last_date: String::from("2024-01-01"),
        },
        ..api_key_state()
    };
    let enhancer = enhancer(&server, DeploymentMode::Extension, state);

    // WHEN: One successful enhancement
    let response = enhancer.enhance("Write a story", None, None).await;

    // THEN: Text returned and stats rolled
    assert_eq!(response, EnhanceResponse::succeeded("Enhanced story prompt"));
    let stats = enhancer.stats().await.expect("stats");
    assert_eq!(stats.total, 6);
    assert_eq!(stats.today, 1);
    assert_eq!(stats.last_date, TEST_DATE);
}

#[tokio::test]
async fn given_unknown_provider_name_when_enhancing_then_openrouter_is_used() {
    let server = MockServer::start().await;
    mount_openrouter_success(&server, "via openrouter").await;
    let enhancer = enhancer(&server, DeploymentMode::Extension, api_key_state());

    let response = enhancer.enhance("hello", Some("mistral"), None).await;

    assert_eq!(response.enhanced_prompt.as_deref(), Some("via openrouter"));
}

#[tokio::test]
async fn given_stored_settings_when_enhancing_then_system_text_reflects_them() {
    let server = MockServer::start().await;
    mount_openrouter_success(&server, "ok").await;
    let state = PersistedState {
        settings: EnhancementSettings {
            role: String::from("Senior Editor"),
            tone: Tone::Casual,
            ..EnhancementSettings::default()
        },
        ..api_key_state()
    };
    let enhancer = enhancer(&server, DeploymentMode::Extension, state);

    enhancer.enhance("fix my essay", None, None).await;

    let received = server.received_requests().await.expect("recording enabled");
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).expect("json body");
    let content = body["messages"][0]["content"].as_str().unwrap_or_default();
    assert!(content.contains("- Role: Senior Editor"));
    assert!(content.contains("- Response Tone: casual"));
    assert!(content.contains("fix my essay"));
}

// ============================================
// BACKEND DEPLOYMENT
// ============================================

/// **VALUE**: In the backend deployment a slow provider still yields a usable answer.
///
/// **WHY THIS MATTERS**: The backend serves users who paid with a code; a vendor outage must
/// not turn into a failed request.
///
/// **BUG THIS CATCHES**: Would catch the timeout surfacing as an error in backend mode, or the
/// ledger not being charged for a fallback answer.
#[tokio::test]
async fn given_backend_mode_and_slow_provider_when_enhancing_then_local_fallback_and_charge() {
    // GIVEN: A provider slower than the 1s timeout and a code with 3 credits
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(openai_success("too late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    let enhancer = enhancer(&server, DeploymentMode::Backend, code_state(Some(3)))
        .with_server_keys(ServerKeys::default().with_key(ProviderId::OpenRouter, "sk-server"));

    // WHEN: Enhancing
    let response = enhancer
        .enhance("How do I write a Python function?", None, None)
        .await;

    // THEN: Fallback text, one credit charged, usage recorded
    assert!(response.success);
    let text = response.enhanced_prompt.expect("text");
    assert!(text.contains("**ROLE**"));
    assert!(text.contains("**OBJECTIVE**"));
    assert!(text.contains("**TASK**"));

    let after = snapshot(&enhancer);
    assert_eq!(after.credits_remaining, Some(2));
    assert_eq!(after.stats.total, 1);
}

#[tokio::test]
async fn given_backend_mode_without_server_key_when_enhancing_then_fallback_without_network() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let enhancer = enhancer(&server, DeploymentMode::Backend, code_state(Some(1)));

    let response = enhancer.enhance("Design a logo", None, None).await;

    assert!(response.success);
    assert_eq!(snapshot(&enhancer).credits_remaining, Some(0));
}

#[tokio::test]
async fn given_backend_mode_with_server_key_when_enhancing_then_uses_server_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(wiremock::matchers::header("authorization", "Bearer sk-server"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_success("served")))
        .expect(1)
        .mount(&server)
        .await;
    let enhancer = enhancer(&server, DeploymentMode::Backend, code_state(Some(10)))
        .with_server_keys(ServerKeys::default().with_key(ProviderId::OpenRouter, "sk-server"));

    let response = enhancer.enhance("hello", None, None).await;

    assert_eq!(response.enhanced_prompt.as_deref(), Some("served"));
    assert_eq!(snapshot(&enhancer).credits_remaining, Some(9));
}

// ============================================
// EXTENSION DEPLOYMENT WITH REDEMPTION CODE
// ============================================

#[tokio::test]
async fn given_extension_mode_with_code_when_enhancing_then_relays_and_caches_balance() {
    // GIVEN: The backend reports 5 credits, then charges one
    let server = MockServer::start().await;
    mount_check_credits(&server, 5).await;
    Mock::given(method("POST"))
        .and(path("/api/enhance"))
        .and(body_json(json!({ "code": TEST_CODE, "prompt": "  Plan a trip " })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "enhanced_prompt": "Plan a 5-day trip to Kyoto",
            "credits_remaining": 4
        })))
        .expect(1)
        .mount(&server)
        .await;
    let enhancer = enhancer(&server, DeploymentMode::Extension, code_state(None));

    // WHEN: Enhancing
    let response = enhancer.enhance("  Plan a trip ", None, None).await;

    // THEN: Prompt relayed verbatim, backend text returned, balance cached from the relay answer
    assert_eq!(response, EnhanceResponse::succeeded("Plan a 5-day trip to Kyoto"));
    let after = snapshot(&enhancer);
    assert_eq!(after.credits_remaining, Some(4));
    assert_eq!(after.stats.total, 1);
}

#[tokio::test]
async fn given_extension_mode_and_backend_reports_zero_when_enhancing_then_no_credits() {
    let server = MockServer::start().await;
    mount_check_credits(&server, 0).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let enhancer = enhancer(&server, DeploymentMode::Extension, code_state(Some(5)));

    let response = enhancer.enhance("hello", None, None).await;

    assert_eq!(response.code, Some("NO_CREDITS"));
    let after = snapshot(&enhancer);
    assert_eq!(after.credits_remaining, Some(5));
    assert_eq!(after.stats, UsageStats::default());
}

#[tokio::test]
async fn given_extension_mode_and_unknown_code_when_enhancing_then_invalid_redemption_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/check_credits"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "not found" })))
        .mount(&server)
        .await;
    let enhancer = enhancer(&server, DeploymentMode::Extension, code_state(None));

    let response = enhancer.enhance("hello", None, None).await;

    assert_eq!(response.code, Some("INVALID_CREDENTIAL"));
    assert_eq!(
        response.error.as_deref(),
        Some("Invalid redemption code. Please check the code and try again.")
    );
}

async fn mount_slow_relay(server: &MockServer, delay: Duration) {
    Mock::given(method("POST"))
        .and(path("/api/enhance"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "success": true,
                    "enhanced_prompt": "A detailed blog post brief",
                    "credits_remaining": 2
                }))
                .set_delay(delay),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// **VALUE**: A relay that outlives the backend timeout is reported as `TIMEOUT`.
///
/// **BUG THIS CATCHES**: Would catch the timeout being flattened to `NETWORK_FAILURE`, which
/// tells the user to check a connection that works.
#[tokio::test]
async fn given_slow_relay_when_enhancing_with_code_then_timeout_and_usage_unchanged() {
    // GIVEN: Credits available, but the relay answers after the 1 s backend timeout
    let server = MockServer::start().await;
    mount_check_credits(&server, 3).await;
    mount_slow_relay(&server, Duration::from_millis(1500)).await;
    let mut config = config(&server, DeploymentMode::Extension);
    config.backend.timeout_secs = 1;
    let enhancer = Enhancer::new(config, MemoryStateStore::with_state(code_state(None)))
        .expect("enhancer");

    // WHEN: Enhancing
    let response = enhancer.enhance("write a blog post", None, None).await;

    // THEN: Timeout surfaced; only the fresh balance from the credit check is cached
    assert_eq!(response.code, Some("TIMEOUT"));
    assert_eq!(
        response.error.as_deref(),
        Some("backend did not respond in time. Please try again.")
    );
    let after = snapshot(&enhancer);
    assert_eq!(after.credits_remaining, Some(3));
    assert_eq!(after.stats, UsageStats::default());
}

/// **VALUE**: The relay is allowed to take longer than a direct vendor call.
///
/// **WHY THIS MATTERS**: The backend races its own vendor call before answering and charges
/// the credit either way. Giving up at the vendor timeout loses an answer that was paid for.
///
/// **BUG THIS CATCHES**: Would catch the backend client reusing `network.timeout_secs`.
#[tokio::test]
async fn given_relay_slower_than_vendor_timeout_when_enhancing_with_code_then_succeeds() {
    // GIVEN: Vendor timeout 1 s, default backend timeout, relay answering after 1.5 s
    let server = MockServer::start().await;
    mount_check_credits(&server, 3).await;
    mount_slow_relay(&server, Duration::from_millis(1500)).await;
    let enhancer = enhancer(&server, DeploymentMode::Extension, code_state(None));

    // WHEN: Enhancing
    let response = enhancer.enhance("write a blog post", None, None).await;

    // THEN: The relayed text arrives and the charged balance is cached
    assert_eq!(response, EnhanceResponse::succeeded("A detailed blog post brief"));
    let after = snapshot(&enhancer);
    assert_eq!(after.credits_remaining, Some(2));
    assert_eq!(after.stats.total, 1);
}

// ============================================
// ACCESSORS
// ============================================

#[tokio::test]
async fn given_reachable_backend_when_refreshing_credits_then_caches_answer() {
    let server = MockServer::start().await;
    mount_check_credits(&server, 7).await;
    let enhancer = enhancer(&server, DeploymentMode::Extension, code_state(Some(2)));

    let credits = enhancer.refresh_credits().await.expect("refresh");

    assert_eq!(credits, Some(7));
    assert_eq!(snapshot(&enhancer).credits_remaining, Some(7));
}

#[tokio::test]
async fn given_unreachable_backend_when_refreshing_credits_then_reports_cache() {
    let server = MockServer::start().await;
    let mut config = config(&server, DeploymentMode::Extension);
    config.backend.base_url = String::from("http://127.0.0.1:1");
    let enhancer = Enhancer::new(config, MemoryStateStore::with_state(code_state(Some(3))))
        .expect("enhancer");

    assert_eq!(enhancer.refresh_credits().await.expect("refresh"), Some(3));
}

#[tokio::test]
async fn given_api_key_stored_when_refreshing_credits_then_none() {
    let server = MockServer::start().await;
    let enhancer = enhancer(&server, DeploymentMode::Extension, api_key_state());

    assert_eq!(enhancer.refresh_credits().await.expect("refresh"), None);
}

#[tokio::test]
async fn given_field_input_when_saving_credential_then_classified_by_shape() {
    let server = MockServer::start().await;
    mount_check_credits(&server, 4).await;
    let enhancer = enhancer(&server, DeploymentMode::Extension, PersistedState::default());

    let saved = enhancer.save_api_key_or_code(" ABC123 ").await.expect("code");
    assert!(saved.is_redemption_code());

    let saved = enhancer.save_api_key_or_code(TEST_API_KEY).await.expect("key");
    assert!(!saved.is_redemption_code());
    assert_eq!(
        enhancer.credential().await.expect("read"),
        Some(Credential::parse(TEST_API_KEY).expect("key"))
    );

    assert!(enhancer.save_api_key_or_code("   ").await.is_err());

    enhancer.clear_credential().await.expect("clear");
    assert_eq!(enhancer.credential().await.expect("read"), None);
}

#[tokio::test]
async fn given_code_rejected_by_backend_when_saving_then_invalid_credential_and_not_stored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/check_credits"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "message": "Invalid redemption code" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    let enhancer = enhancer(&server, DeploymentMode::Extension, api_key_state());

    let error = enhancer
        .save_api_key_or_code(TEST_CODE)
        .await
        .expect_err("rejected code");

    assert_eq!(error.kind().code(), "INVALID_CREDENTIAL");
    assert_eq!(
        error.user_message(),
        "Invalid redemption code. Please check the code and try again."
    );
    assert_eq!(
        enhancer.credential().await.expect("read"),
        Some(Credential::parse(TEST_API_KEY).expect("key"))
    );
}

#[tokio::test]
async fn given_code_known_to_backend_when_saving_then_stored_with_balance() {
    // GIVEN: The backend knows the code and reports 7 credits
    let server = MockServer::start().await;
    mount_check_credits(&server, 7).await;
    let enhancer = enhancer(&server, DeploymentMode::Extension, PersistedState::default());

    // WHEN: Saving the code
    let saved = enhancer.save_api_key_or_code(TEST_CODE).await.expect("saved");

    // THEN: Stored, and the reported balance cached for the credit display
    assert!(saved.is_redemption_code());
    let after = snapshot(&enhancer);
    assert_eq!(after.redemption_code.as_deref(), Some(TEST_CODE));
    assert_eq!(after.credits_remaining, Some(7));
}

/// **VALUE**: An offline backend does not stop a user from entering their code.
///
/// **BUG THIS CATCHES**: Would catch a transport failure being treated like a rejection,
/// which would make a valid code impossible to save while the backend is down.
#[tokio::test]
async fn given_unreachable_backend_when_saving_code_then_stored_without_balance() {
    let server = MockServer::start().await;
    let mut config = config(&server, DeploymentMode::Extension);
    config.backend.base_url = String::from("http://127.0.0.1:1");
    let enhancer = Enhancer::new(config, MemoryStateStore::with_state(PersistedState::default()))
        .expect("enhancer");

    let saved = enhancer.save_api_key_or_code(TEST_CODE).await.expect("saved");

    assert!(saved.is_redemption_code());
    let after = snapshot(&enhancer);
    assert_eq!(after.redemption_code.as_deref(), Some(TEST_CODE));
    assert_eq!(after.credits_remaining, None);
}

#[tokio::test]
async fn given_backend_deployment_when_saving_code_then_no_network_call() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let enhancer = enhancer(&server, DeploymentMode::Backend, PersistedState::default());

    let saved = enhancer.save_api_key_or_code(TEST_CODE).await.expect("saved");

    assert!(saved.is_redemption_code());
    assert_eq!(snapshot(&enhancer).credits_remaining, None);
}

#[tokio::test]
async fn given_rejecting_provider_when_probing_key_then_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(provider_path(ProviderId::Groq)))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    let enhancer = enhancer(&server, DeploymentMode::Extension, PersistedState::default());

    let probe = enhancer
        .probe_api_key("gsk-wrong", Some("groq"), None)
        .await
        .expect("probe");

    assert_eq!(probe, KeyProbe::Rejected);
    assert!(enhancer.probe_api_key("  ", None, None).await.is_err());
}

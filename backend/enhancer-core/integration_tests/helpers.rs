//! Shared fixtures for integration tests.
//!
//! Every provider endpoint is pointed at a wiremock server under
//! `/{provider}/chat`, and the companion backend at the server root.

use enhancer_core::Enhancer;
use enhancer_core::config::{DeploymentMode, EnhancerConfig};
use enhancer_core::executor::{EnhancementExecutor, ExecutorSettings, FallbackPolicy};
use enhancer_core::store::{MemoryStateStore, PersistedState};

use models::ProviderId;

use std::collections::HashMap;
use std::time::Duration;

use serde_json::{Value, json};
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "sk-test-key-123";
pub const TEST_CODE: &str = "ABC123";
pub const TEST_DATE: &str = "2024-01-02";

pub fn provider_path(provider: ProviderId) -> String {
    format!("/{provider}/chat")
}

pub fn endpoints(server: &MockServer) -> HashMap<ProviderId, String> {
    ProviderId::ALL
        .into_iter()
        .map(|id| (id, format!("{}{}", server.uri(), provider_path(id))))
        .collect()
}

pub fn openai_success(text: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": text } }]
    })
}

pub fn anthropic_success(text: &str) -> Value {
    json!({
        "id": "msg_1",
        "type": "message",
        "content": [{ "type": "text", "text": text }]
    })
}

pub fn executor(server: &MockServer, timeout: Duration, fallback: FallbackPolicy) -> EnhancementExecutor {
    let settings = ExecutorSettings {
        timeout,
        endpoints: endpoints(server),
        ..ExecutorSettings::default()
    };
    EnhancementExecutor::new(settings, fallback).expect("executor should build")
}

pub fn config(server: &MockServer, deployment: DeploymentMode) -> EnhancerConfig {
    let mut config = EnhancerConfig::default();
    config.deployment = deployment;
    config.backend.base_url = server.uri();
    config.network.timeout_secs = 1;
    config.providers.endpoints = endpoints(server);
    config
}

pub fn enhancer(
    server: &MockServer,
    deployment: DeploymentMode,
    state: PersistedState,
) -> Enhancer<MemoryStateStore> {
    Enhancer::new(config(server, deployment), MemoryStateStore::with_state(state))
        .expect("enhancer should build")
        .with_today(|| TEST_DATE.to_string())
}

pub fn api_key_state() -> PersistedState {
    PersistedState {
        api_key: Some(TEST_API_KEY.to_string()),
        ..PersistedState::default()
    }
}

pub fn code_state(credits: Option<u32>) -> PersistedState {
    PersistedState {
        redemption_code: Some(TEST_CODE.to_string()),
        credits_remaining: credits,
        ..PersistedState::default()
    }
}

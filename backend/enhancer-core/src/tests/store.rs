use crate::error::StoreError;
use crate::store::{FileStateStore, MemoryStateStore, PersistedState, StateStore};

use common::RedactedSecret;
use models::{Credential, EnhancementSettings, Format, Tone, UsageStats};

use serde_json::json;
use tempfile::TempDir;

#[tokio::test]
async fn given_empty_directory_when_reading_then_returns_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let store = FileStateStore::new(dir.path());

    assert_eq!(store.credential().await.expect("read"), None);
    assert_eq!(store.settings().await.expect("read"), EnhancementSettings::default());
    assert_eq!(store.usage_stats().await.expect("read"), UsageStats::default());
    assert_eq!(store.credit_balance().await.expect("read"), None);
}

/// **VALUE**: State written by one store instance is read back by a fresh one.
///
/// **BUG THIS CATCHES**: Would catch a write that only lands in the temp file (missing rename)
/// or a camelCase/snake_case mismatch between write and read.
#[tokio::test]
async fn given_saved_state_when_reopening_store_then_values_persist() {
    // GIVEN: A store with a code, settings, stats and a balance
    let dir = TempDir::new().expect("temp dir");
    let store = FileStateStore::new(dir.path());
    let settings = EnhancementSettings {
        role: String::from("Editor"),
        format: Format::Paragraph,
        ..EnhancementSettings::default()
    };
    let stats = UsageStats {
        total: 3,
        today: 1,
        last_date: String::from("2024-05-01"),
    };

    store
        .save_credential(Some(&Credential::RedemptionCode(RedactedSecret::new("ABC123"))))
        .await
        .expect("save code");
    store.save_settings(&settings).await.expect("save settings");
    store.save_usage_stats(&stats).await.expect("save stats");
    store.save_credit_balance(7).await.expect("save balance");

    // WHEN: Opening the same directory again
    let reopened = FileStateStore::new(dir.path());

    // THEN: Everything comes back, and the file uses the camelCase layout
    assert_eq!(
        reopened.credential().await.expect("read"),
        Some(Credential::RedemptionCode(RedactedSecret::new("ABC123")))
    );
    assert_eq!(reopened.settings().await.expect("read"), settings);
    assert_eq!(reopened.usage_stats().await.expect("read"), stats);
    assert_eq!(reopened.credit_balance().await.expect("read"), Some(7));

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).expect("file")).expect("json");
    assert_eq!(raw["redemptionCode"], "ABC123");
    assert_eq!(raw["creditsRemaining"], 7);
    assert_eq!(raw["stats"]["lastDate"], "2024-05-01");
    assert!(!dir.path().join("state.json.tmp").exists());
}

#[tokio::test]
async fn given_partial_settings_on_disk_when_reading_then_missing_keys_use_defaults() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join("state.json"),
        json!({ "settings": { "tone": "casual" } }).to_string(),
    )
    .expect("write");

    let settings = FileStateStore::new(dir.path()).settings().await.expect("read");

    assert_eq!(settings.tone, Tone::Casual);
    assert_eq!(settings.format, Format::Structured);
    assert_eq!(settings.role, "");
}

/// **VALUE**: A stale settings value cannot lock the user out of their stored state.
///
/// **BUG THIS CATCHES**: Would catch one unknown enum value failing the whole file, so every
/// command (credential, stats, enhance) errors with `STORAGE`.
#[tokio::test]
async fn given_unknown_tone_on_disk_when_reading_then_credential_still_returned() {
    // GIVEN: A state file holding a key and a tone no longer offered
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join("state.json"),
        json!({ "apiKey": "sk-abc", "settings": { "tone": "friendly", "length": "short" } })
            .to_string(),
    )
    .expect("write");
    let store = FileStateStore::new(dir.path());

    // WHEN: Reading the credential and settings
    let credential = store.credential().await.expect("credential");
    let settings = store.settings().await.expect("settings");

    // THEN: The key survives and only the bad field falls back
    assert_eq!(credential, Some(Credential::ApiKey(RedactedSecret::new("sk-abc"))));
    assert_eq!(settings.tone, Tone::Helpful);
    assert_eq!(settings.length, models::Length::Short);
}

#[tokio::test]
async fn given_corrupt_file_when_reading_then_parse_error() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("state.json"), "{ not json").expect("write");

    let result = FileStateStore::new(dir.path()).usage_stats().await;

    assert!(matches!(result, Err(StoreError::Parse { .. })));
}

#[tokio::test]
async fn given_code_then_api_key_when_saving_then_only_latest_credential_is_kept() {
    let store = MemoryStateStore::new();
    store
        .save_credential(Some(&Credential::RedemptionCode(RedactedSecret::new("ABC123"))))
        .await
        .expect("save code");
    store.save_credit_balance(4).await.expect("save balance");

    store
        .save_credential(Some(&Credential::ApiKey(RedactedSecret::new("sk-abc"))))
        .await
        .expect("save key");

    assert_eq!(
        store.credential().await.expect("read"),
        Some(Credential::ApiKey(RedactedSecret::new("sk-abc")))
    );
    assert_eq!(store.credit_balance().await.expect("read"), None);
}

#[tokio::test]
async fn given_same_code_saved_again_when_saving_then_balance_is_kept() {
    let store = MemoryStateStore::new();
    let code = Credential::RedemptionCode(RedactedSecret::new("ABC123"));
    store.save_credential(Some(&code)).await.expect("save");
    store.save_credit_balance(4).await.expect("save balance");

    store.save_credential(Some(&code)).await.expect("save again");

    assert_eq!(store.credit_balance().await.expect("read"), Some(4));
}

#[tokio::test]
async fn given_stored_credential_when_clearing_then_nothing_remains() {
    let store = MemoryStateStore::with_state(PersistedState {
        api_key: Some(String::from("sk-abc")),
        ..PersistedState::default()
    });

    store.save_credential(None).await.expect("clear");

    assert_eq!(store.credential().await.expect("read"), None);
}

#[test]
fn given_state_with_secrets_when_debug_formatted_then_secrets_redacted() {
    let state = PersistedState {
        api_key: Some(String::from("sk-very-secret")),
        redemption_code: Some(String::from("ABC123")),
        ..PersistedState::default()
    };

    let debug = format!("{state:?}");

    assert!(!debug.contains("sk-very-secret"));
    assert!(!debug.contains("ABC123"));
}

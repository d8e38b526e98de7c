use crate::cli::{Cli, Command, CredentialCommand, SettingsCommand, SettingsUpdate};
use crate::commands::{apply_update, run};

use enhancer_core::Enhancer;
use enhancer_core::config::EnhancerConfig;
use enhancer_core::store::{MemoryStateStore, PersistedState};

use models::{EnhancementSettings, Format, Length, Tone, UsageStats};

use clap::Parser;

fn enhancer(state: PersistedState) -> Enhancer<MemoryStateStore> {
    Enhancer::new(EnhancerConfig::default(), MemoryStateStore::with_state(state))
        .expect("enhancer should build")
        .with_today(|| String::from("2024-03-10"))
}

#[test]
fn given_enhance_args_when_parsing_then_words_and_flags_are_kept() {
    let cli = Cli::try_parse_from([
        "prompt-enhancer",
        "enhance",
        "write",
        "a",
        "poem",
        "--provider",
        "groq",
    ])
    .expect("valid args");

    match cli.command {
        Command::Enhance {
            prompt, provider, ..
        } => {
            assert_eq!(prompt.join(" "), "write a poem");
            assert_eq!(provider.as_deref(), Some("groq"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn given_settings_values_when_parsing_then_enums_are_validated() {
    let cli = Cli::try_parse_from([
        "prompt-enhancer",
        "settings",
        "set",
        "--format",
        "StepByStep",
        "--tone",
        "casual",
    ])
    .expect("valid args");

    let Command::Settings(SettingsCommand::Set(update)) = cli.command else {
        panic!("expected settings set");
    };
    assert_eq!(update.format, Some(Format::StepByStep));
    assert_eq!(update.tone, Some(Tone::Casual));

    assert!(
        Cli::try_parse_from(["prompt-enhancer", "settings", "set", "--tone", "angry"]).is_err()
    );
}

#[test]
fn given_partial_update_when_applying_then_other_fields_are_kept() {
    // GIVEN: Stored settings with a role and a long length
    let mut settings = EnhancementSettings {
        role: String::from("Editor"),
        length: Length::Long,
        ..EnhancementSettings::default()
    };

    // WHEN: Updating only the tone
    apply_update(
        &mut settings,
        SettingsUpdate {
            tone: Some(Tone::Technical),
            ..SettingsUpdate::default()
        },
    );

    // THEN: Only the tone changed
    assert_eq!(settings.role, "Editor");
    assert_eq!(settings.length, Length::Long);
    assert_eq!(settings.tone, Tone::Technical);
}

#[tokio::test]
async fn given_settings_set_when_running_then_persisted_and_printed() {
    let enhancer = enhancer(PersistedState::default());

    let output = run(
        &enhancer,
        Command::Settings(SettingsCommand::Set(SettingsUpdate {
            role: Some(String::from("  Data Analyst ")),
            format: Some(Format::Paragraph),
            ..SettingsUpdate::default()
        })),
    )
    .await
    .expect("settings saved");

    assert!(output.success);
    assert_eq!(output.json["role"], "Data Analyst");
    assert_eq!(output.json["format"], "paragraph");
    let stored = enhancer.settings().await.expect("read");
    assert_eq!(stored.format, Format::Paragraph);
}

/// **VALUE**: Credential commands never print the secret.
///
/// **BUG THIS CATCHES**: Would catch a view that serializes the credential itself, leaking the
/// API key into shell history or CI logs.
#[tokio::test]
async fn given_credential_commands_when_running_then_secret_never_printed() {
    let enhancer = enhancer(PersistedState::default());

    let set = run(
        &enhancer,
        Command::Credential(CredentialCommand::Set {
            value: String::from("sk-or-secret-value"),
        }),
    )
    .await
    .expect("saved");
    let shown = run(&enhancer, Command::Credential(CredentialCommand::Show))
        .await
        .expect("shown");

    for output in [&set, &shown] {
        assert_eq!(output.json["configured"], true);
        assert_eq!(output.json["kind"], "api_key");
        assert_eq!(output.json["length"], 18);
        assert!(!output.json.to_string().contains("sk-or-secret-value"));
    }

    let cleared = run(&enhancer, Command::Credential(CredentialCommand::Clear))
        .await
        .expect("cleared");
    assert_eq!(cleared.json, serde_json::json!({ "configured": false }));
}

#[tokio::test]
async fn given_blank_credential_when_setting_then_core_error() {
    let enhancer = enhancer(PersistedState::default());

    let error = run(
        &enhancer,
        Command::Credential(CredentialCommand::Set {
            value: String::from("   "),
        }),
    )
    .await
    .expect_err("blank input");

    let json = serde_json::to_value(&error).expect("serializable");
    assert_eq!(json["data"]["code"], "NO_CREDENTIAL");
}

#[tokio::test]
async fn given_blank_prompt_when_enhancing_then_failure_output_without_error() {
    let enhancer = enhancer(PersistedState::default());

    let output = run(
        &enhancer,
        Command::Enhance {
            prompt: vec![String::from("  ")],
            provider: None,
            model: None,
        },
    )
    .await
    .expect("enhance always yields a response");

    assert!(!output.success);
    assert_eq!(output.json["success"], false);
    assert_eq!(output.json["code"], "EMPTY_PROMPT");
}

#[tokio::test]
async fn given_stored_stats_when_running_stats_then_today_reflects_calendar() {
    let enhancer = enhancer(PersistedState {
        stats: UsageStats {
            total: 9,
            today: 4,
            last_date: String::from("2024-03-09"),
        },
        credits_remaining: Some(3),
        ..PersistedState::default()
    });

    let output = run(&enhancer, Command::Stats).await.expect("stats");

    assert_eq!(output.json["total"], 9);
    assert_eq!(output.json["today"], 0);
    assert_eq!(output.json["lastDate"], "2024-03-09");
    assert_eq!(output.json["credits"], 3);
}

#[tokio::test]
async fn given_provider_when_listing_models_then_default_first() {
    let enhancer = enhancer(PersistedState::default());

    let output = run(
        &enhancer,
        Command::Models {
            provider: Some(String::from("anthropic")),
        },
    )
    .await
    .expect("models");

    assert_eq!(output.json["provider"], "anthropic");
    assert_eq!(output.json["defaultModel"], "claude-3-haiku-20240307");
    assert_eq!(output.json["models"][0]["id"], "claude-3-haiku-20240307");
}

#[tokio::test]
async fn given_no_code_when_checking_credits_then_null() {
    let enhancer = enhancer(PersistedState::default());

    let output = run(&enhancer, Command::Credits).await.expect("credits");

    assert_eq!(output.json, serde_json::json!({ "credits": null }));
}

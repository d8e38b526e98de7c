use crate::config::{DeploymentMode, EnhancerConfig, ModelCatalog};
use crate::error::ConfigError;
use crate::executor::FallbackPolicy;

use models::ProviderId;

use std::time::Duration;

use tempfile::TempDir;

#[test]
fn given_missing_file_when_loading_then_returns_defaults() {
    let dir = TempDir::new().expect("temp dir");

    let config = EnhancerConfig::load(dir.path()).expect("defaults");

    assert_eq!(config, EnhancerConfig::default());
    assert_eq!(config.deployment, DeploymentMode::Extension);
    assert_eq!(config.network.timeout(), Duration::from_secs(10));
    assert_eq!(config.network.max_tokens, 1000);
    assert_eq!(config.backend.base_url, "http://localhost:3000");
    assert_eq!(config.backend.timeout(), Duration::from_secs(30));
    assert!(config.backend.timeout() > config.network.timeout());
}

#[test]
fn given_saved_config_when_loading_then_round_trips() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = EnhancerConfig::default();
    config.deployment = DeploymentMode::Backend;
    config.providers.default_provider = ProviderId::Groq;
    config
        .providers
        .endpoints
        .insert(ProviderId::OpenAi, String::from("http://127.0.0.1:9999/v1/chat"));

    config.save(dir.path()).expect("save");
    let loaded = EnhancerConfig::load(dir.path()).expect("load");

    assert_eq!(loaded, config);
}

#[test]
fn given_partial_json_when_loading_then_sections_default() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join("config.json"),
        r#"{ "deployment": "backend", "network": { "timeout_secs": 3 } }"#,
    )
    .expect("write");

    let config = EnhancerConfig::load(dir.path()).expect("load");

    assert_eq!(config.deployment, DeploymentMode::Backend);
    assert_eq!(config.network.timeout_secs, 3);
    assert_eq!(config.network.max_tokens, 1000);
    assert_eq!(config.providers.default_provider, ProviderId::OpenRouter);
}

/// **VALUE**: Invalid values are refused on load and on save.
///
/// **BUG THIS CATCHES**: Would catch a zero timeout slipping through, which makes every
/// enhancement time out instantly and, in backend mode, silently return the fallback.
#[test]
fn given_invalid_values_when_validating_then_validation_error() {
    let mut zero_timeout = EnhancerConfig::default();
    zero_timeout.network.timeout_secs = 0;

    let mut bad_url = EnhancerConfig::default();
    bad_url.backend.base_url = String::from("ftp://example.com");

    let mut bad_version = EnhancerConfig::default();
    bad_version.version = 99;

    let mut zero_backend_timeout = EnhancerConfig::default();
    zero_backend_timeout.backend.timeout_secs = 0;

    for config in [zero_timeout, bad_url, bad_version, zero_backend_timeout] {
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}

#[test]
fn given_corrupt_json_when_loading_then_parse_error() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("config.json"), "{").expect("write");

    assert!(matches!(
        EnhancerConfig::load(dir.path()),
        Err(ConfigError::ParseError { .. })
    ));
}

#[test]
fn given_deployment_modes_when_mapping_then_only_backend_falls_back() {
    assert_eq!(DeploymentMode::Extension.fallback_policy(), FallbackPolicy::Surface);
    assert_eq!(DeploymentMode::Backend.fallback_policy(), FallbackPolicy::LocalTemplate);
}

#[test]
fn given_no_models_file_when_loading_catalog_then_uses_builtin_lists() {
    let dir = TempDir::new().expect("temp dir");

    let catalog = ModelCatalog::load(dir.path()).expect("catalog");

    assert_eq!(catalog.default_model(ProviderId::OpenAi), "gpt-4o-mini");
    assert_eq!(catalog.models(ProviderId::Anthropic).len(), 3);
}

#[test]
fn given_models_toml_when_loading_catalog_then_overrides_only_listed_providers() {
    // GIVEN: A models.toml overriding OpenAI only
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join("models.toml"),
        r#"
[[providers]]
id = "openai"
default_model = "gpt-4o"
models = [
    { id = "gpt-4o", name = "GPT-4o" },
    { id = "o1-mini", name = "o1 mini" },
]
"#,
    )
    .expect("write");

    // WHEN: Loading the catalog
    let catalog = ModelCatalog::load(dir.path()).expect("catalog");

    // THEN: OpenAI uses the file, Groq keeps its built-in list
    assert_eq!(catalog.default_model(ProviderId::OpenAi), "gpt-4o");
    assert_eq!(catalog.models(ProviderId::OpenAi).len(), 2);
    assert_eq!(catalog.default_model(ProviderId::Groq), "llama-3.1-8b-instant");
}

#[test]
fn given_default_model_not_in_list_when_parsing_catalog_then_error() {
    let toml = r#"
[[providers]]
id = "groq"
default_model = "missing"
models = [{ id = "llama-3.1-8b-instant", name = "Llama" }]
"#;

    assert!(ModelCatalog::from_toml_str(toml).is_err());
}

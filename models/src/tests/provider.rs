use crate::{ModelError, ProviderId};

#[test]
fn given_known_ids_when_parsed_then_round_trip_through_as_str() {
    for id in ProviderId::ALL {
        let parsed: ProviderId = id.as_str().parse().unwrap();
        assert_eq!(parsed, id);
    }
}

#[test]
fn given_mixed_case_id_when_parsed_then_normalizes() {
    let parsed: ProviderId = "  Anthropic ".parse().unwrap();
    assert_eq!(parsed, ProviderId::Anthropic);
}

/// **VALUE**: Verifies the strict parser rejects ids outside the closed set.
///
/// **BUG THIS CATCHES**: Would catch a FromStr that silently maps typos to a default,
/// hiding misconfigured provider names in config files.
#[test]
fn given_unknown_id_when_parsed_strictly_then_returns_validation_error() {
    let result: Result<ProviderId, _> = "mistral".parse();

    match result {
        Err(ModelError::Validation { message, .. }) => {
            assert_eq!(message, "Unknown provider: mistral");
        }
        Ok(id) => panic!("Expected validation error, got {id}"),
    }
}

#[test]
fn given_provider_when_serialized_then_uses_lowercase_id() {
    let json = serde_json::to_string(&ProviderId::OpenAi).unwrap();
    assert_eq!(json, "\"openai\"");

    let back: ProviderId = serde_json::from_str("\"perplexity\"").unwrap();
    assert_eq!(back, ProviderId::Perplexity);
}

use crate::settings::DEFAULT_ROLE_FALLBACK;
use crate::{Description, EnhancementSettings, Format, Length, ModelError, Tone};

/// **VALUE**: Verifies defaults match the documented DEFAULT_SETTINGS.
///
/// **WHY THIS MATTERS**: Every read of a partially stored settings object is merged with
/// these values. A changed default silently changes every user's enhancements.
#[test]
fn given_default_settings_then_match_documented_values() {
    let settings = EnhancementSettings::default();

    assert_eq!(settings.role, "");
    assert_eq!(settings.description, Description::Detailed);
    assert_eq!(settings.length, Length::Medium);
    assert_eq!(settings.format, Format::Structured);
    assert_eq!(settings.tone, Tone::Helpful);
}

/// **VALUE**: Verifies a partially stored object is merged with defaults on read.
///
/// **BUG THIS CATCHES**: Would catch removal of the container-level `serde(default)`,
/// which would turn an older stored object (missing `tone`) into a hard parse failure.
#[test]
fn given_partial_json_when_deserialized_then_missing_keys_take_defaults() {
    // GIVEN: Only two of five keys stored
    let json = r#"{"role":"Senior editor","length":"long"}"#;

    // WHEN: Deserializing
    let settings: EnhancementSettings = serde_json::from_str(json).unwrap();

    // THEN: Stored keys kept, the rest defaulted
    assert_eq!(settings.role, "Senior editor");
    assert_eq!(settings.length, Length::Long);
    assert_eq!(settings.description, Description::Detailed);
    assert_eq!(settings.format, Format::Structured);
    assert_eq!(settings.tone, Tone::Helpful);
}

/// **VALUE**: Verifies an out-of-range stored value reads as its default.
///
/// **BUG THIS CATCHES**: Would catch one stale value (e.g. a tone an older settings form
/// offered) failing the whole settings object and, with it, the state it is stored in.
#[test]
fn given_unknown_or_mistyped_values_when_deserialized_then_those_fields_default() {
    // GIVEN: An unknown tone, a numeric format, a null role and one valid key
    let json = r#"{"role":null,"tone":"friendly","format":3,"length":"Long"}"#;

    // WHEN: Deserializing
    let settings: EnhancementSettings = serde_json::from_str(json).unwrap();

    // THEN: Bad fields defaulted, the valid one kept
    assert_eq!(settings.tone, Tone::Helpful);
    assert_eq!(settings.format, Format::Structured);
    assert_eq!(settings.role, "");
    assert_eq!(settings.length, Length::Long);
}

#[test]
fn given_settings_when_serialized_then_enum_values_are_lowercase() {
    let settings = EnhancementSettings {
        role: String::from("Coach"),
        description: Description::Summary,
        length: Length::Short,
        format: Format::StepByStep,
        tone: Tone::Technical,
    };

    let json = serde_json::to_value(&settings).unwrap();

    assert_eq!(json["description"], "summary");
    assert_eq!(json["length"], "short");
    assert_eq!(json["format"], "stepbystep");
    assert_eq!(json["tone"], "technical");
}

#[test]
fn given_empty_or_blank_role_when_resolved_then_uses_fallback() {
    let mut settings = EnhancementSettings::default();
    assert_eq!(settings.role_or_default(), DEFAULT_ROLE_FALLBACK);

    settings.role = String::from("   ");
    assert_eq!(settings.role_or_default(), "AI Assistant");

    settings.role = String::from("Tax advisor");
    assert_eq!(settings.role_or_default(), "Tax advisor");
}

#[test]
fn given_enum_text_when_parsed_then_accepts_known_values_only() {
    assert_eq!("stepbystep".parse::<Format>().unwrap(), Format::StepByStep);
    assert_eq!("CASUAL".parse::<Tone>().unwrap(), Tone::Casual);

    match "verbose".parse::<Length>() {
        Err(ModelError::Validation { message, .. }) => {
            assert_eq!(message, "Invalid length: verbose");
        }
        Ok(length) => panic!("Expected validation error, got {length}"),
    }
}

use crate::{EnhancementRequest, EnhancementSettings, ProviderId};

#[test]
fn given_blank_model_when_resolving_effective_model_then_none() {
    let request = EnhancementRequest::new(
        "Write a haiku",
        EnhancementSettings::default(),
        ProviderId::Groq,
        Some(String::from("  ")),
    );

    assert_eq!(request.effective_model(), None);
}

#[test]
fn given_explicit_model_when_resolving_effective_model_then_trimmed_value() {
    let request = EnhancementRequest::new(
        "Write a haiku",
        EnhancementSettings::default(),
        ProviderId::OpenAi,
        Some(String::from(" gpt-4o ")),
    );

    assert_eq!(request.effective_model(), Some("gpt-4o"));
}

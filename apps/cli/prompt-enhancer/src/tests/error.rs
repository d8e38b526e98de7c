// Unit tests for error module
// Errors are printed as JSON on stderr, so serialization must keep working

use crate::error::AppError;

use enhancer_core::error::EnhanceError;

/// **VALUE**: Tests that errors serialize with their variant tag and message.
///
/// **WHY THIS MATTERS**: Scripts calling the CLI parse the stderr JSON. If serialization
/// breaks, they only see an opaque failure exit code.
///
/// **BUG THIS CATCHES**: Would catch if someone removes the `#[derive(Serialize)]`
/// or adds a field that cannot be serialized.
#[test]
fn given_app_error_when_serialized_then_contains_tag_and_message() {
    // GIVEN: An AppError
    let err = AppError::app("Test");

    // WHEN: Serializing to JSON
    let json = serde_json::to_value(&err).expect("Error should be serializable");

    // THEN: Tagged variant with the message and location
    assert_eq!(json["type"], "App");
    assert_eq!(json["data"]["message"], "Test");
    assert!(json["data"]["location"]["line"].is_u64());
}

#[test]
fn given_enhance_error_when_converted_then_keeps_user_message_and_code() {
    // GIVEN: A NoCredits enhancement error
    let err = AppError::from(EnhanceError::no_credits());

    // WHEN: Serializing
    let json = serde_json::to_value(&err).expect("serializable");

    // THEN: The user-facing message and the stable code survive
    assert_eq!(json["type"], "Core");
    assert_eq!(json["data"]["message"], "No credits remaining");
    assert_eq!(json["data"]["code"], "NO_CREDITS");
}

#[test]
fn given_app_error_when_displayed_then_includes_location() {
    let err = AppError::app("boom");

    let text = err.to_string();

    assert!(text.starts_with("App Error: boom ["));
    assert!(text.contains("error.rs"));
}

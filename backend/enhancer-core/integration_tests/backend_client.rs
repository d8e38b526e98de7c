use crate::helpers::TEST_CODE;

use enhancer_core::backend_client::{BackendClient, RelayedEnhancement};
use enhancer_core::error::BackendError;

use common::{HttpStatusCode, RedactedSecret};

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn code() -> RedactedSecret {
    RedactedSecret::new(TEST_CODE)
}

fn client(server: &MockServer) -> BackendClient {
    BackendClient::with_timeout(&server.uri(), Duration::from_secs(5)).expect("client should build")
}

#[tokio::test]
async fn given_known_code_when_checking_credits_then_returns_balance() {
    // GIVEN: A backend that knows the code
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/check_credits"))
        .and(query_param("redemption_code", TEST_CODE))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "remaining_credits": 5 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    // WHEN: Checking credits
    let credits = client(&server).check_credits(&code()).await.expect("credits");

    // THEN: The backend's number
    assert_eq!(credits, 5);
}

#[tokio::test]
async fn given_base_url_with_path_when_checking_credits_then_path_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/relay/api/check_credits"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "remaining_credits": 2 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = BackendClient::new(&format!("{}/relay", server.uri())).expect("client");

    assert_eq!(client.check_credits(&code()).await.expect("credits"), 2);
}

#[tokio::test]
async fn given_negative_balance_when_checking_credits_then_clamped_to_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "remaining_credits": -3 })),
        )
        .mount(&server)
        .await;

    assert_eq!(client(&server).check_credits(&code()).await.expect("credits"), 0);
}

#[tokio::test]
async fn given_unknown_code_when_checking_credits_then_rejected() {
    // GIVEN: One backend that answers success:false, one that answers 404
    let soft = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "message": "Invalid redemption code" })),
        )
        .mount(&soft)
        .await;

    let hard = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "Code not found" })),
        )
        .mount(&hard)
        .await;

    // WHEN / THEN: Both are a rejection, not a network problem
    for server in [&soft, &hard] {
        let error = client(server).check_credits(&code()).await.expect_err("rejected");
        assert!(matches!(error, BackendError::Rejected { .. }), "{error}");
        assert!(!error.is_unreachable());
    }
}

#[tokio::test]
async fn given_backend_down_when_checking_credits_then_unreachable() {
    let client = BackendClient::with_timeout("http://127.0.0.1:1", Duration::from_secs(2))
        .expect("client");

    let error = client.check_credits(&code()).await.expect_err("refused");

    assert!(matches!(error, BackendError::Network { .. }));
    assert!(error.is_unreachable());
}

#[tokio::test]
async fn given_slow_backend_when_checking_credits_then_timeout_carries_client_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/check_credits"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "remaining_credits": 3 }))
                .set_delay(Duration::from_millis(1500)),
        )
        .mount(&server)
        .await;
    let client =
        BackendClient::with_timeout(&server.uri(), Duration::from_secs(1)).expect("client");

    let error = client.check_credits(&code()).await.expect_err("too slow");

    assert!(matches!(error, BackendError::Timeout { timeout_ms: 1000, .. }));
    assert!(error.is_unreachable());
}

#[tokio::test]
async fn given_valid_code_when_relaying_enhancement_then_returns_text_and_balance() {
    // GIVEN: A backend expecting the code and the raw prompt
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/enhance"))
        .and(body_json(json!({ "code": TEST_CODE, "prompt": "write a poem" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "enhanced_prompt": " A better poem prompt ",
            "credits_remaining": 4
        })))
        .expect(1)
        .mount(&server)
        .await;

    // WHEN: Relaying
    let relayed = client(&server)
        .enhance(&code(), "write a poem")
        .await
        .expect("relayed");

    // THEN: Trimmed text and the charged balance
    assert_eq!(
        relayed,
        RelayedEnhancement {
            enhanced_prompt: String::from("A better poem prompt"),
            credits_remaining: Some(4),
        }
    );
}

/// **VALUE**: Backend status codes keep their meaning.
///
/// **BUG THIS CATCHES**: Would catch 403 being reported as a generic server failure, which
/// would tell the user to retry instead of buying credits.
#[tokio::test]
async fn given_backend_error_statuses_when_relaying_then_classified() {
    let cases: [(u16, fn(&BackendError) -> bool); 3] = [
        (404, |e| matches!(e, BackendError::Rejected { .. })),
        (403, |e| matches!(e, BackendError::NoCredits { .. })),
        (
            500,
            |e| matches!(e, BackendError::Server { status, .. } if *status == HttpStatusCode(500)),
        ),
    ];

    for (status, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({ "error": "nope" })),
            )
            .mount(&server)
            .await;

        let error = client(&server)
            .enhance(&code(), "hello")
            .await
            .expect_err("should fail");

        assert!(expected(&error), "status {status}: {error}");
    }
}

#[tokio::test]
async fn given_success_without_text_when_relaying_then_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "enhanced_prompt": "  " })),
        )
        .mount(&server)
        .await;

    let error = client(&server)
        .enhance(&code(), "hello")
        .await
        .expect_err("blank text");

    assert!(matches!(error, BackendError::Json { .. }));
}

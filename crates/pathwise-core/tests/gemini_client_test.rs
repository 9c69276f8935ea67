//! HTTP-level tests for `GeminiClient` against a local mock server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pathwise_core::generation::{GeminiClient, GenerationClient, GenerationConfig, GenerationError};

const ENDPOINT: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new(GenerationConfig::new("test-key").with_base_url(server.uri())).unwrap()
}

fn text_envelope(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn sends_prompt_with_key_and_fixed_sampling() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "plan my week"}]}],
            "generationConfig": {
                "temperature": 1.0,
                "topP": 0.95,
                "topK": 64,
                "maxOutputTokens": 8192,
                "responseMimeType": "text/plain"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_envelope("{\"ok\": true}")))
        .expect(1)
        .mount(&server)
        .await;

    let text = client_for(&server).generate("plan my week").await.unwrap();
    assert_eq!(text, "{\"ok\": true}");
}

#[tokio::test]
async fn uses_configured_model_in_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_envelope("hi")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(
        GenerationConfig::new("test-key")
            .with_base_url(server.uri())
            .with_model("gemini-2.0-flash"),
    )
    .unwrap();
    assert_eq!(client.generate("p").await.unwrap(), "hi");
}

#[tokio::test]
async fn non_success_status_is_a_service_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(503).set_body_string("model overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).generate("p").await.unwrap_err();
    match err {
        GenerationError::Service { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "model overloaded");
        }
        other => panic!("expected service error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_candidates_is_an_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"promptFeedback": {"blockReason": "SAFETY"}})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).generate("p").await.unwrap_err();
    assert!(matches!(err, GenerationError::EmptyResponse));
}

#[tokio::test]
async fn whitespace_only_text_is_an_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_envelope("  \n ")))
        .mount(&server)
        .await;

    let err = client_for(&server).generate("p").await.unwrap_err();
    assert!(matches!(err, GenerationError::EmptyResponse));
}

#[tokio::test]
async fn non_json_envelope_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).generate("p").await.unwrap_err();
    assert!(matches!(err, GenerationError::MalformedEnvelope(_)));
}

#[tokio::test]
async fn slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_envelope("late"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = GeminiClient::new(
        GenerationConfig::new("test-key")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(200)),
    )
    .unwrap();

    let err = client.generate("p").await.unwrap_err();
    assert!(matches!(err, GenerationError::Timeout(d) if d == Duration::from_millis(200)));
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    // Bind and immediately drop a listener to get a port nothing serves.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = GeminiClient::new(
        GenerationConfig::new("test-key").with_base_url(format!("http://127.0.0.1:{port}")),
    )
    .unwrap();

    let err = client.generate("p").await.unwrap_err();
    assert!(matches!(err, GenerationError::Transport(_)));
}

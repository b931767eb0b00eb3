use rag_core::config::LlmSettings;
use rag_core::llm::{ChatClient, ChatModel, ChatRequest, LlmError, ResponseFormat};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> LlmSettings {
    LlmSettings {
        api_key: "sk-test".to_string(),
        api_base: Some(format!("{}/v1", server.uri())),
        model: "gpt-test".to_string(),
        ..LlmSettings::default()
    }
}

#[tokio::test]
async fn sends_json_mode_request_and_reads_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-test",
            "response_format": { "type": "json_object" },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "{\"points\": []}" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatClient::from_settings(&settings(&server)).expect("client builds");
    let request = ChatRequest::new("system", "user").with_response_format(ResponseFormat::JsonObject);

    let content = client.complete(request).await.expect("completion succeeds");

    assert_eq!(content, "{\"points\": []}");
}

#[tokio::test]
async fn api_errors_carry_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    let client = ChatClient::from_settings(&settings(&server)).expect("client builds");

    let err = client
        .complete(ChatRequest::new("system", "user"))
        .await
        .expect_err("401 is an error");

    match err {
        LlmError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn empty_choices_are_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = ChatClient::from_settings(&settings(&server)).expect("client builds");

    let err = client
        .complete(ChatRequest::new("system", "user"))
        .await
        .expect_err("no choices");

    assert!(matches!(err, LlmError::EmptyResponse));
}

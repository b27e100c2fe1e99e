use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde_json::{json, Value};

use recap::config::Settings;
use recap::llm::{GeminiClient, GenerationError, LlmProvider, SummaryGenerator};

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    body: String,
    delay: Duration,
    seen: Arc<Mutex<Vec<(Uri, Value)>>>,
}

async fn stub_handler(
    State(stub): State<Stub>,
    uri: Uri,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    stub.seen.lock().unwrap().push((uri, body));
    tokio::time::sleep(stub.delay).await;
    (
        stub.status,
        [(header::CONTENT_TYPE, "application/json")],
        stub.body.clone(),
    )
}

async fn spawn_stub(status: StatusCode, body: String, delay: Duration) -> (Settings, Stub) {
    let stub = Stub {
        status,
        body,
        delay,
        seen: Arc::new(Mutex::new(Vec::new())),
    };

    let app = Router::new()
        .fallback(stub_handler)
        .with_state(stub.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let mut settings = Settings::default();
    settings.llm.api_key = "test-key".to_string();
    settings.llm.endpoint = format!("http://{}/v1beta", addr);
    settings.llm.timeout_secs = 1;

    (settings, stub)
}

fn candidate_reply(text: &str) -> String {
    json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ], "role": "model" } }
        ]
    })
    .to_string()
}

#[tokio::test]
async fn sends_prompt_and_returns_first_part() {
    let (settings, stub) =
        spawn_stub(StatusCode::OK, candidate_reply("hello back"), Duration::ZERO).await;
    let client = GeminiClient::from_settings(&settings).unwrap();

    let text = client.generate("hello model").await.unwrap();
    assert_eq!(text, "hello back");

    let seen = stub.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (uri, body) = &seen[0];
    assert_eq!(uri.path(), "/v1beta/models/gemini-2.5-flash:generateContent");
    assert_eq!(uri.query(), Some("key=test-key"));
    assert_eq!(
        body,
        &json!({ "contents": [ { "parts": [ { "text": "hello model" } ] } ] })
    );
}

#[tokio::test]
async fn error_statuses_are_classified() {
    let cases = [
        (StatusCode::UNAUTHORIZED, "Invalid API key"),
        (StatusCode::FORBIDDEN, "API access forbidden"),
        (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded"),
        (StatusCode::INTERNAL_SERVER_ERROR, "Gemini API error: 500"),
    ];

    for (status, expected) in cases {
        let (settings, _stub) = spawn_stub(
            status,
            r#"{"error":{"message":"nope"}}"#.to_string(),
            Duration::ZERO,
        )
        .await;
        let client = GeminiClient::from_settings(&settings).unwrap();

        let err = client.generate("prompt").await.unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "status {} gave unexpected error: {}",
            status,
            err
        );
    }
}

#[tokio::test]
async fn generic_error_keeps_response_body() {
    let (settings, _stub) = spawn_stub(
        StatusCode::BAD_REQUEST,
        "model overloaded".to_string(),
        Duration::ZERO,
    )
    .await;
    let client = GeminiClient::from_settings(&settings).unwrap();

    match client.generate("prompt").await {
        Err(GenerationError::Upstream { status, body }) => {
            assert_eq!(status, 400);
            assert_eq!(body, "model overloaded");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn missing_candidate_text_is_an_error() {
    for reply in [
        json!({ "candidates": [] }).to_string(),
        json!({ "candidates": [ { "finishReason": "SAFETY" } ] }).to_string(),
        candidate_reply("   "),
    ] {
        let (settings, _stub) = spawn_stub(StatusCode::OK, reply, Duration::ZERO).await;
        let client = GeminiClient::from_settings(&settings).unwrap();

        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse), "got {:?}", err);
    }
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let (settings, _stub) = spawn_stub(
        StatusCode::OK,
        candidate_reply("late"),
        Duration::from_secs(3),
    )
    .await;
    let client = GeminiClient::from_settings(&settings).unwrap();

    let err = client.generate("prompt").await.unwrap_err();
    assert!(matches!(err, GenerationError::Timeout(1)), "got {:?}", err);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn generator_parses_summary_from_upstream() {
    let (settings, _stub) = spawn_stub(
        StatusCode::OK,
        candidate_reply("SUMMARY: This is a test summary that is long enough.\nTOPICS: a, b"),
        Duration::ZERO,
    )
    .await;
    let generator = SummaryGenerator::from_settings(&settings).unwrap();

    let summary = generator.generate("...").await.unwrap();
    assert_eq!(summary, "This is a test summary that is long enough.");
}

#[tokio::test]
async fn generator_rejects_reply_without_summary_marker() {
    let (settings, _stub) = spawn_stub(
        StatusCode::OK,
        candidate_reply("I could not find anything worth summarizing in this text."),
        Duration::ZERO,
    )
    .await;
    let generator = SummaryGenerator::from_settings(&settings).unwrap();

    let err = generator.generate("transcript").await.unwrap_err();
    assert!(matches!(err, GenerationError::InvalidSummary));

    let outcome = generator.generate_untruncated("transcript").await;
    assert!(outcome.summary().is_none());
}

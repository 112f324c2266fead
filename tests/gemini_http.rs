//! End-to-end client tests against a local `wiremock` server.

use std::time::Duration;

use serde_json::json;
use studio_assist::config::{ApiConfig, SpeechConfig};
use studio_assist::gemini::{ApiError, GeminiClient, ProposalGenerator, SpeechSynthesizer};
use studio_assist::http::{
    FetchError, HttpRequest, ReqwestTransport, RetryPolicy, RetryingClient, TransientFailure,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEXT_MODEL: &str = "text-model";
const TTS_MODEL: &str = "tts-model";

fn fast_policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(5), Duration::from_millis(5))
}

fn client(server: &MockServer) -> GeminiClient {
    let api = ApiConfig {
        base_url: server.uri(),
        api_key: Some("secret-key".into()),
        text_model: TEXT_MODEL.into(),
        tts_model: TTS_MODEL.into(),
        timeout_secs: 5,
    };
    let http = RetryingClient::new(ReqwestTransport::new(Duration::from_secs(5)), fast_policy());
    GeminiClient::new(http, api, SpeechConfig::default())
}

fn endpoint(model: &str) -> String {
    format!("/v1beta/models/{model}:generateContent")
}

fn proposals_envelope() -> serde_json::Value {
    let proposals = json!([
        { "title": "Churn Radar", "techStack": "Rust, Kafka", "deliverables": ["a", "b", "c"] },
        { "title": "Onboarding Bot", "techStack": "Python", "deliverables": ["d", "e", "f"] },
        { "title": "Usage Insights", "techStack": "dbt, BigQuery", "deliverables": ["g", "h", "i"] }
    ]);
    json!({ "candidates": [{ "content": { "parts": [{ "text": proposals.to_string() }] } }] })
}

#[tokio::test]
async fn brainstorm_retries_503_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(endpoint(TEXT_MODEL)))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(endpoint(TEXT_MODEL)))
        .and(header("x-goog-api-key", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(proposals_envelope()))
        .expect(1)
        .mount(&server)
        .await;

    let proposals = client(&server).brainstorm("reduce churn").await.unwrap();
    assert_eq!(proposals.len(), 3);
    assert_eq!(proposals[0].title, "Churn Radar");
    assert_eq!(proposals[2].tech_stack, "dbt, BigQuery");
}

#[tokio::test]
async fn bad_request_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(endpoint(TEXT_MODEL)))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    match client(&server).brainstorm("reduce churn").await {
        Err(ApiError::ClientRequest { status, message }) => {
            assert_eq!(status, 400);
            assert!(message.contains("API key not valid"), "{message}");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn persistent_server_error_exhausts_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(endpoint(TTS_MODEL)))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let err = client(&server).synthesize("hello").await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::ExhaustedRetries(FetchError::ExhaustedRetries {
            attempts: 3,
            last: TransientFailure::Status { status: 500 },
        })
    ));
}

#[tokio::test]
async fn speech_is_decoded_into_wav() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(endpoint(TTS_MODEL)))
        .and(header("x-goog-api-key", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{
                "inlineData": { "mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AAD/fwCAZAA=" }
            }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let audio = client(&server).synthesize("We build software.").await.unwrap();

    assert_eq!(audio.sample_rate, 24_000);
    assert_eq!(audio.samples, vec![0, 32767, -32768, 100]);
    assert_eq!(audio.wav.len(), 52);
    assert_eq!(&audio.wav[0..4], b"RIFF");
    assert_eq!(&audio.wav[24..28], &24_000u32.to_le_bytes());

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["generationConfig"]["responseModalities"], json!(["AUDIO"]));
    assert_eq!(body["model"], TTS_MODEL);
}

#[tokio::test]
async fn retrying_client_returns_rate_limit_recovery() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let http = RetryingClient::new(ReqwestTransport::new(Duration::from_secs(5)), fast_policy());
    let response = http
        .execute(&HttpRequest::get(format!("{}/health", server.uri())))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.into_text(), "ok");
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

use async_trait::async_trait;
use linkdigest::AppError;
use linkdigest::ai::{Credential, CredentialSource, VertexClient, parse_summary};
use linkdigest::core::config::AppConfig;
use linkdigest::core::ports::Summarizer;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const GENERATE_PATH: &str =
    "/v1/projects/test-project/locations/us-central1/publishers/google/models/gemini-2.0-flash:generateContent";

fn config(api_base: &str, extra: &[(&'static str, &str)]) -> AppConfig {
    let mut env: HashMap<&str, String> = HashMap::from([
        ("SLACK_BOT_TOKEN", "xoxb-test".to_string()),
        ("SLACK_SIGNING_SECRET", "secret".to_string()),
        ("SLACK_REACTION_KEY", "summary".to_string()),
        ("SLACK_PROCESSING_REACTION_KEY", "hourglass_flowing_sand".to_string()),
        ("GOOGLE_CLOUD_PROJECT", "test-project".to_string()),
        ("GOOGLE_ACCESS_TOKEN", "ya29.test".to_string()),
        ("VERTEX_API_BASE", api_base.to_string()),
    ]);
    for (k, v) in extra {
        env.insert(*k, (*v).to_string());
    }
    AppConfig::from_lookup(|key| env.get(key).cloned()).unwrap()
}

fn candidate(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

fn summary_json() -> String {
    json!({
        "summary": "Rust ships a new edition.",
        "keywords": ["Rust", "edition", "compiler", "language", "release"],
        "tweet": "Rust ships a new edition #Rust"
    })
    .to_string()
}

#[tokio::test]
async fn summarize_returns_parsed_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("authorization", "Bearer ya29.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(&summary_json())))
        .expect(1)
        .mount(&server)
        .await;

    let client = VertexClient::new(&config(&server.uri(), &[])).unwrap();
    let result = client.summarize("Article body").await.unwrap();

    assert_eq!(result.summary, "Rust ships a new edition.");
    assert_eq!(result.keywords.len(), 5);
    assert_eq!(result.tweet_text, "Rust ships a new edition #Rust");
}

#[tokio::test]
async fn request_carries_generation_config_and_search_tool() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(&summary_json())))
        .mount(&server)
        .await;

    let client = VertexClient::new(&config(&server.uri(), &[])).unwrap();
    client.summarize("Article body").await.unwrap();

    let requests: Vec<Request> = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
    assert_eq!(body["tools"][0]["googleSearch"], json!({}));
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("Article body"), "{prompt}");
    assert!(prompt.contains("Japanese"), "{prompt}");
}

#[tokio::test]
async fn search_grounding_can_be_disabled() {
    let client = VertexClient::new(&config("http://unused", &[("SEARCH_GROUNDING", "false")])).unwrap();
    let body = client.build_request_body("text");
    assert!(body.get("tools").is_none());
}

#[tokio::test]
async fn body_is_truncated_when_a_limit_is_configured() {
    let client = VertexClient::new(&config("http://unused", &[("MAX_BODY_CHARS", "4")])).unwrap();
    let body = client.build_request_body("abcdefgh");
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("abcd"), "{prompt}");
    assert!(!prompt.contains("abcde"), "{prompt}");
}

#[tokio::test]
async fn missing_keywords_is_an_invalid_summary() {
    let server = MockServer::start().await;
    let incomplete = json!({ "summary": "s", "tweet": "t" }).to_string();
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(&incomplete)))
        .mount(&server)
        .await;

    let client = VertexClient::new(&config(&server.uri(), &[])).unwrap();
    let err = client.summarize("Article body").await.unwrap_err();

    assert!(matches!(err, AppError::InvalidSummary(_)), "{err}");
}

#[tokio::test]
async fn server_error_is_an_ai_error_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .expect(1)
        .mount(&server)
        .await;

    let client = VertexClient::new(&config(&server.uri(), &[])).unwrap();
    let err = client.summarize("Article body").await.unwrap_err();

    assert!(matches!(err, AppError::AiError(_)), "{err}");
    assert!(err.to_string().contains("500"), "{err}");
}

#[tokio::test]
async fn empty_candidate_list_is_an_invalid_summary() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let client = VertexClient::new(&config(&server.uri(), &[])).unwrap();
    let err = client.summarize("Article body").await.unwrap_err();

    assert!(matches!(err, AppError::InvalidSummary(_)), "{err}");
}

/// Hands out a fresh token on every call, like a refreshing provider.
#[derive(Default)]
struct RotatingTokens {
    issued: AtomicUsize,
}

#[async_trait]
impl CredentialSource for RotatingTokens {
    async fn credential(&self) -> Result<Credential, AppError> {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Credential::Bearer(format!("token-{n}")))
    }
}

struct NoCredentials;

#[async_trait]
impl CredentialSource for NoCredentials {
    async fn credential(&self) -> Result<Credential, AppError> {
        Err(AppError::AiError("no credentials".to_string()))
    }
}

#[tokio::test]
async fn every_request_asks_the_credential_source() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(&summary_json())))
        .expect(2)
        .mount(&server)
        .await;

    let tokens = Arc::new(RotatingTokens::default());
    let client = VertexClient::with_credentials(&config(&server.uri(), &[]), tokens.clone()).unwrap();
    client.summarize("first").await.unwrap();
    client.summarize("second").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let auth: Vec<&str> = requests
        .iter()
        .map(|r| r.headers.get("authorization").unwrap().to_str().unwrap())
        .collect();
    assert_eq!(auth, vec!["Bearer token-1", "Bearer token-2"]);
    assert_eq!(tokens.issued.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn credential_failure_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(&summary_json())))
        .expect(0)
        .mount(&server)
        .await;

    let client = VertexClient::with_credentials(&config(&server.uri(), &[]), Arc::new(NoCredentials)).unwrap();
    let err = client.summarize("body").await.unwrap_err();
    assert!(matches!(err, AppError::AiError(_)), "{err}");
}

#[tokio::test]
async fn api_key_uses_express_endpoint_without_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/publishers/google/models/gemini-2.0-flash:generateContent"))
        .and(query_param("key", "AIza-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(&summary_json())))
        .expect(1)
        .mount(&server)
        .await;

    let client = VertexClient::new(&config(&server.uri(), &[("GEMINI_API_KEY", "AIza-test")])).unwrap();
    client.summarize("Article body").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[test]
fn single_line_fence_is_accepted() {
    let raw = format!("```json{}```", summary_json());
    let result = parse_summary(&raw, 500).unwrap();
    assert_eq!(result.summary, "Rust ships a new edition.");
}

#[test]
fn fenced_json_is_accepted() {
    let raw = format!("```json\n{}\n```", summary_json());
    let result = parse_summary(&raw, 500).unwrap();
    assert_eq!(result.keywords[0], "Rust");
}

#[test]
fn prose_instead_of_json_is_rejected() {
    let err = parse_summary("Here is your summary: Rust is great.", 500).unwrap_err();
    assert!(matches!(err, AppError::InvalidSummary(_)));
}

#[test]
fn empty_fields_are_rejected() {
    let empty_summary = json!({ "summary": " ", "keywords": ["a"], "tweet": "t" }).to_string();
    let empty_keywords = json!({ "summary": "s", "keywords": [], "tweet": "t" }).to_string();
    let empty_tweet = json!({ "summary": "s", "keywords": ["a"], "tweet": "" }).to_string();

    for raw in [empty_summary, empty_keywords, empty_tweet] {
        assert!(
            matches!(parse_summary(&raw, 500), Err(AppError::InvalidSummary(_))),
            "{raw}"
        );
    }
}

#[test]
fn unexpected_keyword_count_is_tolerated() {
    let raw = json!({ "summary": "s", "keywords": ["only", "three", "tags"], "tweet": "t" }).to_string();
    let result = parse_summary(&raw, 500).unwrap();
    assert_eq!(result.keywords.len(), 3);
}

#[test]
fn overlong_summary_is_truncated() {
    let raw = json!({ "summary": "あいうえおかきくけこ", "keywords": ["k"], "tweet": "t" }).to_string();
    let result = parse_summary(&raw, 5).unwrap();
    assert_eq!(result.summary, "あいうえお");
}

//! Integration tests for the translate endpoint
//!
//! Drives the full router with a stub provider and temporary resources.

use assert_json_diff::assert_json_eq;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use ladino_translator::core::provider::{ApiUsage, MessagesRequest, MessagesResponse};
use ladino_translator::{
    create_router, AppState, ModelProvider, ResourceCache, TranslationError, TranslationService,
    TranslatorConfig,
};
use serde_json::{json, Value};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

// == Helper Types ==

enum Outcome {
    Reply(MessagesResponse),
    Fail(String),
}

struct StubProvider {
    outcome: Outcome,
    calls: AtomicUsize,
    last_request: Mutex<Option<MessagesRequest>>,
}

impl StubProvider {
    fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelProvider for StubProvider {
    async fn create_message(
        &self,
        request: &MessagesRequest,
    ) -> Result<MessagesResponse, TranslationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match &self.outcome {
            Outcome::Reply(reply) => Ok(reply.clone()),
            Outcome::Fail(message) => Err(TranslationError::NetworkError {
                message: message.clone(),
            }),
        }
    }
}

struct TestApp {
    router: Router,
    provider: Arc<StubProvider>,
    resources: Arc<ResourceCache>,
    _dir: TempDir,
}

// == Helper Functions ==

fn ola() -> Outcome {
    Outcome::Reply(MessagesResponse::from_text(
        "Ola",
        ApiUsage {
            input_tokens: 1200,
            output_tokens: 3,
            cache_read_input_tokens: Some(1100),
            cache_creation_input_tokens: None,
        },
    ))
}

fn create_test_app(outcome: Outcome, development: bool) -> TestApp {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("prompts")).unwrap();
    fs::create_dir_all(dir.path().join("resources")).unwrap();
    fs::write(dir.path().join("prompts/system_prompt.txt"), "You translate Ladino.").unwrap();
    fs::write(dir.path().join("resources/dictionary.txt"), "ola = hello").unwrap();

    let config = Arc::new(TranslatorConfig {
        api_key: "test_key".to_string(),
        development,
        system_prompt_path: dir.path().join("prompts/system_prompt.txt"),
        resources_dir: dir.path().join("resources"),
        ..Default::default()
    });
    let resources = Arc::new(ResourceCache::from_config(&config));
    let provider = StubProvider::new(outcome);
    let service = TranslationService::new(config, resources.clone(), provider.clone());

    TestApp {
        router: create_router(AppState::new(service)),
        provider,
        resources,
        _dir: dir,
    }
}

fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/translate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn assert_cors(response: &axum::response::Response) {
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type, Authorization");
}

// == Success Path ==

#[tokio::test]
async fn test_translate_english_to_ladino() {
    let app = create_test_app(ola(), false);

    let response = app
        .router
        .oneshot(post_json(
            r#"{"source_text":"Hello","source_language":"en","target_language":"lad"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);

    let json = body_to_json(response.into_body()).await;
    assert_json_eq!(
        json,
        json!({
            "translation": "Ola",
            "usage": {"input_tokens": 1200, "output_tokens": 3, "cache_read": 1100, "cache_created": 0},
            "source_language": "en",
            "target_language": "lad"
        })
    );
    assert_eq!(app.provider.calls(), 1);
}

#[tokio::test]
async fn test_provider_receives_prompt_and_cached_knowledge_base() {
    let app = create_test_app(ola(), false);

    let response = app
        .router
        .oneshot(post_json(
            r#"{"source_text":"Buenos dias","source_language":"lad","target_language":"tr"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = app.provider.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.model, "claude-3-5-haiku-20241022");
    assert_eq!(request.max_tokens, 2048);
    assert_eq!(request.system[0].text, "You translate Ladino.");
    assert!(request.system[0].cache_control.is_none());
    assert_eq!(
        request.system[1].text,
        "<knowledge_base>\n<dictionary>\nola = hello\n</dictionary>\n</knowledge_base>"
    );
    assert!(request.system[1].cache_control.is_some());
    assert!(request.messages[0]
        .content
        .contains("from Ladino (Judeo-Spanish) to Turkish:\n\n\"Buenos dias\""));
}

#[tokio::test]
async fn test_resources_loaded_once_across_requests() {
    let app = create_test_app(ola(), false);
    let body = r#"{"source_text":"Hello","source_language":"en","target_language":"lad"}"#;

    for _ in 0..3 {
        let response = app.router.clone().oneshot(post_json(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(app.resources.disk_loads(), 2);
    assert_eq!(app.provider.calls(), 3);
}

// == Validation ==

#[tokio::test]
async fn test_missing_fields() {
    for body in [
        r#"{"source_language":"en","target_language":"lad"}"#,
        r#"{"source_text":"","source_language":"en","target_language":"lad"}"#,
        r#"{"source_text":"Hello","source_language":"en"}"#,
        r#"not json"#,
    ] {
        let app = create_test_app(ola(), false);
        let response = app.router.oneshot(post_json(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_cors(&response);
        let json = body_to_json(response.into_body()).await;
        assert_eq!(
            json,
            json!({"error": "Missing required fields: source_text, source_language, target_language"})
        );
        assert_eq!(app.provider.calls(), 0);
    }
}

#[tokio::test]
async fn test_text_too_long() {
    let app = create_test_app(ola(), false);
    let body = json!({
        "source_text": "a".repeat(501),
        "source_language": "lad",
        "target_language": "es"
    })
    .to_string();

    let response = app.router.oneshot(post_json(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(
        json["error"],
        "Text exceeds maximum length of 500 characters. Current length: 501"
    );
    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn test_body_over_buffer_limit_is_length_error() {
    let app = create_test_app(ola(), false);
    let body = json!({
        "source_text": "a".repeat(3_000_000),
        "source_language": "lad",
        "target_language": "en"
    })
    .to_string();
    let declared = body.len();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/translate")
                .header("content-type", "application/json")
                .header("content-length", declared)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_cors(&response);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(
        json,
        json!({
            "error": format!(
                "Text exceeds maximum length of 500 characters. Current length: {}",
                declared
            )
        })
    );
    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn test_non_pivot_pair_rejected() {
    let app = create_test_app(ola(), false);

    let response = app
        .router
        .oneshot(post_json(
            r#"{"source_text":"Hello","source_language":"en","target_language":"es"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json, json!({"error": "One language must be Ladino (lad)"}));
    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn test_pivot_on_both_sides_rejected() {
    let app = create_test_app(ola(), false);

    let response = app
        .router
        .oneshot(post_json(
            r#"{"source_text":"Ola","source_language":"lad","target_language":"lad"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.provider.calls(), 0);
}

// == Methods ==

#[tokio::test]
async fn test_preflight() {
    let app = create_test_app(ola(), false);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/translate")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_other_methods_not_allowed() {
    for method in ["GET", "PUT", "DELETE"] {
        let app = create_test_app(ola(), false);

        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri("/api/translate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_cors(&response);
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json, json!({"error": "Method not allowed"}));
    }
}

// == Provider Failures ==

#[tokio::test]
async fn test_provider_failure_hides_details() {
    let app = create_test_app(Outcome::Fail("connection reset".to_string()), false);

    let response = app
        .router
        .oneshot(post_json(
            r#"{"source_text":"Hello","source_language":"en","target_language":"lad"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&response);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json, json!({"error": "Translation failed. Please try again."}));
}

#[tokio::test]
async fn test_provider_failure_details_in_development() {
    let app = create_test_app(Outcome::Fail("connection reset".to_string()), true);

    let response = app
        .router
        .oneshot(post_json(
            r#"{"source_text":"Hello","source_language":"en","target_language":"lad"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "Translation failed. Please try again.");
    assert_eq!(json["details"], "Network error: connection reset");
}

#[tokio::test]
async fn test_empty_provider_output_is_failure() {
    let app = create_test_app(Outcome::Reply(MessagesResponse::default()), true);

    let response = app
        .router
        .oneshot(post_json(
            r#"{"source_text":"Hello","source_language":"en","target_language":"lad"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["details"], "Empty response from Claude API");
}

// == Health ==

#[tokio::test]
async fn test_health_reports_resource_state() {
    let app = create_test_app(ola(), false);

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(
        json["resources"],
        json!({
            "system_prompt": "unloaded",
            "knowledge_base": "unloaded",
            "system_prompt_loaded_at": null,
            "knowledge_base_loaded_at": null
        })
    );

    app.resources.prewarm().await;

    let response = app
        .router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["resources"]["system_prompt"], "loaded");
    assert_eq!(json["resources"]["knowledge_base"], "loaded");
    assert!(json["resources"]["system_prompt_loaded_at"].is_string());
    assert!(json["resources"]["knowledge_base_loaded_at"].is_string());
}

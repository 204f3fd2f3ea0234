//! End-to-end pipeline tests against a stub analysis engine.
//!
//! A minimal axum server stands in for the engine so the success path -
//! analyze, extract, filter, prompt - can be exercised with real HTTP round
//! trips, and the degradation path can be compared against it.
//!
//! Run with: `cargo test --test pipeline_tests`

use std::sync::{Arc, Once};
use std::time::Duration;

use axum::{Json, Router, body::Body, http::Request, http::StatusCode, routing::post};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use reverie_journal::{
    auth,
    config::ServerConfig,
    handlers::{JournalHub, build_protected_routes},
};

const TOKEN: &str = "pipeline-test-token";
static ENV_INIT: Once = Once::new();

fn init_env() {
    ENV_INIT.call_once(|| {
        // SAFETY: called once before any parallel tests start.
        unsafe {
            std::env::set_var("REVERIE_API_TOKENS", format!("carol:{TOKEN}"));
        }
    });
}

/// Spawn a stub engine on an ephemeral port and return its base URL.
///
/// `/v1/analyze` answers a fixed extraction-rich analysis; `/v1/prompt`
/// answers a personalized prompt.
async fn spawn_stub_engine() -> String {
    async fn analyze() -> Json<serde_json::Value> {
        Json(json!({
            "summary": "An energetic day with a clear plan.",
            "sentiment": "positive",
            "keywords": ["running", "dentist"],
            "suggestions": ["Schedule the appointment soon."],
            "insights": "Exercise keeps showing up on good days.",
            "extracted": {
                "mood": "good",
                "moodConfidence": 0.85,
                "todos": [
                    {"title": "Call the dentist", "dueDate": "2026-08-10", "priority": "high", "confidence": 0.95},
                    {"title": "Maybe reorganize the garage", "confidence": 0.4},
                ],
                "media": [
                    {"title": "Project Hail Mary", "mediaType": "book", "confidence": 0.9},
                ],
                "habits": [
                    {"name": "morning run", "frequency": "daily", "confidence": 0.8},
                ],
            },
        }))
    }

    async fn prompt() -> Json<serde_json::Value> {
        Json(json!({"prompt": "Your running streak is at 4 days - what kept it alive today?"}))
    }

    let app = Router::new()
        .route("/v1/analyze", post(analyze))
        .route("/v1/prompt", post(prompt));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

async fn harness_with_engine(engine_url: String) -> (Arc<JournalHub>, Router) {
    init_env();
    let config = ServerConfig {
        engine_url,
        engine_timeout: Duration::from_secs(2),
        ..ServerConfig::default()
    };
    let hub = Arc::new(JournalHub::new(config));
    let app = build_protected_routes(hub.clone())
        .layer(axum::middleware::from_fn(auth::auth_middleware));
    (hub, app)
}

fn authed_json(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {TOKEN}"))
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn analyze_returns_engine_analysis_and_filtered_candidates() {
    let engine_url = spawn_stub_engine().await;
    let (_hub, app) = harness_with_engine(engine_url).await;

    let response = app
        .oneshot(authed_json(
            "POST",
            "/ai/analyze-journal",
            json!({"content": "Ran this morning, need to call the dentist. Still reading Project Hail Mary."}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["analysis"]["sentiment"], "positive");
    assert_eq!(
        body["analysis"]["summary"],
        "An energetic day with a clear plan."
    );

    // Default threshold 0.7 drops the 0.4 todo; kind grouping orders the rest.
    let candidates = body["candidates"].as_array().unwrap();
    let kinds: Vec<&str> = candidates
        .iter()
        .map(|c| c["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["todo", "mood", "habit", "media"]);
    assert_eq!(candidates[0]["payload"]["title"], "Call the dentist");
    assert_eq!(candidates[1]["payload"]["mood"], "good");
}

#[tokio::test]
async fn preferences_narrow_the_surfaced_candidates() {
    let engine_url = spawn_stub_engine().await;
    let (_hub, app) = harness_with_engine(engine_url).await;

    // Only moods above 0.8 wanted
    let response = app
        .clone()
        .oneshot(authed_json(
            "PUT",
            "/journal/preferences",
            json!({
                "confidenceThreshold": 0.8,
                "suggestionTypes": ["mood", "reflection"],
                "promptStyle": "analytical",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authed_json(
            "POST",
            "/ai/analyze-journal",
            json!({"content": "Ran this morning, need to call the dentist."}),
        ))
        .await
        .unwrap();
    let body = json_body(response).await;

    // The 0.95 todo is excluded (wrong kind); the 0.85 mood is retained.
    let candidates = body["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0]["kind"], "mood");
}

#[tokio::test]
async fn prompt_uses_engine_reply_when_available() {
    let engine_url = spawn_stub_engine().await;
    let (_hub, app) = harness_with_engine(engine_url).await;

    let response = app
        .oneshot(authed_json("POST", "/ai/journal-prompt", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(
        body["prompt"],
        "Your running streak is at 4 days - what kept it alive today?"
    );
}

#[tokio::test]
async fn engine_500_degrades_analysis_but_not_the_status() {
    async fn broken() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    let app = Router::new()
        .route("/v1/analyze", post(broken))
        .route("/v1/prompt", post(broken));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let (_hub, app) = harness_with_engine(format!("http://{addr}")).await;

    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/ai/analyze-journal",
            json!({"content": "A valid entry."}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["analysis"]["summary"], "Could not analyze entry.");

    let response = app
        .oneshot(authed_json("POST", "/ai/journal-prompt", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["prompt"], "What's on your mind today?");
}

#[tokio::test]
async fn malformed_engine_payload_degrades_to_canonical_result() {
    async fn garbage() -> &'static str {
        "this is not json"
    }

    let app = Router::new().route("/v1/analyze", post(garbage));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let (_hub, app) = harness_with_engine(format!("http://{addr}")).await;

    let response = app
        .oneshot(authed_json(
            "POST",
            "/ai/analyze-journal",
            json!({"content": "A valid entry."}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["analysis"]["summary"], "Could not analyze entry.");
    assert_eq!(body["candidates"], json!([]));
}

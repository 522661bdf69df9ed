//! HTTP routes for the lecture API
//!
//! - POST /api/generate-lecture  topic in, lecture (or raw-text fallback) out
//! - GET  /api/test-provider     one round trip to the configured provider
//! - GET  /api/version           server version
//! - GET  /health                liveness

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{
        HeaderValue, StatusCode,
        header::{ACCEPT, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use lecturegen_core::{LectureError, LectureResponse, LectureService};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub service: LectureService,
}

/// Request body for /api/generate-lecture
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateLectureRequest {
    #[serde(alias = "topic")]
    pub big_topic: Option<String>,
    pub subtopics: Option<String>,
    pub output_mode: Option<String>,
}

#[derive(Serialize)]
struct VersionInfo {
    version: String,
    model: String,
}

/// Error type for API handlers, rendered as `{ "error": message }`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<LectureError> for ApiError {
    fn from(err: LectureError) -> Self {
        let status = match err {
            LectureError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Build the app. An empty `cors_origins` allows any origin.
pub fn build_router(state: AppState, cors_origins: Vec<HeaderValue>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers([CONTENT_TYPE, ACCEPT]);
    let cors = if cors_origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(cors_origins)
    };

    Router::new()
        .route("/api/generate-lecture", post(generate_lecture_handler))
        .route("/api/test-provider", get(test_provider_handler))
        .route("/api/version", get(version_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn generate_lecture_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateLectureRequest>, JsonRejection>,
) -> Result<Json<LectureResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let Json(req) = payload.inspect_err(|e| {
        log::warn!("[{}] Rejected request body: {}", request_id, e.body_text());
    })?;

    log::info!(
        "[{}] Lecture requested: topic={:?} mode={:?}",
        request_id,
        req.big_topic.as_deref().unwrap_or_default(),
        req.output_mode.as_deref().unwrap_or("standard")
    );

    let result = state
        .service
        .generate(
            req.big_topic.as_deref(),
            req.subtopics.as_deref(),
            req.output_mode.as_deref(),
        )
        .await;

    match result {
        Ok(response) => {
            if response.is_fallback() {
                log::warn!("[{}] Delivered raw output with format warning", request_id);
            } else {
                log::info!("[{}] Lecture delivered", request_id);
            }
            Ok(Json(response))
        }
        Err(err) if err.is_validation() => {
            log::warn!("[{}] Validation failed: {}", request_id, err);
            Err(err.into())
        }
        Err(err) => {
            log::error!("[{}] Provider error: {}", request_id, err);
            Err(err.into())
        }
    }
}

/// Connectivity check against the configured provider
pub async fn test_provider_handler(State(state): State<AppState>) -> Response {
    match state.service.ping().await {
        Ok(message) => Json(json!({ "success": true, "message": message })).into_response(),
        Err(err) => {
            log::error!("Provider connectivity check failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

async fn version_handler(State(state): State<AppState>) -> Json<VersionInfo> {
    Json(VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.service.model().to_string(),
    })
}

async fn health_handler() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use lecturegen_core::{INVALID_JSON_WARNING, TextGenerator};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    struct StubGenerator {
        reply: Result<String, String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, _prompt: &str) -> lecturegen_core::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map_err(LectureError::Service)
        }

        fn model(&self) -> &str {
            "stub-model"
        }
    }

    fn app(reply: Result<&str, &str>) -> (Router, Arc<StubGenerator>) {
        let stub = Arc::new(StubGenerator {
            reply: reply.map(str::to_string).map_err(str::to_string),
            calls: AtomicUsize::new(0),
        });
        let state = AppState {
            service: LectureService::new(stub.clone()),
        };
        (build_router(state, Vec::new()), stub)
    }

    async fn post_lecture(router: Router, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/generate-lecture")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_generate_lecture_echoes_mode() {
        let reply = r#"{"title":"Mitosis","lectures":[],"output_mode":"concise"}"#;
        let (router, stub) = app(Ok(reply));

        let (status, body) =
            post_lecture(router, json!({ "bigTopic": "Mitosis", "outputMode": "concise" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["output_mode"], "concise");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_topic_is_bad_request() {
        let (router, stub) = app(Ok("{}"));

        let (status, body) = post_lecture(router, json!({ "bigTopic": "" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Topic is required");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_long_topic_is_bad_request() {
        let (router, stub) = app(Ok("{}"));

        let (status, body) = post_lecture(router, json!({ "topic": "a".repeat(250) })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("200"));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fenced_reply_is_unwrapped() {
        let (router, _) = app(Ok("```json\n{\"title\": \"Osmosis\"}\n```"));

        let (status, body) = post_lecture(router, json!({ "bigTopic": "Osmosis" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "title": "Osmosis" }));
    }

    #[tokio::test]
    async fn test_prose_reply_returns_raw_output() {
        let (router, _) = app(Ok("I'm not able to produce JSON today."));

        let (status, body) = post_lecture(router, json!({ "bigTopic": "Meiosis" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["raw_output"], "I'm not able to produce JSON today.");
        assert_eq!(body["warning"], INVALID_JSON_WARNING);
    }

    #[tokio::test]
    async fn test_provider_failure_is_server_error() {
        let (router, _) = app(Err("Upstream error (503): overloaded"));

        let (status, body) = post_lecture(router, json!({ "bigTopic": "Mitosis" })).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Upstream error (503): overloaded");
    }

    #[tokio::test]
    async fn test_malformed_body_reports_error() {
        let (router, stub) = app(Ok("{}"));
        let request = Request::builder()
            .method("POST")
            .uri("/api/generate-lecture")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();

        assert!(response.status().is_client_error());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_connectivity_check() {
        let (router, _) = app(Ok("Hello from the model"));
        let request = Request::builder().uri("/api/test-provider").body(Body::empty()).unwrap();

        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "success": true, "message": "Hello from the model" }));
    }

    #[tokio::test]
    async fn test_cors_allows_only_listed_origins() {
        let stub = Arc::new(StubGenerator {
            reply: Ok("{}".to_string()),
            calls: AtomicUsize::new(0),
        });
        let state = AppState {
            service: LectureService::new(stub),
        };
        let router = build_router(state, vec![HeaderValue::from_static("http://localhost:5173")]);

        let request = |origin: &'static str| {
            Request::builder()
                .uri("/health")
                .header("Origin", origin)
                .body(Body::empty())
                .unwrap()
        };

        let allowed = router.clone().oneshot(request("http://localhost:5173")).await.unwrap();
        assert_eq!(
            allowed.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:5173"
        );

        let other = router.oneshot(request("http://evil.example")).await.unwrap();
        assert!(other.headers().get("access-control-allow-origin").is_none());
    }
}

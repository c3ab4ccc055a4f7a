//! Summarize Routes - Image to templated summary
//!
//! HTTP handlers that delegate to SummarizeService for business logic.

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use uuid::Uuid;

use tinytext::{DomainError, Language};

use crate::application::SummarizeCommand;
use crate::error::ApiError;
use crate::models::{ErrorResponse, SummarizeRequest, SummarizeResponse, SummaryMeta};
use crate::AppState;

const QUERY_LOG_CHARS: usize = 60;

/// Summarize an image
#[utoipa::path(
    post,
    path = "/api/summarize",
    request_body = SummarizeRequest,
    responses(
        (status = 200, description = "Templated summary", body = SummarizeResponse),
        (status = 400, description = "Missing image, bad JSON or unknown forceModel", body = ErrorResponse),
        (status = 405, description = "Only POST is accepted", body = ErrorResponse),
        (status = 500, description = "Missing credential or every model tier failed", body = ErrorResponse)
    ),
    tag = "Summarize"
)]
pub async fn summarize(
    State(state): State<AppState>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let Json(request) = payload?;

    let image = request
        .image_data()
        .ok_or_else(|| ApiError::BadRequest("imageBase64 is required".to_string()))?;

    let service = state.summarize_service.as_ref().ok_or_else(|| {
        DomainError::MissingCredential("OPENAI_API_KEY is not configured".to_string())
    })?;

    let request_id = Uuid::new_v4();
    let started = Instant::now();
    let command = SummarizeCommand {
        image_base64: image.to_string(),
        language: Language::or_default(request.lang.as_deref(), &state.config.default_lang),
        force_model: request.force_model.clone(),
    };

    let outcome = service.summarize(&command).await?;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let query: String = outcome
        .payload
        .coupang_query
        .as_deref()
        .unwrap_or_default()
        .chars()
        .take(QUERY_LOG_CHARS)
        .collect();
    tracing::info!(
        "📝 [{}] {} {:?} via {} ({} ms) query='{}'",
        request_id,
        outcome.payload.domain,
        outcome.payload.keys(),
        outcome.meta.model_used,
        elapsed_ms,
        query
    );

    Ok(Json(SummarizeResponse {
        success: true,
        payload: outcome.payload.into(),
        meta: SummaryMeta::new(request_id, outcome.meta, elapsed_ms),
    }))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/summarize",
        post(summarize).fallback(method_not_allowed),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        extract::DefaultBodyLimit,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use tinytext::{Catalog, TokenUsage, VisionRequest, VisionResponse, VisionSummarizer};

    use super::*;
    use crate::application::SummarizeService;
    use crate::config::ServerConfig;

    /// Answers every call with the same content
    struct FixedVision(String);

    #[async_trait]
    impl VisionSummarizer for FixedVision {
        async fn summarize(
            &self,
            request: &VisionRequest<'_>,
        ) -> Result<VisionResponse, DomainError> {
            Ok(VisionResponse {
                content: self.0.clone(),
                model: request.model.to_string(),
                usage: TokenUsage {
                    prompt_tokens: 100,
                    completion_tokens: 20,
                    total_tokens: 120,
                },
                finish_reason: Some("stop".to_string()),
            })
        }

        fn provider_name(&self) -> &str {
            "fixed"
        }
    }

    fn app(vision: Option<FixedVision>) -> Router {
        let config = Arc::new(ServerConfig::default());
        let summarize_service = vision.map(|v| {
            let vision: Arc<dyn VisionSummarizer> = Arc::new(v);
            Arc::new(SummarizeService::new(
                vision,
                Arc::new(Catalog::builtin()),
                config.model_tiers.clone(),
                config.vision_options(),
            ))
        });

        router().with_state(AppState {
            summarize_service,
            config,
        })
    }

    fn receipt_vision() -> FixedVision {
        FixedVision(
            json!({
                "domain": "receipt",
                "categories": [
                    {"key": "total", "summary": "- 4,500원"},
                    {"key": "items", "summary": "- 아메리카노 1잔"},
                    {"key": "payment", "summary": "- 신용카드 일시불"}
                ],
                "core_summary": "- 아메리카노 1잔 4,500원",
                "coupang_query": "아메리카노 원두"
            })
            .to_string(),
        )
    }

    async fn send(app: Router, method: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri("/api/summarize")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_non_post_is_405() {
        let (status, body) = send(app(Some(receipt_vision())), "GET", json!({})).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_missing_image_is_400() {
        let (status, body) = send(app(Some(receipt_vision())), "POST", json!({"lang": "en"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "imageBase64 is required");
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let response = app(Some(receipt_vision()))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/summarize")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"imageBase64\": "))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let app = app(Some(receipt_vision())).layer(DefaultBodyLimit::max(64));
        let image = "A".repeat(1024);
        let (status, body) = send(app, "POST", json!({"imageBase64": image})).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_missing_image_checked_before_credential() {
        let (status, _) = send(app(None), "POST", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_credential_is_500() {
        let (status, body) = send(app(None), "POST", json!({"imageBase64": "/9j/4AAQ"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn test_unknown_force_model_is_400() {
        let (status, body) = send(
            app(Some(receipt_vision())),
            "POST",
            json!({"imageBase64": "/9j/4AAQ", "forceModel": "not-a-tier"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("not-a-tier"));
    }

    #[tokio::test]
    async fn test_summarize_success() {
        let (status, body) = send(
            app(Some(receipt_vision())),
            "POST",
            json!({"imageBase64": "data:image/jpeg;base64,/9j/4AAQ"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["payload"]["domain"], "receipt");
        assert_eq!(body["payload"]["categories"][0]["title"], "💵 총액");
        assert_eq!(body["payload"]["coreSummary"], "- 아메리카노 1잔 4,500원");
        assert_eq!(body["payload"]["coupangQuery"], "아메리카노 원두");
        assert_eq!(body["meta"]["model_used"], "gpt-4o-mini");
        assert_eq!(body["meta"]["fallback_used"], false);
        assert_eq!(body["meta"]["total_tokens"], 240);
        assert!(body["meta"]["request_id"].is_string());
    }
}

use axum::{extract::DefaultBodyLimit, extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod adapters;
mod application;
mod config;
mod error;
mod models;
mod routes;

use adapters::OpenAiVision;
use application::SummarizeService;
use config::ServerConfig;
use tinytext::VisionSummarizer;

/// Application service behind a runtime-chosen vision provider
pub type AppSummarizeService = SummarizeService<dyn VisionSummarizer>;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    /// `None` when no OpenAI key is configured
    pub summarize_service: Option<Arc<AppSummarizeService>>,
    pub config: Arc<ServerConfig>,
}

#[derive(Serialize)]
struct HealthCheck {
    status: String,
    message: String,
    version: String,
    vision_configured: bool,
    /// Provider reachability; `None` when no provider is configured
    vision_healthy: Option<bool>,
    model_tiers: Vec<String>,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthCheck> {
    let vision_healthy = match &state.summarize_service {
        Some(service) => Some(service.health_check().await),
        None => None,
    };

    Json(HealthCheck {
        status: "ok".to_string(),
        message: "TinyText API is running - small print, short answers".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        vision_configured: state.summarize_service.is_some(),
        vision_healthy,
        model_tiers: state.config.model_tiers.clone(),
    })
}

#[shuttle_runtime::main]
async fn main(
    #[shuttle_runtime::Secrets] secrets: shuttle_runtime::SecretStore,
) -> shuttle_axum::ShuttleAxum {
    tracing::info!("🔍 TinyText API initializing...");

    let config = ServerConfig::from_lookup(|key| secrets.get(key)).map_err(anyhow::Error::new)?;
    let catalog = Arc::new(config.catalog().map_err(anyhow::Error::new)?);

    tracing::info!(
        "📚 Catalog ready (default language '{}', tiers: {})",
        catalog.default_language(),
        config.model_tiers.join(" → ")
    );

    // Initialize vision provider if configured
    let summarize_service = match config.openai_api_key.as_deref() {
        Some(key) => {
            let vision = OpenAiVision::new(key, config.timeout)
                .map_err(anyhow::Error::new)?
                .with_base_url(config.openai_base_url.as_str());
            tracing::info!("👁️  Vision provider initialized ({})", vision.provider_name());

            let vision: Arc<dyn VisionSummarizer> = Arc::new(vision);
            Some(Arc::new(SummarizeService::new(
                vision,
                catalog,
                config.model_tiers.clone(),
                config.vision_options(),
            )))
        }
        None => {
            tracing::warn!("⚠️  No OPENAI_API_KEY set - /api/summarize will return 500");
            None
        }
    };

    let static_dir = config.static_dir.clone();
    let max_body_bytes = config.max_body_bytes;

    let state = AppState {
        summarize_service,
        config: Arc::new(config),
    };

    // OpenAPI documentation
    let openapi = routes::swagger::ApiDoc::openapi();

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .route("/health", get(health_check))
        .merge(routes::summarize::router())
        .fallback_service(ServeDir::new(&static_dir))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    tracing::info!("📚 Swagger UI: /swagger-ui");
    tracing::info!("🗂️  Static files: {}", static_dir.display());
    tracing::info!("✅ TinyText API ready");

    Ok(router.into())
}

//! Summarize - Request/Response DTOs
//!
//! `payload` uses camelCase keys for the web client; `meta` stays snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use tinytext::{Category, SummaryPayload};

use crate::application::RunMeta;

/// Summarize request
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    /// Base64 image, optionally with a `data:image/...;base64,` prefix
    pub image_base64: Option<String>,
    /// Output language code (default "ko")
    pub lang: Option<String>,
    /// Run only this model tier
    pub force_model: Option<String>,
}

impl SummarizeRequest {
    /// Image data with any data-URI prefix removed; `None` when blank
    pub fn image_data(&self) -> Option<&str> {
        let raw = self.image_base64.as_deref()?.trim();
        let data = match raw.strip_prefix("data:") {
            Some(rest) => rest.split_once(',').map_or("", |(_, data)| data),
            None => raw,
        };
        Some(data.trim()).filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryDto {
    pub key: String,
    pub title: String,
    pub summary: String,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            key: category.key,
            title: category.title,
            summary: category.summary,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDto {
    /// medicine | manual | receipt | food_label | product_page | contract | general
    pub domain: String,
    pub categories: Vec<CategoryDto>,
    pub core_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupang_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guess_summary: Option<String>,
}

impl From<SummaryPayload> for SummaryDto {
    fn from(payload: SummaryPayload) -> Self {
        Self {
            domain: payload.domain.to_string(),
            categories: payload.categories.into_iter().map(CategoryDto::from).collect(),
            core_summary: payload.core_summary,
            coupang_query: payload.coupang_query,
            guess_summary: payload.guess_summary,
        }
    }
}

/// Run metadata
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SummaryMeta {
    pub request_id: Uuid,
    pub model_used: String,
    pub fallback_used: bool,
    pub tiers_tried: Vec<String>,
    /// Pipeline stages visited by the returned result
    pub stages: Vec<String>,
    pub total_tokens: u32,
    pub elapsed_ms: u64,
    pub processed_at: DateTime<Utc>,
}

impl SummaryMeta {
    pub fn new(request_id: Uuid, meta: RunMeta, elapsed_ms: u64) -> Self {
        Self {
            request_id,
            model_used: meta.model_used,
            fallback_used: meta.fallback_used,
            tiers_tried: meta.tiers_tried,
            stages: meta.stages.iter().map(ToString::to_string).collect(),
            total_tokens: meta.usage.total_tokens,
            elapsed_ms,
            processed_at: Utc::now(),
        }
    }
}

/// Summarize response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SummarizeResponse {
    pub success: bool,
    pub payload: SummaryDto,
    pub meta: SummaryMeta,
}

/// Error envelope
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

//! TinyText API Client

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// API Client for TinyText
pub struct TinyTextClient {
    client: Client,
    base_url: String,
}

// ============================================
// API Types
// ============================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    pub image_base64: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeResponse {
    pub payload: SummaryPayload,
    pub meta: SummaryMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPayload {
    pub domain: String,
    pub categories: Vec<CategoryResponse>,
    pub core_summary: String,
    pub coupang_query: Option<String>,
    pub guess_summary: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryResponse {
    pub key: String,
    pub title: String,
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct SummaryMeta {
    pub model_used: String,
    pub fallback_used: bool,
    #[serde(default)]
    pub total_tokens: u32,
    #[serde(default)]
    pub elapsed_ms: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

impl TinyTextClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Test connection with health check
    pub async fn health(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        let resp = self.client.get(&url).send().await?;
        Ok(resp.status().is_success())
    }

    /// Summarize an image; returns the raw JSON body alongside the typed view
    pub async fn summarize(
        &self,
        request: &SummarizeRequest,
    ) -> Result<(serde_json::Value, SummarizeResponse)> {
        let url = format!("{}/api/summarize", self.base_url);
        tracing::debug!("POST {} ({} base64 chars)", url, request.image_base64.len());

        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Failed to connect to TinyText API")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("API error ({}): {}", status, error_message(&body));
        }

        let raw: serde_json::Value = resp.json().await.context("Failed to parse response")?;
        let typed = serde_json::from_value(raw.clone()).context("Unexpected response shape")?;

        Ok((raw, typed))
    }
}

/// Read an image file and base64-encode it
pub fn encode_image(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read image {:?}", path))?;
    if bytes.is_empty() {
        bail!("Image {:?} is empty", path);
    }
    Ok(STANDARD.encode(bytes))
}

/// `message` from the error envelope, or the body as-is
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.to_string())
}

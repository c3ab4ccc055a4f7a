//! OpenAI Vision Implementation
//!
//! Calls the chat completions API with the prompt and the inlined image,
//! asking for a JSON object back.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use tinytext::{DomainError, TokenUsage, VisionRequest, VisionResponse, VisionSummarizer};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI implementation of VisionSummarizer
#[derive(Clone)]
pub struct OpenAiVision {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiVision {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tinytext-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point at an OpenAI-compatible endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl VisionSummarizer for OpenAiVision {
    async fn summarize(&self, request: &VisionRequest<'_>) -> Result<VisionResponse, DomainError> {
        let body = ChatCompletionRequest::from_vision(request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::ExternalService(format!("OpenAI request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, body));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| DomainError::ExternalService(format!("OpenAI response parse error: {e}")))?;

        Ok(completion.into_vision_response(request.model))
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        // Listing models is free and validates the key
        match self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => Ok(true),
            Ok(response) => {
                tracing::warn!("⚠️  OpenAI health check returned {}", response.status());
                Ok(false)
            }
            Err(e) => {
                tracing::warn!("⚠️  OpenAI health check failed: {}", e);
                Ok(false)
            }
        }
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

// ============================================
// Request/Response Types
// ============================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    temperature: f32,
    top_p: f32,
    max_completion_tokens: u32,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

impl ChatCompletionRequest {
    fn from_vision(request: &VisionRequest<'_>) -> Self {
        Self {
            model: request.model.to_string(),
            temperature: request.options.temperature,
            top_p: request.options.top_p,
            max_completion_tokens: request.options.max_completion_tokens,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(request.system.to_string()),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        ContentPart::Text {
                            text: request.prompt.to_string(),
                        },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: data_url(request.image_base64),
                            },
                        },
                    ]),
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl ChatCompletionResponse {
    fn into_vision_response(self, requested_model: &str) -> VisionResponse {
        let (content, finish_reason) = self
            .choices
            .into_iter()
            .next()
            .map(|c| (c.message.content.unwrap_or_default(), c.finish_reason))
            .unwrap_or_default();

        let usage = self
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        VisionResponse {
            content,
            model: self.model.unwrap_or_else(|| requested_model.to_string()),
            usage,
            finish_reason,
        }
    }
}

// ============================================
// Helper Functions
// ============================================

/// Inline the image as a data URL, guessing the MIME type from the base64 magic bytes
fn data_url(image_base64: &str) -> String {
    let mime = if image_base64.starts_with("iVBOR") {
        "image/png"
    } else if image_base64.starts_with("R0lGOD") {
        "image/gif"
    } else if image_base64.starts_with("UklGR") {
        "image/webp"
    } else {
        "image/jpeg"
    };
    format!("data:{};base64,{}", mime, image_base64)
}

fn map_http_error(status: StatusCode, body: String) -> DomainError {
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|err| err.get("message"))
                .and_then(|msg| msg.as_str())
                .map(|msg| msg.to_string())
        })
        .unwrap_or(body);

    DomainError::ExternalService(format!(
        "OpenAI HTTP {} {}",
        status,
        message.trim()
    ))
}

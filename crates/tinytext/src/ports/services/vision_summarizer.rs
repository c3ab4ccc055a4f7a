//! Vision Summarizer Port
//!
//! Abstract interface for a vision-capable language model that reads an
//! image and answers with JSON. The model tier is chosen per call, so one
//! implementation serves the whole fallback chain.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Decoding options for a vision call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionOptions {
    /// Temperature (0.0 - 2.0)
    pub temperature: f32,
    /// Top-p sampling
    pub top_p: f32,
    /// Maximum tokens to generate
    pub max_completion_tokens: u32,
}

impl Default for VisionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_p: 0.2,
            max_completion_tokens: 700,
        }
    }
}

/// One vision call
#[derive(Debug, Clone)]
pub struct VisionRequest<'a> {
    /// Model tier identifier
    pub model: &'a str,
    pub system: &'a str,
    pub prompt: &'a str,
    /// Base64 image data without a data-URI prefix
    pub image_base64: &'a str,
    pub options: &'a VisionOptions,
}

/// Raw answer from the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionResponse {
    /// Message content, expected to be a JSON object
    pub content: String,
    /// Model that generated the response
    pub model: String,
    /// Token usage statistics
    pub usage: TokenUsage,
    /// Finish reason
    pub finish_reason: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,
    /// Tokens in the completion
    pub completion_tokens: u32,
    /// Total tokens used
    pub total_tokens: u32,
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// Vision model interface
///
/// # Example
///
/// ```rust,ignore
/// use tinytext::ports::VisionSummarizer;
///
/// struct OpenAiVision { /* ... */ }
///
/// #[async_trait]
/// impl VisionSummarizer for OpenAiVision {
///     async fn summarize(&self, request: &VisionRequest<'_>)
///         -> Result<VisionResponse, DomainError> {
///         // Call chat completions with the inlined image
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait VisionSummarizer: Send + Sync {
    /// Send the prompt and image, returning the model's raw answer
    async fn summarize(&self, request: &VisionRequest<'_>) -> Result<VisionResponse, DomainError>;

    /// Get the provider name (e.g., "openai")
    fn provider_name(&self) -> &str;

    /// Check if the provider is available and healthy
    async fn health_check(&self) -> Result<bool, DomainError> {
        Ok(true)
    }
}

//! TinyText API Routes
//!
//! - /api/summarize - Image summarization
//! - /swagger-ui - OpenAPI documentation

pub mod summarize;
pub mod swagger;

//! TinyText Domain Library
//!
//! Core types for turning a photo of tiny printed text (medicine labels,
//! receipts, manuals, ...) into a fixed, domain-templated summary.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Category, ModelOutput, SummaryPayload
//!   - `value_objects/`: DocumentDomain, Language
//!   - `catalog`: Immutable label, template and filler tables
//!   - `services/`: ResponseNormalizer, pipeline stages, PromptBuilder
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `services/`: VisionSummarizer
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tinytext::{Catalog, DocumentDomain, Language, ResponseNormalizer};
//!
//! let normalizer = ResponseNormalizer::new(Arc::new(Catalog::builtin()));
//! let categories = normalizer.enforce_template(DocumentDomain::Receipt, &Language::new("en"), &[]);
//! ```

pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Catalog, Category, DocumentDomain, DomainError, LabelSet, Language, ModelOutput,
    ParsedOutput, PipelineOutcome, PipelineState, PromptBuilder, RawCategory,
    ResponseNormalizer, Stage, SummaryPayload, SYSTEM_INSTRUCTION,
};
pub use ports::{TokenUsage, VisionOptions, VisionRequest, VisionResponse, VisionSummarizer};

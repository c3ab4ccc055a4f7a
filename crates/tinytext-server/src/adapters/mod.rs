//! Infrastructure Adapters
//!
//! Implementations of domain ports for external systems.

pub mod openai;

pub use openai::OpenAiVision;

//! Application Layer (Use Cases)
//!
//! Orchestrates the normalization pipeline against the vision model.

mod summarize_service;

pub use summarize_service::{RunMeta, SummarizeCommand, SummarizeOutcome, SummarizeService};

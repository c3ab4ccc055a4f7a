//! Service Ports
//!
//! Abstract interfaces for external services.

mod vision_summarizer;

pub use vision_summarizer::*;

//! TinyText Data Models
//!
//! - Summarize: image in, templated summary out

mod summarize;

pub use summarize::*;

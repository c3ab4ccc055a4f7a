//! Domain Services
//!
//! Pure logic over entities and the catalog: bullet sanitation, template
//! enforcement, pipeline stages and prompt construction.

pub mod bullets;
mod normalizer;
mod pipeline;
mod prompts;

pub use normalizer::*;
pub use pipeline::*;
pub use prompts::*;

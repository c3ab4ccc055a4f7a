//! Domain Entities
//!
//! Request-scoped models built from model output and configuration.
//! - Category: one templated section of a summary
//! - ModelOutput: validated shape of an untrusted model response
//! - SummaryPayload: the normalized result handed to clients

mod category;
mod model_output;
mod summary;

pub use category::*;
pub use model_output::*;
pub use summary::*;

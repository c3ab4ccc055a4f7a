//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod document_domain;
mod language;

pub use document_domain::*;
pub use language::*;

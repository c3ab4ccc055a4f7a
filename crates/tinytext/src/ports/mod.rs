//! Ports (Interfaces)
//!
//! Abstract interfaces that define how the domain layer
//! interacts with external systems.
//!
//! Implementations of these traits live in the infrastructure layer.

pub mod services;

// Re-exports
pub use services::*;

//! Domain Layer
//!
//! Pure domain logic without infrastructure dependencies.
//! Contains entities, value objects, the configuration catalog,
//! domain services, and errors.

pub mod catalog;
pub mod entities;
pub mod errors;
pub mod services;
pub mod value_objects;

// Re-exports for convenience
pub use catalog::*;
pub use entities::*;
pub use errors::*;
pub use services::*;
pub use value_objects::*;

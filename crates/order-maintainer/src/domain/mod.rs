//! Domain module for Order Maintenance
//!
//! Contains core entities, value objects, errors, invariants and the
//! validation gate.

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod validation;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use value_objects::*;

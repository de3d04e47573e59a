//! Field model shared by behaviors, schemas and records.
//!
//! # Responsibility
//! - Define field types, runtime values and field declarations.
//!
//! # Invariants
//! - A field value is stored only when its declaration accepts it.

pub mod field;
pub mod value;

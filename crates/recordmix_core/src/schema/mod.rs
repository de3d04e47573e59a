//! Schema composition, registry and built-in catalog.
//!
//! # Responsibility
//! - Turn behavior lists plus entity fields into immutable schemas.
//! - Keep entity type -> schema mappings in an explicit registry value.
//!
//! # Invariants
//! - Schemas are immutable after `build` and shared through `Arc`.
//! - No process-global schema state exists.

pub mod catalog;
pub mod compose;
pub mod registry;

pub use compose::{Schema, SchemaBuilder, ID_FIELD};

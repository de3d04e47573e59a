//! Composed entity instances and in-memory collections.

pub mod collection;
pub mod entity;

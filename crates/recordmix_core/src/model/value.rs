//! Field types and runtime field values.
//!
//! # Responsibility
//! - Define the semantic type vocabulary shared by behaviors and entities.
//! - Carry typed values through construction, mutation and serialization.
//!
//! # Invariants
//! - `FieldValue::Null` is the only representation of an absent value.
//! - Timestamps are Unix epoch milliseconds.

use crate::clock::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Field values keyed by field name.
pub type FieldValues = BTreeMap<String, FieldValue>;

/// Semantic type of one declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Bool,
    Integer,
    Float,
    Text,
    Timestamp,
    Id,
    /// Link to another entity, carrying its display label.
    Reference,
    /// Ordered list of entity ids.
    IdList,
}

impl FieldType {
    /// Stable lowercase name used in errors and schema listings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
            Self::Timestamp => "timestamp",
            Self::Id => "id",
            Self::Reference => "reference",
            Self::IdList => "id_list",
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to another entity (for example the author of a post).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: Uuid,
    /// Human-readable name of the referenced entity.
    pub label: String,
}

impl EntityRef {
    pub fn new(id: Uuid, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// One runtime field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Timestamp(Timestamp),
    Id(Uuid),
    Reference(EntityRef),
    IdList(Vec<Uuid>),
}

impl FieldValue {
    /// Semantic type of this value, or `None` for `Null`.
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(FieldType::Bool),
            Self::Integer(_) => Some(FieldType::Integer),
            Self::Float(_) => Some(FieldType::Float),
            Self::Text(_) => Some(FieldType::Text),
            Self::Timestamp(_) => Some(FieldType::Timestamp),
            Self::Id(_) => Some(FieldType::Id),
            Self::Reference(_) => Some(FieldType::Reference),
            Self::IdList(_) => Some(FieldType::IdList),
        }
    }

    /// Type name used in mismatch errors (`null` included).
    pub fn type_name(&self) -> &'static str {
        self.field_type().map_or("null", FieldType::as_str)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::Timestamp(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<Uuid> {
        match self {
            Self::Id(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&EntityRef> {
        match self {
            Self::Reference(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_id_list(&self) -> Option<&[Uuid]> {
        match self {
            Self::IdList(values) => Some(values.as_slice()),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        Self::Id(value)
    }
}

impl From<EntityRef> for FieldValue {
    fn from(value: EntityRef) -> Self {
        Self::Reference(value)
    }
}

impl From<Vec<Uuid>> for FieldValue {
    fn from(values: Vec<Uuid>) -> Self {
        Self::IdList(values)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

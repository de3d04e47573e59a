//! Field declarations shared by behaviors and entity-own fields.

use crate::clock::Timestamp;
use crate::model::value::{FieldType, FieldValue};
use serde::Serialize;

/// Default applied when a constructor omits a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldDefault {
    /// Fixed value.
    Value(FieldValue),
    /// Construction time taken from the clock.
    Now,
}

impl FieldDefault {
    /// Resolves the default against the construction instant.
    pub fn resolve(&self, now: Timestamp) -> FieldValue {
        match self {
            Self::Value(value) => value.clone(),
            Self::Now => FieldValue::Timestamp(now),
        }
    }
}

/// Declaration of one field.
///
/// Nullable fields without an explicit default start as `Null`; every other
/// field without a default is required at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    pub nullable: bool,
    pub default: Option<FieldDefault>,
    /// `false` for fields maintained by behavior hooks (e.g. `modified_at`).
    pub editable: bool,
    /// Value must be unique among records of the same entity type.
    pub unique: bool,
}

impl FieldSpec {
    pub fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            nullable: false,
            default: None,
            editable: true,
            unique: false,
        }
    }

    pub fn bool(name: &'static str) -> Self {
        Self::new(name, FieldType::Bool)
    }

    pub fn integer(name: &'static str) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn float(name: &'static str) -> Self {
        Self::new(name, FieldType::Float)
    }

    pub fn text(name: &'static str) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldType::Timestamp)
    }

    pub fn id(name: &'static str) -> Self {
        Self::new(name, FieldType::Id)
    }

    pub fn reference(name: &'static str) -> Self {
        Self::new(name, FieldType::Reference)
    }

    pub fn id_list(name: &'static str) -> Self {
        Self::new(name, FieldType::IdList)
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(FieldDefault::Value(value.into()));
        self
    }

    pub fn default_now(mut self) -> Self {
        self.default = Some(FieldDefault::Now);
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Whether construction must supply this field.
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.nullable
    }

    /// Value used when the constructor omits this field.
    pub fn initial_value(&self, now: Timestamp) -> Option<FieldValue> {
        match &self.default {
            Some(default) => Some(default.resolve(now)),
            None if self.nullable => Some(FieldValue::Null),
            None => None,
        }
    }

    /// Whether `value` may be stored in this field.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        match value.field_type() {
            None => self.nullable,
            Some(kind) => kind == self.field_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FieldSpec;
    use crate::model::value::FieldValue;

    #[test]
    fn required_only_without_default_and_not_nullable() {
        assert!(FieldSpec::text("title").is_required());
        assert!(!FieldSpec::text("title").nullable().is_required());
        assert!(!FieldSpec::text("title").default_value("").is_required());
    }

    #[test]
    fn initial_value_resolves_now_and_null() {
        assert_eq!(
            FieldSpec::timestamp("created_at")
                .default_now()
                .initial_value(42),
            Some(FieldValue::Timestamp(42))
        );
        assert_eq!(
            FieldSpec::timestamp("published_at")
                .nullable()
                .initial_value(42),
            Some(FieldValue::Null)
        );
        assert_eq!(FieldSpec::float("latitude").initial_value(42), None);
    }

    #[test]
    fn accepts_matching_type_and_null_only_when_nullable() {
        let spec = FieldSpec::float("latitude");
        assert!(spec.accepts(&FieldValue::Float(1.0)));
        assert!(!spec.accepts(&FieldValue::Integer(1)));
        assert!(!spec.accepts(&FieldValue::Null));
        assert!(spec.nullable().accepts(&FieldValue::Null));
    }
}

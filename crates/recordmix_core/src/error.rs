//! Error types for composition, construction, mutation and validation.
//!
//! # Invariants
//! - Every error is local and recoverable; none aborts the process.
//! - Composition errors surface when a schema is built, never later.

use crate::model::value::FieldType;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Schema composition failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositionError {
    /// Two declarations contribute the same field name.
    FieldCollision {
        field: &'static str,
        first_owner: String,
        second_owner: String,
    },
    /// Two behaviors expose a derived property with the same name.
    PropertyCollision {
        property: &'static str,
        first_owner: String,
        second_owner: String,
    },
    /// The same behavior is listed twice for one entity.
    DuplicateBehavior(&'static str),
    InvalidEntityType(String),
    InvalidBehaviorName(&'static str),
    InvalidFieldName(&'static str),
    /// `id` is reserved for record identity.
    ReservedField(&'static str),
}

impl Display for CompositionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldCollision {
                field,
                first_owner,
                second_owner,
            } => write!(
                f,
                "field `{field}` declared by both `{first_owner}` and `{second_owner}`"
            ),
            Self::PropertyCollision {
                property,
                first_owner,
                second_owner,
            } => write!(
                f,
                "derived property `{property}` exposed by both `{first_owner}` and `{second_owner}`"
            ),
            Self::DuplicateBehavior(name) => write!(f, "behavior listed twice: {name}"),
            Self::InvalidEntityType(value) => write!(f, "entity type is invalid: {value}"),
            Self::InvalidBehaviorName(value) => write!(f, "behavior name is invalid: {value}"),
            Self::InvalidFieldName(value) => write!(f, "field name is invalid: {value}"),
            Self::ReservedField(value) => write!(f, "field name is reserved: {value}"),
        }
    }
}

impl Error for CompositionError {}

/// Field-level failures shared by construction and mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    UnknownField(String),
    TypeMismatch {
        field: String,
        expected: FieldType,
        found: &'static str,
    },
    NullNotAllowed(String),
    /// Field is maintained by a behavior and cannot be set directly.
    ReadOnly(String),
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownField(name) => write!(f, "unknown field: {name}"),
            Self::TypeMismatch {
                field,
                expected,
                found,
            } => write!(f, "field `{field}` expects {expected}, got {found}"),
            Self::NullNotAllowed(name) => write!(f, "field `{name}` must not be null"),
            Self::ReadOnly(name) => write!(f, "field `{name}` is read-only"),
        }
    }
}

impl Error for FieldError {}

/// Record construction failures raised before validation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// Required field has no value and no default.
    MissingField(&'static str),
    InvalidField(FieldError),
    /// Record identity must not be the nil UUID.
    NilId,
}

impl Display for ConstructionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(name) => write!(f, "missing required field: {name}"),
            Self::InvalidField(err) => write!(f, "{err}"),
            Self::NilId => write!(f, "record id must not be nil"),
        }
    }
}

impl Error for ConstructionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidField(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FieldError> for ConstructionError {
    fn from(value: FieldError) -> Self {
        Self::InvalidField(value)
    }
}

/// A behavior or entity predicate rejected the field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Behavior name or entity type that declared the predicate.
    pub owner: String,
    /// Stable rule identifier, e.g. `latitude_range`.
    pub rule: &'static str,
    pub fields: Vec<&'static str>,
    pub message: String,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} failed on [{}]: {}",
            self.owner,
            self.rule,
            self.fields.join(", "),
            self.message
        )
    }
}

impl Error for ValidationError {}

/// Umbrella error for record operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    Construction(ConstructionError),
    Field(FieldError),
    Validation(ValidationError),
}

pub type RecordResult<T> = Result<T, RecordError>;

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Construction(err) => write!(f, "construction failed: {err}"),
            Self::Field(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "validation failed: {err}"),
        }
    }
}

impl Error for RecordError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Construction(err) => Some(err),
            Self::Field(err) => Some(err),
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<ConstructionError> for RecordError {
    fn from(value: ConstructionError) -> Self {
        Self::Construction(value)
    }
}

impl From<FieldError> for RecordError {
    fn from(value: FieldError) -> Self {
        Self::Field(value)
    }
}

impl From<ValidationError> for RecordError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{CompositionError, FieldError, RecordError, ValidationError};
    use crate::model::value::FieldType;
    use std::error::Error;

    #[test]
    fn collision_message_names_both_owners() {
        let err = CompositionError::FieldCollision {
            field: "status",
            first_owner: "workflow".to_string(),
            second_owner: "moderated".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "field `status` declared by both `workflow` and `moderated`"
        );
    }

    #[test]
    fn validation_message_lists_rule_and_fields() {
        let err = ValidationError {
            owner: "locatable".to_string(),
            rule: "latitude_range",
            fields: vec!["latitude"],
            message: "latitude 91 outside [-90, 90]".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "locatable.latitude_range failed on [latitude]: latitude 91 outside [-90, 90]"
        );
    }

    #[test]
    fn record_error_exposes_source() {
        let err = RecordError::from(FieldError::TypeMismatch {
            field: "title".to_string(),
            expected: FieldType::Text,
            found: "integer",
        });
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "field `title` expects text, got integer");
    }
}

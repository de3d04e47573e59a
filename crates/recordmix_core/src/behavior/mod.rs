//! Composable record behaviors.
//!
//! # Responsibility
//! - Describe a behavior as pure metadata: fields, validators, derived
//!   properties and mutation hooks.
//! - Provide the built-in behaviors and their typed read-only views.
//!
//! # Invariants
//! - A behavior's validators, derived properties and hooks read and write
//!   only the fields the same behavior declares.
//! - Derived properties are pure functions of field values and `now`.

pub mod annotatable;
pub mod authored;
pub mod expirable;
pub mod locatable;
pub mod permalinkable;
pub mod publishable;
pub mod timestamped;

use crate::clock::Timestamp;
use crate::model::field::FieldSpec;
use crate::model::value::{FieldValue, FieldValues};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use uuid::Uuid;

type CheckFn = dyn Fn(&FieldValues) -> Result<(), String> + Send + Sync;

/// Named predicate over field values.
///
/// The owner (behavior name or entity type) is attached when the schema is
/// composed, so the same validator can be declared without knowing its host.
#[derive(Clone)]
pub struct Validator {
    pub rule: &'static str,
    pub fields: Vec<&'static str>,
    check: Arc<CheckFn>,
}

impl Validator {
    pub fn new(
        rule: &'static str,
        fields: &[&'static str],
        check: impl Fn(&FieldValues) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            rule,
            fields: fields.to_vec(),
            check: Arc::new(check),
        }
    }

    /// Runs the predicate; `Err` carries a human-readable reason.
    pub fn check(&self, values: &FieldValues) -> Result<(), String> {
        (self.check)(values)
    }
}

impl Debug for Validator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("rule", &self.rule)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Read-only value computed from field state.
#[derive(Clone, Copy)]
pub struct DerivedProperty {
    pub name: &'static str,
    compute: fn(&FieldValues, Timestamp) -> FieldValue,
}

impl DerivedProperty {
    pub fn new(name: &'static str, compute: fn(&FieldValues, Timestamp) -> FieldValue) -> Self {
        Self { name, compute }
    }

    pub fn compute(&self, values: &FieldValues, now: Timestamp) -> FieldValue {
        (self.compute)(values, now)
    }
}

impl Debug for DerivedProperty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DerivedProperty").field(&self.name).finish()
    }
}

/// Transformation applied to staged values on every record mutation,
/// before validation.
#[derive(Clone, Copy)]
pub struct MutationHook {
    pub name: &'static str,
    apply: fn(&mut FieldValues, Timestamp),
}

impl MutationHook {
    pub fn new(name: &'static str, apply: fn(&mut FieldValues, Timestamp)) -> Self {
        Self { name, apply }
    }

    pub fn apply(&self, values: &mut FieldValues, now: Timestamp) {
        (self.apply)(values, now)
    }
}

impl Debug for MutationHook {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MutationHook").field(&self.name).finish()
    }
}

/// Declarative description of one behavior.
#[derive(Debug, Clone)]
pub struct BehaviorSpec {
    pub name: &'static str,
    pub fields: Vec<FieldSpec>,
    pub validators: Vec<Validator>,
    pub derived: Vec<DerivedProperty>,
    pub hooks: Vec<MutationHook>,
}

impl BehaviorSpec {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            validators: Vec::new(),
            derived: Vec::new(),
            hooks: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn derived(
        mut self,
        name: &'static str,
        compute: fn(&FieldValues, Timestamp) -> FieldValue,
    ) -> Self {
        self.derived.push(DerivedProperty::new(name, compute));
        self
    }

    pub fn hook(mut self, name: &'static str, apply: fn(&mut FieldValues, Timestamp)) -> Self {
        self.hooks.push(MutationHook::new(name, apply));
        self
    }
}

/// Compile-time handle for a behavior.
pub trait Behavior {
    /// Stable snake_case name, unique among behaviors.
    const NAME: &'static str;

    fn spec() -> BehaviorSpec;
}

/// Typed read-only view of one behavior's fields on a record.
///
/// Obtained through `Record::view`, which returns `None` when the record's
/// schema does not compose the behavior.
pub trait BehaviorView<'a>: Sized {
    type Behavior: Behavior;

    fn from_values(values: &'a FieldValues) -> Self;
}

pub(crate) fn read_timestamp(values: &FieldValues, field: &str) -> Option<Timestamp> {
    values.get(field).and_then(FieldValue::as_timestamp)
}

pub(crate) fn read_float(values: &FieldValues, field: &str) -> Option<f64> {
    values.get(field).and_then(FieldValue::as_float)
}

pub(crate) fn read_bool(values: &FieldValues, field: &str) -> bool {
    values
        .get(field)
        .and_then(FieldValue::as_bool)
        .unwrap_or(false)
}

pub(crate) fn read_text<'a>(values: &'a FieldValues, field: &str) -> &'a str {
    values
        .get(field)
        .and_then(FieldValue::as_text)
        .unwrap_or_default()
}

pub(crate) fn read_ids<'a>(values: &'a FieldValues, field: &str) -> &'a [Uuid] {
    values
        .get(field)
        .and_then(FieldValue::as_id_list)
        .unwrap_or_default()
}

/// Single-field change set, ready for `Record::apply`.
pub(crate) fn change(field: &'static str, value: impl Into<FieldValue>) -> FieldValues {
    FieldValues::from([(field.to_string(), value.into())])
}

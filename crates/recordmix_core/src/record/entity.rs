//! Composed entity instances.
//!
//! # Responsibility
//! - Construct records from supplied values plus field defaults.
//! - Apply mutations atomically: stage, run hooks, validate, then commit.
//! - End the record lifecycle with an explicit, consuming delete.
//!
//! # Invariants
//! - A live `Record` always satisfies every validator of its schema.
//! - A rejected mutation leaves every field unchanged.
//! - `id` is never nil and never changes.

use crate::behavior::{Behavior, BehaviorView};
use crate::clock::{Clock, Timestamp};
use crate::error::{ConstructionError, FieldError, RecordResult, ValidationError};
use crate::model::field::FieldSpec;
use crate::model::value::{FieldValue, FieldValues};
use crate::schema::Schema;
use log::{debug, info};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Opaque record identity.
pub type RecordId = Uuid;

/// One composed entity.
#[derive(Debug, Clone)]
pub struct Record {
    id: RecordId,
    schema: Arc<Schema>,
    values: FieldValues,
}

/// Terminal result of deleting a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tombstone {
    pub id: RecordId,
    pub entity_type: String,
    pub deleted_at: Timestamp,
}

impl Record {
    /// Starts a draft for `schema`; `RecordDraft::create` finishes it.
    pub fn draft(schema: &Arc<Schema>) -> RecordDraft {
        RecordDraft {
            schema: Arc::clone(schema),
            id: None,
            values: FieldValues::new(),
        }
    }

    /// Creates a record with a generated id.
    pub fn create(
        schema: &Arc<Schema>,
        values: FieldValues,
        clock: &dyn Clock,
    ) -> RecordResult<Self> {
        Self::create_with_id(schema, Uuid::new_v4(), values, clock)
    }

    /// Creates a record with a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally.
    /// Values supplied for read-only fields are accepted here.
    pub fn create_with_id(
        schema: &Arc<Schema>,
        id: RecordId,
        mut supplied: FieldValues,
        clock: &dyn Clock,
    ) -> RecordResult<Self> {
        if id.is_nil() {
            return Err(ConstructionError::NilId.into());
        }

        for (name, value) in &supplied {
            let spec = schema
                .field(name)
                .ok_or_else(|| FieldError::UnknownField(name.clone()))
                .map_err(ConstructionError::from)?;
            check_value(spec, value).map_err(ConstructionError::from)?;
        }

        let now = clock.now();
        let mut values = FieldValues::new();
        for spec in schema.fields() {
            let value = match supplied.remove(spec.name) {
                Some(value) => value,
                None => spec
                    .initial_value(now)
                    .ok_or(ConstructionError::MissingField(spec.name))?,
            };
            values.insert(spec.name.to_string(), value);
        }

        if let Err(err) = schema.validate(&values) {
            debug!(
                "event=record_create module=record status=error entity_type={} rule={}.{}",
                schema.entity_type(),
                err.owner,
                err.rule
            );
            return Err(err.into());
        }

        debug!(
            "event=record_create module=record status=ok entity_type={} id={}",
            schema.entity_type(),
            id
        );
        Ok(Self {
            id,
            schema: Arc::clone(schema),
            values,
        })
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn entity_type(&self) -> &str {
        self.schema.entity_type()
    }

    /// Composed behavior names in declaration order.
    pub fn behaviors(&self) -> &[&'static str] {
        self.schema.behaviors()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// All field values, keyed by field name.
    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    /// Typed view for one behavior, `None` when the schema lacks it.
    pub fn view<'a, V: BehaviorView<'a>>(&'a self) -> Option<V> {
        self.schema
            .has_behavior(<V::Behavior as Behavior>::NAME)
            .then(|| V::from_values(&self.values))
    }

    /// Every derived property of every composed behavior at `now`.
    pub fn derived(&self, now: Timestamp) -> BTreeMap<&'static str, FieldValue> {
        self.schema.derived(&self.values, now)
    }

    /// Re-runs validation. Has no side effects.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.schema.validate(&self.values)
    }

    /// Sets one field. See `apply`.
    pub fn set(
        &mut self,
        field: &str,
        value: impl Into<FieldValue>,
        clock: &dyn Clock,
    ) -> RecordResult<()> {
        self.apply(
            FieldValues::from([(field.to_string(), value.into())]),
            clock,
        )
    }

    /// Applies `changes` atomically.
    ///
    /// Behavior hooks run on the staged values before validation; on any
    /// error the record is left exactly as it was. An empty change set is a
    /// no-op.
    pub fn apply(&mut self, changes: FieldValues, clock: &dyn Clock) -> RecordResult<()> {
        if changes.is_empty() {
            return Ok(());
        }
        let staged = self.stage(changes, clock)?;
        self.commit(staged);
        Ok(())
    }

    pub(crate) fn commit(&mut self, staged: FieldValues) {
        self.values = staged;
    }

    /// Produces the values `apply` would commit, without committing them.
    pub(crate) fn stage(
        &self,
        changes: FieldValues,
        clock: &dyn Clock,
    ) -> RecordResult<FieldValues> {
        let mut staged = self.values.clone();
        for (name, value) in changes {
            let spec = self
                .schema
                .field(name.as_str())
                .ok_or_else(|| FieldError::UnknownField(name.clone()))?;
            if !spec.editable {
                return Err(FieldError::ReadOnly(name).into());
            }
            check_value(spec, &value)?;
            staged.insert(name, value);
        }

        self.schema.apply_hooks(&mut staged, clock.now());

        if let Err(err) = self.schema.validate(&staged) {
            debug!(
                "event=record_update module=record status=rejected entity_type={} id={} rule={}.{}",
                self.entity_type(),
                self.id,
                err.owner,
                err.rule
            );
            return Err(err.into());
        }
        Ok(staged)
    }

    /// Ends the record lifecycle.
    pub fn delete(self, clock: &dyn Clock) -> Tombstone {
        let tombstone = Tombstone {
            id: self.id,
            entity_type: self.schema.entity_type().to_string(),
            deleted_at: clock.now(),
        };
        info!(
            "event=record_delete module=record status=ok entity_type={} id={}",
            tombstone.entity_type, tombstone.id
        );
        tombstone
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.schema.entity_type() == other.schema.entity_type()
            && self.values == other.values
    }
}

#[derive(Serialize)]
struct RecordWire<'a> {
    id: RecordId,
    entity_type: &'a str,
    behaviors: &'a [&'static str],
    fields: &'a FieldValues,
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RecordWire {
            id: self.id,
            entity_type: self.schema.entity_type(),
            behaviors: self.schema.behaviors(),
            fields: &self.values,
        }
        .serialize(serializer)
    }
}

/// Fluent constructor input for one record.
#[derive(Debug, Clone)]
pub struct RecordDraft {
    schema: Arc<Schema>,
    id: Option<RecordId>,
    values: FieldValues,
}

impl RecordDraft {
    pub fn id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.values.insert(field.to_string(), value.into());
        self
    }

    pub fn create(self, clock: &dyn Clock) -> RecordResult<Record> {
        let id = self.id.unwrap_or_else(Uuid::new_v4);
        Record::create_with_id(&self.schema, id, self.values, clock)
    }
}

fn check_value(spec: &FieldSpec, value: &FieldValue) -> Result<(), FieldError> {
    if spec.accepts(value) {
        return Ok(());
    }
    if value.is_null() {
        return Err(FieldError::NullNotAllowed(spec.name.to_string()));
    }
    Err(FieldError::TypeMismatch {
        field: spec.name.to_string(),
        expected: spec.field_type,
        found: value.type_name(),
    })
}

//! Record store contract and in-memory implementation.
//!
//! # Responsibility
//! - Hold records of one entity type keyed by id.
//! - Enforce unique fields (e.g. `slug`) across the stored records.
//!
//! # Invariants
//! - Every stored record uses the collection's schema.
//! - Non-null values of `unique` fields never repeat across records.
//! - Updates go through `Record` staging, so a rejected update changes
//!   nothing.

use crate::clock::Clock;
use crate::error::RecordError;
use crate::model::value::{FieldValue, FieldValues};
use crate::record::entity::{Record, RecordId, Tombstone};
use crate::schema::Schema;
use log::debug;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type CollectionResult<T> = Result<T, CollectionError>;

/// Store-level failures.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionError {
    SchemaMismatch {
        expected: String,
        found: String,
    },
    DuplicateId(RecordId),
    UniqueViolation {
        field: &'static str,
        value: FieldValue,
    },
    NotFound(RecordId),
    Record(RecordError),
}

impl Display for CollectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SchemaMismatch { expected, found } => write!(
                f,
                "record of type `{found}` does not belong in `{expected}` collection"
            ),
            Self::DuplicateId(id) => write!(f, "record id already stored: {id}"),
            Self::UniqueViolation { field, value } => {
                write!(f, "value {value:?} already used for unique field `{field}`")
            }
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::Record(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CollectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Record(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordError> for CollectionError {
    fn from(value: RecordError) -> Self {
        Self::Record(value)
    }
}

/// Storage contract for records of one entity type.
///
/// Real persistence backends live outside this crate; they map
/// `Schema::fields()` to their own columns and implement this trait.
pub trait RecordStore {
    fn insert(&mut self, record: Record) -> CollectionResult<RecordId>;
    fn get(&self, id: RecordId) -> Option<&Record>;
    fn update(
        &mut self,
        id: RecordId,
        changes: FieldValues,
        clock: &dyn Clock,
    ) -> CollectionResult<&Record>;
    fn remove(&mut self, id: RecordId, clock: &dyn Clock) -> CollectionResult<Tombstone>;
}

/// In-memory store ordered by record id.
#[derive(Debug, Clone)]
pub struct RecordCollection {
    schema: Arc<Schema>,
    records: BTreeMap<RecordId, Record>,
}

impl RecordCollection {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            records: BTreeMap::new(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// First record whose `field` equals `value`, in id order.
    pub fn find_by(&self, field: &str, value: &FieldValue) -> Option<&Record> {
        self.records
            .values()
            .find(|record| record.get(field) == Some(value))
    }

    fn check_unique(&self, candidate: RecordId, values: &FieldValues) -> CollectionResult<()> {
        for spec in self.schema.fields().iter().filter(|spec| spec.unique) {
            let Some(value) = values.get(spec.name) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let taken = self
                .records
                .values()
                .any(|other| other.id() != candidate && other.get(spec.name) == Some(value));
            if taken {
                return Err(CollectionError::UniqueViolation {
                    field: spec.name,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

impl RecordStore for RecordCollection {
    fn insert(&mut self, record: Record) -> CollectionResult<RecordId> {
        if record.entity_type() != self.schema.entity_type() {
            return Err(CollectionError::SchemaMismatch {
                expected: self.schema.entity_type().to_string(),
                found: record.entity_type().to_string(),
            });
        }
        let id = record.id();
        if self.records.contains_key(&id) {
            return Err(CollectionError::DuplicateId(id));
        }
        self.check_unique(id, record.values())?;

        self.records.insert(id, record);
        debug!(
            "event=collection_insert module=collection status=ok entity_type={} id={} size={}",
            self.schema.entity_type(),
            id,
            self.records.len()
        );
        Ok(id)
    }

    fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(&id)
    }

    fn update(
        &mut self,
        id: RecordId,
        changes: FieldValues,
        clock: &dyn Clock,
    ) -> CollectionResult<&Record> {
        let current = self.records.get(&id).ok_or(CollectionError::NotFound(id))?;
        let staged = current.stage(changes, clock)?;
        self.check_unique(id, &staged)?;

        let record = self
            .records
            .get_mut(&id)
            .ok_or(CollectionError::NotFound(id))?;
        record.commit(staged);
        Ok(&*record)
    }

    fn remove(&mut self, id: RecordId, clock: &dyn Clock) -> CollectionResult<Tombstone> {
        let record = self.records.remove(&id).ok_or(CollectionError::NotFound(id))?;
        Ok(record.delete(clock))
    }
}

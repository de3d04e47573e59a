//! Creation and modification timestamps.
//!
//! # Invariants
//! - `modified_at >= created_at`.
//! - Every committed mutation sets `modified_at` to the mutation time.

use crate::behavior::{read_timestamp, Behavior, BehaviorSpec, BehaviorView, Validator};
use crate::clock::Timestamp;
use crate::model::field::FieldSpec;
use crate::model::value::{FieldValue, FieldValues};

pub const CREATED_AT: &str = "created_at";
pub const MODIFIED_AT: &str = "modified_at";

pub struct Timestamped;

impl Behavior for Timestamped {
    const NAME: &'static str = "timestamped";

    fn spec() -> BehaviorSpec {
        BehaviorSpec::new(Self::NAME)
            .field(FieldSpec::timestamp(CREATED_AT).default_now().read_only())
            .field(FieldSpec::timestamp(MODIFIED_AT).default_now().read_only())
            .validator(Validator::new(
                "modified_not_before_created",
                &[CREATED_AT, MODIFIED_AT],
                check_order,
            ))
            .derived("age", |values, now| {
                age(values, now).map_or(FieldValue::Null, FieldValue::Integer)
            })
            .hook("touch_modified_at", touch)
    }
}

fn check_order(values: &FieldValues) -> Result<(), String> {
    match (
        read_timestamp(values, CREATED_AT),
        read_timestamp(values, MODIFIED_AT),
    ) {
        (Some(created), Some(modified)) if modified < created => Err(format!(
            "modified_at ({modified}) must be >= created_at ({created})"
        )),
        _ => Ok(()),
    }
}

fn age(values: &FieldValues, now: Timestamp) -> Option<i64> {
    read_timestamp(values, CREATED_AT).map(|created| now.saturating_sub(created))
}

fn touch(values: &mut FieldValues, now: Timestamp) {
    values.insert(MODIFIED_AT.to_string(), FieldValue::Timestamp(now));
}

/// Typed view over timestamp fields.
#[derive(Debug, Clone, Copy)]
pub struct TimestampedView<'a> {
    values: &'a FieldValues,
}

impl<'a> BehaviorView<'a> for TimestampedView<'a> {
    type Behavior = Timestamped;

    fn from_values(values: &'a FieldValues) -> Self {
        Self { values }
    }
}

impl TimestampedView<'_> {
    pub fn created_at(&self) -> Timestamp {
        read_timestamp(self.values, CREATED_AT).unwrap_or_default()
    }

    pub fn modified_at(&self) -> Timestamp {
        read_timestamp(self.values, MODIFIED_AT).unwrap_or_default()
    }

    /// Milliseconds elapsed since creation, saturating at the `i64` bounds.
    pub fn age(&self, now: Timestamp) -> i64 {
        age(self.values, now).unwrap_or_default()
    }
}

//! Expiration driven by `expires_at`.

use crate::behavior::{change, read_timestamp, Behavior, BehaviorSpec, BehaviorView};
use crate::clock::Timestamp;
use crate::model::field::FieldSpec;
use crate::model::value::{FieldValue, FieldValues};

pub const EXPIRES_AT: &str = "expires_at";

pub struct Expirable;

impl Behavior for Expirable {
    const NAME: &'static str = "expirable";

    fn spec() -> BehaviorSpec {
        BehaviorSpec::new(Self::NAME)
            .field(FieldSpec::timestamp(EXPIRES_AT).nullable())
            .derived("is_expired", |values, now| {
                FieldValue::Bool(is_expired(values, now))
            })
    }
}

impl Expirable {
    /// Change set expiring the record at `at`.
    pub fn expire(at: Timestamp) -> FieldValues {
        change(EXPIRES_AT, FieldValue::Timestamp(at))
    }
}

fn is_expired(values: &FieldValues, now: Timestamp) -> bool {
    read_timestamp(values, EXPIRES_AT).is_some_and(|expires_at| expires_at <= now)
}

/// Typed view over expiration state.
#[derive(Debug, Clone, Copy)]
pub struct ExpirableView<'a> {
    values: &'a FieldValues,
}

impl<'a> BehaviorView<'a> for ExpirableView<'a> {
    type Behavior = Expirable;

    fn from_values(values: &'a FieldValues) -> Self {
        Self { values }
    }
}

impl ExpirableView<'_> {
    pub fn expires_at(&self) -> Option<Timestamp> {
        read_timestamp(self.values, EXPIRES_AT)
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        is_expired(self.values, now)
    }

    /// Remaining milliseconds, `None` when the record never expires.
    /// Zero once expired.
    pub fn time_until_expiry(&self, now: Timestamp) -> Option<i64> {
        self.expires_at()
            .map(|expires_at| expires_at.saturating_sub(now).max(0))
    }
}

//! Publishing workflow driven by `published_at`.

use crate::behavior::{change, read_timestamp, Behavior, BehaviorSpec, BehaviorView};
use crate::clock::Timestamp;
use crate::model::field::FieldSpec;
use crate::model::value::{FieldValue, FieldValues};

pub const PUBLISHED_AT: &str = "published_at";

pub struct Publishable;

impl Behavior for Publishable {
    const NAME: &'static str = "publishable";

    fn spec() -> BehaviorSpec {
        BehaviorSpec::new(Self::NAME)
            .field(FieldSpec::timestamp(PUBLISHED_AT).nullable())
            .derived("is_published", |values, now| {
                FieldValue::Bool(is_published(values, now))
            })
    }
}

impl Publishable {
    /// Change set publishing the record at `at`.
    pub fn publish(at: Timestamp) -> FieldValues {
        change(PUBLISHED_AT, FieldValue::Timestamp(at))
    }

    /// Change set withdrawing publication.
    pub fn unpublish() -> FieldValues {
        change(PUBLISHED_AT, FieldValue::Null)
    }
}

fn is_published(values: &FieldValues, now: Timestamp) -> bool {
    read_timestamp(values, PUBLISHED_AT).is_some_and(|published_at| published_at <= now)
}

/// Typed view over publication state.
#[derive(Debug, Clone, Copy)]
pub struct PublishableView<'a> {
    values: &'a FieldValues,
}

impl<'a> BehaviorView<'a> for PublishableView<'a> {
    type Behavior = Publishable;

    fn from_values(values: &'a FieldValues) -> Self {
        Self { values }
    }
}

impl PublishableView<'_> {
    pub fn published_at(&self) -> Option<Timestamp> {
        read_timestamp(self.values, PUBLISHED_AT)
    }

    /// `true` once `published_at` is set and not in the future.
    pub fn is_published(&self, now: Timestamp) -> bool {
        is_published(self.values, now)
    }
}

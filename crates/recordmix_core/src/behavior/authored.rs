//! Authorship with optional anonymity.

use crate::behavior::{read_bool, read_timestamp, Behavior, BehaviorSpec, BehaviorView, Validator};
use crate::clock::Timestamp;
use crate::model::field::FieldSpec;
use crate::model::value::{EntityRef, FieldValue, FieldValues};

pub const AUTHOR: &str = "author";
pub const AUTHORED_AT: &str = "authored_at";
pub const IS_AUTHOR_ANONYMOUS: &str = "is_author_anonymous";

/// Label shown instead of the author's name for anonymous records.
pub const ANONYMOUS_LABEL: &str = "Anonymous";

pub struct Authored;

impl Behavior for Authored {
    const NAME: &'static str = "authored";

    fn spec() -> BehaviorSpec {
        BehaviorSpec::new(Self::NAME)
            .field(FieldSpec::reference(AUTHOR).nullable())
            .field(FieldSpec::timestamp(AUTHORED_AT).default_now())
            .field(FieldSpec::bool(IS_AUTHOR_ANONYMOUS).default_value(false))
            .validator(Validator::new(
                "author_required_unless_anonymous",
                &[AUTHOR, IS_AUTHOR_ANONYMOUS],
                check_author,
            ))
            .derived("display_author", |values, _| {
                FieldValue::Text(display_author(values).to_string())
            })
    }
}

fn author(values: &FieldValues) -> Option<&EntityRef> {
    values.get(AUTHOR).and_then(FieldValue::as_reference)
}

fn check_author(values: &FieldValues) -> Result<(), String> {
    if read_bool(values, IS_AUTHOR_ANONYMOUS) || author(values).is_some() {
        return Ok(());
    }
    Err("author must be set unless the record is anonymous".to_string())
}

fn display_author(values: &FieldValues) -> &str {
    if read_bool(values, IS_AUTHOR_ANONYMOUS) {
        return ANONYMOUS_LABEL;
    }
    author(values).map_or(ANONYMOUS_LABEL, |author| author.label.as_str())
}

/// Typed view over authorship fields.
#[derive(Debug, Clone, Copy)]
pub struct AuthoredView<'a> {
    values: &'a FieldValues,
}

impl<'a> BehaviorView<'a> for AuthoredView<'a> {
    type Behavior = Authored;

    fn from_values(values: &'a FieldValues) -> Self {
        Self { values }
    }
}

impl<'a> AuthoredView<'a> {
    pub fn author(&self) -> Option<&'a EntityRef> {
        author(self.values)
    }

    pub fn authored_at(&self) -> Timestamp {
        read_timestamp(self.values, AUTHORED_AT).unwrap_or_default()
    }

    pub fn is_author_anonymous(&self) -> bool {
        read_bool(self.values, IS_AUTHOR_ANONYMOUS)
    }

    /// Author label, or `Anonymous` when the record hides its author.
    pub fn display_author(&self) -> &'a str {
        display_author(self.values)
    }
}

//! URL slug and permalink path.
//!
//! # Invariants
//! - `slug` matches `^[a-z0-9]+(?:-[a-z0-9]+)*$`.
//! - `slug` is unique among records of one entity type (enforced by
//!   `RecordCollection`).

use crate::behavior::{read_text, Behavior, BehaviorSpec, BehaviorView, Validator};
use crate::model::field::FieldSpec;
use crate::model::value::{FieldValue, FieldValues};
use once_cell::sync::Lazy;
use regex::Regex;

pub const SLUG: &str = "slug";

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));
static NON_SLUG_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug separator regex"));

pub struct Permalinkable;

impl Behavior for Permalinkable {
    const NAME: &'static str = "permalinkable";

    fn spec() -> BehaviorSpec {
        BehaviorSpec::new(Self::NAME)
            .field(FieldSpec::text(SLUG).unique())
            .validator(Validator::new("slug_format", &[SLUG], check_slug))
            .derived("permalink_path", |values, _| {
                FieldValue::Text(permalink_path(read_text(values, SLUG)))
            })
    }
}

/// Derives a URL-safe slug from free text.
///
/// Returns an empty string when `text` has no ASCII alphanumerics.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    NON_SLUG_RUN_RE
        .replace_all(lowered.as_str(), "-")
        .trim_matches('-')
        .to_string()
}

pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}

fn check_slug(values: &FieldValues) -> Result<(), String> {
    let slug = read_text(values, SLUG);
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err(format!("slug `{slug}` is not URL-safe"))
    }
}

fn permalink_path(slug: &str) -> String {
    format!("/{slug}/")
}

/// Typed view over the slug.
#[derive(Debug, Clone, Copy)]
pub struct PermalinkableView<'a> {
    values: &'a FieldValues,
}

impl<'a> BehaviorView<'a> for PermalinkableView<'a> {
    type Behavior = Permalinkable;

    fn from_values(values: &'a FieldValues) -> Self {
        Self { values }
    }
}

impl<'a> PermalinkableView<'a> {
    pub fn slug(&self) -> &'a str {
        read_text(self.values, SLUG)
    }

    pub fn permalink_path(&self) -> String {
        permalink_path(self.slug())
    }
}

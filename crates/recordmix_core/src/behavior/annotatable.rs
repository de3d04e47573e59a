//! Ordered free-form note references.

use crate::behavior::{change, read_ids, Behavior, BehaviorSpec, BehaviorView, Validator};
use crate::model::field::FieldSpec;
use crate::model::value::{FieldValue, FieldValues};
use std::collections::BTreeSet;
use uuid::Uuid;

pub const NOTES: &str = "notes";

pub struct Annotatable;

impl Behavior for Annotatable {
    const NAME: &'static str = "annotatable";

    fn spec() -> BehaviorSpec {
        BehaviorSpec::new(Self::NAME)
            .field(FieldSpec::id_list(NOTES).default_value(Vec::<Uuid>::new()))
            .validator(Validator::new("notes_unique", &[NOTES], check_unique))
            .derived("note_count", |values, _| {
                FieldValue::Integer(read_ids(values, NOTES).len() as i64)
            })
    }
}

fn check_unique(values: &FieldValues) -> Result<(), String> {
    let mut seen = BTreeSet::new();
    for note in read_ids(values, NOTES) {
        if !seen.insert(note) {
            return Err(format!("note {note} attached twice"));
        }
    }
    Ok(())
}

/// Typed view over attached notes.
#[derive(Debug, Clone, Copy)]
pub struct AnnotatableView<'a> {
    values: &'a FieldValues,
}

impl<'a> BehaviorView<'a> for AnnotatableView<'a> {
    type Behavior = Annotatable;

    fn from_values(values: &'a FieldValues) -> Self {
        Self { values }
    }
}

impl<'a> AnnotatableView<'a> {
    pub fn notes(&self) -> &'a [Uuid] {
        read_ids(self.values, NOTES)
    }

    pub fn note_count(&self) -> usize {
        self.notes().len()
    }

    /// Change set appending `note`. Attaching an already attached note is
    /// left to validation to reject.
    pub fn add_note(&self, note: Uuid) -> FieldValues {
        let mut notes = self.notes().to_vec();
        notes.push(note);
        change(NOTES, notes)
    }

    /// Change set detaching `note`; unchanged list when absent.
    pub fn remove_note(&self, note: Uuid) -> FieldValues {
        let notes: Vec<Uuid> = self
            .notes()
            .iter()
            .copied()
            .filter(|existing| *existing != note)
            .collect();
        change(NOTES, notes)
    }
}

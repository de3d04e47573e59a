//! Composition of behaviors and entity-own fields into one schema.
//!
//! # Responsibility
//! - Flatten behavior fields and entity fields into one ordered field list.
//! - Order validators: behaviors in declaration order, entity validators last.
//! - Reject field collisions and malformed names at build time.
//!
//! # Invariants
//! - A built `Schema` never contains two fields with the same name.
//! - The set of flattened fields does not depend on behavior order; only the
//!   listing order and validator order do.
//! - Validation is fail-fast: the first failing validator is reported.

use crate::behavior::{Behavior, BehaviorSpec, DerivedProperty, MutationHook, Validator};
use crate::clock::Timestamp;
use crate::error::{CompositionError, ValidationError};
use crate::model::field::FieldSpec;
use crate::model::value::{FieldValue, FieldValues};
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

/// Name reserved for record identity.
pub const ID_FIELD: &str = "id";

#[derive(Debug, Clone)]
struct OwnedValidator {
    owner: String,
    validator: Validator,
}

/// Flattened, immutable description of one entity type.
#[derive(Debug, Clone)]
pub struct Schema {
    entity_type: String,
    behaviors: Vec<&'static str>,
    fields: Vec<FieldSpec>,
    owners: BTreeMap<&'static str, String>,
    validators: Vec<OwnedValidator>,
    derived: Vec<DerivedProperty>,
    hooks: Vec<MutationHook>,
}

impl Schema {
    pub fn builder(entity_type: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(entity_type)
    }

    pub fn entity_type(&self) -> &str {
        self.entity_type.as_str()
    }

    /// Composed behavior names in declaration order.
    pub fn behaviors(&self) -> &[&'static str] {
        &self.behaviors
    }

    pub fn has_behavior(&self, name: &str) -> bool {
        self.behaviors.iter().any(|behavior| *behavior == name)
    }

    /// Flattened field list: behavior fields first, entity fields last.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Behavior name or entity type that declared `name`.
    pub fn field_owner(&self, name: &str) -> Option<&str> {
        self.owners.get(name).map(String::as_str)
    }

    /// `(owner, rule)` pairs in execution order.
    pub fn validator_order(&self) -> Vec<(&str, &'static str)> {
        self.validators
            .iter()
            .map(|entry| (entry.owner.as_str(), entry.validator.rule))
            .collect()
    }

    /// Runs validators in order and stops at the first failure.
    pub fn validate(&self, values: &FieldValues) -> Result<(), ValidationError> {
        for entry in &self.validators {
            if let Err(message) = entry.validator.check(values) {
                return Err(ValidationError {
                    owner: entry.owner.clone(),
                    rule: entry.validator.rule,
                    fields: entry.validator.fields.clone(),
                    message,
                });
            }
        }
        Ok(())
    }

    /// Computes every derived property of every composed behavior.
    pub fn derived(
        &self,
        values: &FieldValues,
        now: Timestamp,
    ) -> BTreeMap<&'static str, FieldValue> {
        self.derived
            .iter()
            .map(|property| (property.name, property.compute(values, now)))
            .collect()
    }

    pub(crate) fn apply_hooks(&self, values: &mut FieldValues, now: Timestamp) {
        for hook in &self.hooks {
            hook.apply(values, now);
        }
    }
}

/// Collects declarations for one entity type; `build` applies the
/// composition rule.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    entity_type: String,
    behaviors: Vec<BehaviorSpec>,
    fields: Vec<FieldSpec>,
    validators: Vec<Validator>,
}

impl SchemaBuilder {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            behaviors: Vec::new(),
            fields: Vec::new(),
            validators: Vec::new(),
        }
    }

    /// Composes a built-in or custom behavior type.
    pub fn behavior<B: Behavior>(self) -> Self {
        self.behavior_spec(B::spec())
    }

    /// Composes a behavior described at runtime.
    pub fn behavior_spec(mut self, spec: BehaviorSpec) -> Self {
        self.behaviors.push(spec);
        self
    }

    /// Declares an entity-own field.
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Declares an entity-specific validator; runs after behavior validators.
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn build(self) -> Result<Schema, CompositionError> {
        let entity_type = self.entity_type.clone();
        let result = compose(self);
        match &result {
            Ok(schema) => debug!(
                "event=schema_compose module=schema status=ok entity_type={} behaviors={} fields={}",
                schema.entity_type,
                schema.behaviors.join("+"),
                schema.fields.len()
            ),
            Err(err) => warn!(
                "event=schema_compose module=schema status=error entity_type={} error={}",
                entity_type, err
            ),
        }
        result
    }
}

fn compose(builder: SchemaBuilder) -> Result<Schema, CompositionError> {
    let SchemaBuilder {
        entity_type,
        behaviors,
        fields: own_fields,
        validators: own_validators,
    } = builder;

    if !is_snake_case_identifier(entity_type.as_str()) {
        return Err(CompositionError::InvalidEntityType(entity_type));
    }

    let mut schema = Schema {
        entity_type,
        behaviors: Vec::with_capacity(behaviors.len()),
        fields: Vec::new(),
        owners: BTreeMap::new(),
        validators: Vec::new(),
        derived: Vec::new(),
        hooks: Vec::new(),
    };
    let mut derived_owners = BTreeMap::<&'static str, &'static str>::new();
    let mut seen_behaviors = BTreeSet::new();

    for behavior in behaviors {
        if !is_snake_case_identifier(behavior.name) {
            return Err(CompositionError::InvalidBehaviorName(behavior.name));
        }
        if !seen_behaviors.insert(behavior.name) {
            return Err(CompositionError::DuplicateBehavior(behavior.name));
        }

        for field in behavior.fields {
            add_field(&mut schema, field, behavior.name.to_string())?;
        }
        for property in behavior.derived {
            if let Some(first) = derived_owners.insert(property.name, behavior.name) {
                return Err(CompositionError::PropertyCollision {
                    property: property.name,
                    first_owner: first.to_string(),
                    second_owner: behavior.name.to_string(),
                });
            }
            schema.derived.push(property);
        }
        schema
            .validators
            .extend(behavior.validators.into_iter().map(|validator| OwnedValidator {
                owner: behavior.name.to_string(),
                validator,
            }));
        schema.hooks.extend(behavior.hooks);
        schema.behaviors.push(behavior.name);
    }

    for field in own_fields {
        let owner = schema.entity_type.clone();
        add_field(&mut schema, field, owner)?;
    }
    let owner = schema.entity_type.clone();
    schema
        .validators
        .extend(own_validators.into_iter().map(|validator| OwnedValidator {
            owner: owner.clone(),
            validator,
        }));

    Ok(schema)
}

fn add_field(schema: &mut Schema, field: FieldSpec, owner: String) -> Result<(), CompositionError> {
    if field.name == ID_FIELD {
        return Err(CompositionError::ReservedField(field.name));
    }
    if !is_snake_case_identifier(field.name) {
        return Err(CompositionError::InvalidFieldName(field.name));
    }
    if let Some(first_owner) = schema.owners.get(field.name) {
        return Err(CompositionError::FieldCollision {
            field: field.name,
            first_owner: first_owner.clone(),
            second_owner: owner,
        });
    }
    schema.owners.insert(field.name, owner);
    schema.fields.push(field);
    Ok(())
}

/// `[a-z][a-z0-9_]*` without doubled or trailing underscores.
pub(crate) fn is_snake_case_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }

    let mut prev_separator = false;
    for c in chars {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            prev_separator = false;
            continue;
        }
        if c == '_' {
            if prev_separator {
                return false;
            }
            prev_separator = true;
            continue;
        }
        return false;
    }
    !prev_separator
}

#[cfg(test)]
mod tests {
    use super::{is_snake_case_identifier, Schema};
    use crate::behavior::timestamped::Timestamped;
    use crate::behavior::{BehaviorSpec, Validator};
    use crate::error::CompositionError;
    use crate::model::field::FieldSpec;

    #[test]
    fn identifier_rules() {
        assert!(is_snake_case_identifier("todo"));
        assert!(is_snake_case_identifier("blog_post2"));
        assert!(!is_snake_case_identifier(""));
        assert!(!is_snake_case_identifier("Todo"));
        assert!(!is_snake_case_identifier("2fa"));
        assert!(!is_snake_case_identifier("a__b"));
        assert!(!is_snake_case_identifier("trailing_"));
        assert!(!is_snake_case_identifier("dotted.name"));
    }

    #[test]
    fn rejects_reserved_id_field() {
        let err = Schema::builder("todo")
            .field(FieldSpec::id("id"))
            .build()
            .expect_err("id is reserved");
        assert_eq!(err, CompositionError::ReservedField("id"));
    }

    #[test]
    fn rejects_invalid_entity_type() {
        let err = Schema::builder("Todo Item")
            .build()
            .expect_err("entity type must be snake_case");
        assert!(matches!(err, CompositionError::InvalidEntityType(_)));
    }

    #[test]
    fn rejects_duplicate_behavior() {
        let err = Schema::builder("todo")
            .behavior::<Timestamped>()
            .behavior::<Timestamped>()
            .build()
            .expect_err("duplicate behavior must fail");
        assert_eq!(err, CompositionError::DuplicateBehavior("timestamped"));
    }

    #[test]
    fn rejects_entity_field_shadowing_behavior_field() {
        let err = Schema::builder("todo")
            .behavior::<Timestamped>()
            .field(FieldSpec::timestamp("created_at"))
            .build()
            .expect_err("entity field must not shadow behavior field");
        assert_eq!(
            err,
            CompositionError::FieldCollision {
                field: "created_at",
                first_owner: "timestamped".to_string(),
                second_owner: "todo".to_string(),
            }
        );
    }

    #[test]
    fn records_field_owners_and_validator_order() {
        let schema = Schema::builder("todo")
            .behavior::<Timestamped>()
            .behavior_spec(
                BehaviorSpec::new("ranked")
                    .field(FieldSpec::integer("rank"))
                    .validator(Validator::new("rank_positive", &["rank"], |_| Ok(()))),
            )
            .field(FieldSpec::text("title"))
            .validator(Validator::new("title_present", &["title"], |_| Ok(())))
            .build()
            .expect("schema should compose");

        assert_eq!(schema.field_owner("created_at"), Some("timestamped"));
        assert_eq!(schema.field_owner("rank"), Some("ranked"));
        assert_eq!(schema.field_owner("title"), Some("todo"));
        assert_eq!(
            schema.validator_order(),
            vec![
                ("timestamped", "modified_not_before_created"),
                ("ranked", "rank_positive"),
                ("todo", "title_present"),
            ]
        );
    }
}

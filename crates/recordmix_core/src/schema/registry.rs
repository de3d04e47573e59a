//! Entity type registry.
//!
//! # Responsibility
//! - Map entity types to composed schemas.
//! - Index entity types by the behaviors they compose.
//!
//! # Invariants
//! - One schema per entity type.
//! - The registry is an explicit value owned by the caller.

use crate::error::CompositionError;
use crate::schema::catalog;
use crate::schema::{Schema, SchemaBuilder};
use log::info;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Registration and lookup errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    Composition(CompositionError),
    DuplicateEntityType(String),
    UnknownEntityType(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Composition(err) => write!(f, "invalid schema: {err}"),
            Self::DuplicateEntityType(value) => {
                write!(f, "entity type already registered: {value}")
            }
            Self::UnknownEntityType(value) => write!(f, "entity type not registered: {value}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Composition(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CompositionError> for RegistryError {
    fn from(value: CompositionError) -> Self {
        Self::Composition(value)
    }
}

/// In-process schema registry.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Arc<Schema>>,
    behavior_index: BTreeMap<&'static str, BTreeSet<String>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in catalog.
    pub fn with_builtin_catalog() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register_builtin_catalog()?;
        Ok(registry)
    }

    /// Builds and registers one schema. Composition errors surface here,
    /// before any record of the type exists.
    pub fn register(&mut self, builder: SchemaBuilder) -> Result<Arc<Schema>, RegistryError> {
        let schema = builder.build()?;
        self.register_schema(schema)
    }

    /// Registers an already built schema.
    pub fn register_schema(&mut self, schema: Schema) -> Result<Arc<Schema>, RegistryError> {
        let entity_type = schema.entity_type().to_string();
        if self.schemas.contains_key(entity_type.as_str()) {
            return Err(RegistryError::DuplicateEntityType(entity_type));
        }

        for behavior in schema.behaviors() {
            self.behavior_index
                .entry(*behavior)
                .or_default()
                .insert(entity_type.clone());
        }

        let schema = Arc::new(schema);
        info!(
            "event=schema_register module=registry status=ok entity_type={} behaviors={} fields={}",
            entity_type,
            schema.behaviors().join("+"),
            schema.fields().len()
        );
        self.schemas.insert(entity_type, Arc::clone(&schema));
        Ok(schema)
    }

    /// Registers every built-in entity type.
    pub fn register_builtin_catalog(&mut self) -> Result<(), RegistryError> {
        for builder in catalog::builtin_schemas() {
            self.register(builder)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn get(&self, entity_type: &str) -> Option<&Arc<Schema>> {
        self.schemas.get(entity_type)
    }

    /// Like `get`, but reports unknown types as an error.
    pub fn require(&self, entity_type: &str) -> Result<&Arc<Schema>, RegistryError> {
        self.get(entity_type)
            .ok_or_else(|| RegistryError::UnknownEntityType(entity_type.to_string()))
    }

    /// Sorted registered entity types.
    pub fn entity_types(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    /// Sorted entity types composing `behavior`.
    pub fn list_by_behavior(&self, behavior: &str) -> Vec<&str> {
        let Some(types) = self.behavior_index.get(behavior) else {
            return vec![];
        };
        types.iter().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{RegistryError, SchemaRegistry};
    use crate::behavior::publishable::Publishable;
    use crate::behavior::timestamped::Timestamped;
    use crate::error::CompositionError;
    use crate::model::field::FieldSpec;
    use crate::schema::Schema;

    #[test]
    fn registers_and_indexes_by_behavior() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(
                Schema::builder("post")
                    .behavior::<Timestamped>()
                    .behavior::<Publishable>(),
            )
            .expect("post registration");
        registry
            .register(Schema::builder("comment").behavior::<Timestamped>())
            .expect("comment registration");

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.list_by_behavior("timestamped"),
            vec!["comment", "post"]
        );
        assert_eq!(registry.list_by_behavior("publishable"), vec!["post"]);
        assert!(registry.list_by_behavior("expirable").is_empty());
    }

    #[test]
    fn rejects_duplicate_entity_type() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(Schema::builder("post"))
            .expect("first registration should succeed");
        let err = registry
            .register(Schema::builder("post"))
            .expect_err("duplicate registration must fail");
        assert_eq!(err, RegistryError::DuplicateEntityType("post".to_string()));
    }

    #[test]
    fn surfaces_composition_errors() {
        let mut registry = SchemaRegistry::new();
        let err = registry
            .register(
                Schema::builder("post")
                    .field(FieldSpec::text("title"))
                    .field(FieldSpec::text("title")),
            )
            .expect_err("colliding fields must fail");
        assert!(matches!(
            err,
            RegistryError::Composition(CompositionError::FieldCollision { field: "title", .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn require_reports_unknown_type() {
        let registry = SchemaRegistry::new();
        let err = registry.require("ghost").expect_err("unknown type");
        assert_eq!(err, RegistryError::UnknownEntityType("ghost".to_string()));
    }
}

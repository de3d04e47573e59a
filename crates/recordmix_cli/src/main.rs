//! Smoke check for `recordmix_core` linkage.
//!
//! Prints the core version and the flattened fields of every built-in
//! entity type, one line per type.

use recordmix_core::{core_version, SchemaRegistry};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("recordmix_core version={}", core_version());

    let registry = match SchemaRegistry::with_builtin_catalog() {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("builtin catalog failed to register: {err}");
            return ExitCode::FAILURE;
        }
    };

    for schema in registry
        .entity_types()
        .into_iter()
        .filter_map(|entity_type| registry.get(entity_type))
    {
        let fields: Vec<String> = schema
            .fields()
            .iter()
            .map(|field| format!("{}:{}", field.name, field.field_type))
            .collect();
        println!(
            "{} behaviors={} fields={}",
            schema.entity_type(),
            schema.behaviors().join("+"),
            fields.join(",")
        );
    }
    ExitCode::SUCCESS
}

//! Built-in entity types.

use crate::behavior::annotatable::Annotatable;
use crate::behavior::authored::Authored;
use crate::behavior::expirable::Expirable;
use crate::behavior::locatable::Locatable;
use crate::behavior::permalinkable::Permalinkable;
use crate::behavior::publishable::Publishable;
use crate::behavior::timestamped::Timestamped;
use crate::behavior::{read_text, Validator};
use crate::model::field::FieldSpec;
use crate::schema::{Schema, SchemaBuilder};

pub const TODO: &str = "todo";
pub const ADDRESS: &str = "address";
pub const IMAGE: &str = "image";
pub const ARTICLE: &str = "article";
pub const INVITATION: &str = "invitation";

/// Builders for every built-in entity type, in registration order.
pub fn builtin_schemas() -> Vec<SchemaBuilder> {
    vec![todo(), address(), image(), article(), invitation()]
}

pub fn todo() -> SchemaBuilder {
    Schema::builder(TODO)
        .behavior::<Timestamped>()
        .behavior::<Authored>()
        .field(FieldSpec::text("title"))
        .field(FieldSpec::bool("is_done").default_value(false))
        .validator(not_blank("title"))
}

pub fn address() -> SchemaBuilder {
    Schema::builder(ADDRESS)
        .behavior::<Timestamped>()
        .behavior::<Locatable>()
        .field(FieldSpec::text("line1"))
        .field(FieldSpec::text("city"))
        .field(FieldSpec::text("postal_code").default_value(""))
}

pub fn image() -> SchemaBuilder {
    Schema::builder(IMAGE)
        .behavior::<Timestamped>()
        .behavior::<Authored>()
        .behavior::<Annotatable>()
        .field(FieldSpec::text("url"))
        .field(FieldSpec::text("alt_text").default_value(""))
}

pub fn article() -> SchemaBuilder {
    Schema::builder(ARTICLE)
        .behavior::<Timestamped>()
        .behavior::<Authored>()
        .behavior::<Publishable>()
        .behavior::<Permalinkable>()
        .behavior::<Annotatable>()
        .field(FieldSpec::text("title"))
        .field(FieldSpec::text("body").default_value(""))
        .validator(not_blank("title"))
}

pub fn invitation() -> SchemaBuilder {
    Schema::builder(INVITATION)
        .behavior::<Timestamped>()
        .behavior::<Expirable>()
        .field(FieldSpec::text("email"))
        .validator(Validator::new("email_format", &["email"], |values| {
            let email = read_text(values, "email");
            match email.split_once('@') {
                Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
                _ => Err(format!("`{email}` is not an email address")),
            }
        }))
}

fn not_blank(field: &'static str) -> Validator {
    Validator::new("not_blank", &[field], move |values| {
        if read_text(values, field).trim().is_empty() {
            Err(format!("{field} must not be blank"))
        } else {
            Ok(())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::builtin_schemas;

    #[test]
    fn every_builtin_schema_composes() {
        for builder in builtin_schemas() {
            let schema = builder.build().expect("builtin schema should compose");
            assert!(!schema.behaviors().is_empty());
        }
    }
}

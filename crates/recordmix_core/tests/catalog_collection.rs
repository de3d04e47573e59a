use recordmix_core::{
    CollectionError, EntityRef, FieldValue, FieldValues, FixedClock, Record, RecordCollection,
    RecordError, RecordStore, SchemaRegistry, TimestampedView,
};
use std::sync::Arc;
use uuid::Uuid;

fn registry() -> SchemaRegistry {
    SchemaRegistry::with_builtin_catalog().expect("builtin catalog registration")
}

fn article(registry: &SchemaRegistry, slug: &str, clock: &FixedClock) -> Record {
    let schema = registry.require("article").expect("article is builtin");
    Record::draft(schema)
        .with("title", "Launch notes")
        .with("slug", slug)
        .with("author", EntityRef::new(Uuid::new_v4(), "bob"))
        .create(clock)
        .expect("article should construct")
}

#[test]
fn builtin_catalog_registers_every_type() {
    let registry = registry();
    assert_eq!(
        registry.entity_types(),
        vec!["address", "article", "image", "invitation", "todo"]
    );
    assert_eq!(
        registry.list_by_behavior("authored"),
        vec!["article", "image", "todo"]
    );
    assert_eq!(registry.list_by_behavior("expirable"), vec!["invitation"]);
    assert_eq!(registry.list_by_behavior("timestamped").len(), 5);

    let article = registry.get("article").expect("article schema");
    assert_eq!(
        article.behaviors(),
        &[
            "timestamped",
            "authored",
            "publishable",
            "permalinkable",
            "annotatable"
        ]
    );
    assert_eq!(article.field_owner("slug"), Some("permalinkable"));
    assert_eq!(article.field_owner("title"), Some("article"));
    assert!(article.field("slug").expect("slug field").unique);
}

#[test]
fn builtin_catalog_cannot_register_twice() {
    let mut registry = registry();
    let err = registry
        .register_builtin_catalog()
        .expect_err("second catalog registration must fail");
    assert_eq!(
        err,
        recordmix_core::RegistryError::DuplicateEntityType("todo".to_string())
    );
}

#[test]
fn todo_title_must_not_be_blank() {
    let registry = registry();
    let schema = registry.require("todo").unwrap();
    let err = Record::draft(schema)
        .with("title", "   ")
        .with("is_author_anonymous", true)
        .create(&FixedClock(0))
        .expect_err("blank title must fail");
    assert!(matches!(
        err,
        RecordError::Validation(ref err) if err.owner == "todo" && err.rule == "not_blank"
    ));
}

#[test]
fn invitation_requires_email_shape() {
    let registry = registry();
    let schema = registry.require("invitation").unwrap();
    assert!(Record::draft(schema)
        .with("email", "no-at-sign")
        .create(&FixedClock(0))
        .is_err());
    assert!(Record::draft(schema)
        .with("email", "guest@example.test")
        .create(&FixedClock(0))
        .is_ok());
}

#[test]
fn slugs_are_unique_per_collection() {
    let registry = registry();
    let clock = FixedClock(1_000);
    let schema = Arc::clone(registry.require("article").unwrap());
    let mut articles = RecordCollection::new(schema);

    articles
        .insert(article(&registry, "launch", &clock))
        .expect("first article");
    let err = articles
        .insert(article(&registry, "launch", &clock))
        .expect_err("duplicate slug must fail");
    assert_eq!(
        err,
        CollectionError::UniqueViolation {
            field: "slug",
            value: FieldValue::Text("launch".to_string()),
        }
    );
    assert_eq!(articles.len(), 1);
    assert!(articles
        .find_by("slug", &FieldValue::Text("launch".to_string()))
        .is_some());
}

#[test]
fn rejected_update_leaves_stored_record_unchanged() {
    let registry = registry();
    let clock = FixedClock(1_000);
    let mut articles = RecordCollection::new(Arc::clone(registry.require("article").unwrap()));

    articles
        .insert(article(&registry, "launch", &clock))
        .expect("first article");
    let second_id = articles
        .insert(article(&registry, "retro", &clock))
        .expect("second article");
    let before = articles.get(second_id).cloned().expect("stored article");

    let changes = FieldValues::from([("slug".to_string(), FieldValue::from("launch"))]);
    let err = articles
        .update(second_id, changes, &FixedClock(2_000))
        .expect_err("slug collision must fail");
    assert!(matches!(err, CollectionError::UniqueViolation { field: "slug", .. }));
    assert_eq!(articles.get(second_id), Some(&before));

    let changes = FieldValues::from([("slug".to_string(), FieldValue::from("retro-2"))]);
    let updated = articles
        .update(second_id, changes, &FixedClock(2_000))
        .expect("fresh slug is accepted");
    let timestamps = updated
        .view::<TimestampedView>()
        .expect("article is timestamped");
    assert_eq!(timestamps.modified_at(), 2_000);
}

#[test]
fn invalid_update_reports_record_error() {
    let registry = registry();
    let clock = FixedClock(1_000);
    let mut articles = RecordCollection::new(Arc::clone(registry.require("article").unwrap()));
    let id = articles
        .insert(article(&registry, "launch", &clock))
        .expect("article");

    let changes = FieldValues::from([("slug".to_string(), FieldValue::from("Bad Slug"))]);
    let err = articles
        .update(id, changes, &FixedClock(2_000))
        .expect_err("invalid slug must fail");
    assert!(matches!(
        err,
        CollectionError::Record(RecordError::Validation(ref err)) if err.rule == "slug_format"
    ));
}

#[test]
fn remove_returns_tombstone_and_frees_slug() {
    let registry = registry();
    let clock = FixedClock(1_000);
    let mut articles = RecordCollection::new(Arc::clone(registry.require("article").unwrap()));
    let id = articles
        .insert(article(&registry, "launch", &clock))
        .expect("article");

    let tombstone = articles
        .remove(id, &FixedClock(3_000))
        .expect("remove stored article");
    assert_eq!(tombstone.id, id);
    assert_eq!(tombstone.entity_type, "article");
    assert_eq!(tombstone.deleted_at, 3_000);
    assert!(articles.get(id).is_none());
    assert_eq!(
        articles.remove(id, &clock).expect_err("already removed"),
        CollectionError::NotFound(id)
    );

    articles
        .insert(article(&registry, "launch", &clock))
        .expect("slug is free again");
}

#[test]
fn rejects_record_of_other_entity_type() {
    let registry = registry();
    let mut articles = RecordCollection::new(Arc::clone(registry.require("article").unwrap()));
    let todo = Record::draft(registry.require("todo").unwrap())
        .with("title", "file taxes")
        .with("is_author_anonymous", true)
        .create(&FixedClock(0))
        .expect("todo");

    let err = articles.insert(todo).expect_err("todo is not an article");
    assert_eq!(
        err,
        CollectionError::SchemaMismatch {
            expected: "article".to_string(),
            found: "todo".to_string(),
        }
    );
}

#[test]
fn article_title_must_not_be_blank() {
    let registry = registry();
    let err = Record::draft(registry.require("article").unwrap())
        .with("title", "")
        .with("slug", "empty")
        .with("is_author_anonymous", true)
        .create(&FixedClock(0))
        .expect_err("empty title must fail");
    assert!(matches!(
        err,
        RecordError::Validation(ref err) if err.owner == "article" && err.rule == "not_blank"
    ));
}

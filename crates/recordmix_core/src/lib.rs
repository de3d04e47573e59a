//! Behavior composition for record-like entities.
//!
//! Behaviors (timestamps, authorship, publishing, expiration, location,
//! permalinks, annotations) are declared once and composed onto entity
//! schemas; records of those schemas validate on construction and on every
//! mutation.

pub mod behavior;
pub mod clock;
pub mod error;
pub mod logging;
pub mod model;
pub mod record;
pub mod schema;

pub use behavior::annotatable::{Annotatable, AnnotatableView};
pub use behavior::authored::{Authored, AuthoredView};
pub use behavior::expirable::{Expirable, ExpirableView};
pub use behavior::locatable::{Locatable, LocatableView};
pub use behavior::permalinkable::{slugify, Permalinkable, PermalinkableView};
pub use behavior::publishable::{Publishable, PublishableView};
pub use behavior::timestamped::{Timestamped, TimestampedView};
pub use behavior::{Behavior, BehaviorSpec, BehaviorView, Validator};
pub use clock::{Clock, FixedClock, SystemClock, Timestamp};
pub use error::{
    CompositionError, ConstructionError, FieldError, RecordError, RecordResult, ValidationError,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::field::{FieldDefault, FieldSpec};
pub use model::value::{EntityRef, FieldType, FieldValue, FieldValues};
pub use record::collection::{CollectionError, CollectionResult, RecordCollection, RecordStore};
pub use record::entity::{Record, RecordDraft, RecordId, Tombstone};
pub use schema::registry::{RegistryError, SchemaRegistry};
pub use schema::{Schema, SchemaBuilder};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

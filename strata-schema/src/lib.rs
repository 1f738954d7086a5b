//! # strata-schema
//!
//! Collection, brick, and field definitions for the Strata CMS.
//!
//! This crate provides:
//! - The collection definition model: collections, bricks, and arbitrarily
//!   nested repeating field groups
//! - Custom field types and their relational column shapes
//! - The `DatabaseAdapter` capability surface consumed by the migration
//!   engine, with reference PostgreSQL and SQLite type mappings
//! - Definition validation (key syntax, duplicates, layout consistency)
//!
//! ## Example
//!
//! ```rust
//! use strata_schema::{Brick, BrickMode, Collection, FieldDefinition};
//!
//! let collection = Collection::builder("blog")
//!     .field(FieldDefinition::text("title").required(true))
//!     .brick(
//!         Brick::builder("hero", BrickMode::Builder)
//!             .field(FieldDefinition::text("heading"))
//!             .repeater("items", |r| r.field(FieldDefinition::text("label")))
//!             .build()
//!             .unwrap(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(collection.key(), "blog");
//! ```

pub mod adapter;
pub mod collection;
pub mod error;
pub mod field;
pub mod types;
pub mod validator;

pub use adapter::{Capability, DatabaseAdapter, PostgresAdapter, SqliteAdapter};
pub use collection::{Brick, BrickBuilder, BrickMode, Collection, CollectionBuilder, FieldNode, GroupBuilder};
pub use error::{SchemaError, SchemaResult};
pub use field::{FieldColumnShape, FieldDefinition, FieldType, SchemaDefinition};
pub use validator::{validate_brick, validate_collection, validate_key};
pub use types::{
    COLLECTIONS_TABLE, ColumnDataType, DefaultKey, ForeignKeyRef, LOCALES_TABLE, MEDIA_TABLE,
    OnDeleteAction, USERS_TABLE,
};

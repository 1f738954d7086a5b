//! # Strata
//!
//! Collection schema tooling for the Strata CMS.
//!
//! Strata provides:
//! - A builder API for declaring collections, bricks, and repeater fields
//! - A compiler turning those declarations into flat relational tables
//! - A migration engine that diffs compiled schemas against the live
//!   database and emits ordered, policy-gated migration plans
//! - SQL generation for PostgreSQL and SQLite
//!
//! ## Quick Start
//!
//! ```rust
//! use strata::prelude::*;
//!
//! fn main() -> Result<(), strata::migrate::MigrationError> {
//!     let collection = Collection::builder("page")
//!         .field(FieldDefinition::text("title").required(true))
//!         .field(FieldDefinition::wysiwyg("body"))
//!         .build()?;
//!
//!     let adapter = SqliteAdapter;
//!     let schema = compile_collection(
//!         &collection,
//!         "strata_document__page",
//!         "strata_document__page__versions",
//!         &adapter,
//!     )?;
//!
//!     let plan = MigrationPlanner::new(&adapter).plan(&[], &schema)?;
//!     println!("{}", plan.summary());
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Collection, brick, and field definitions plus database adapters.
pub mod schema {
    pub use strata_schema::*;
}

/// Schema compilation, diffing, and migration planning.
pub mod migrate {
    pub use strata_migrate::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::migrate::{
        MigrationPlan, MigrationPlanner, MigrationPolicy, SqlGenerator, compile_collection,
        requires_migration,
    };
    pub use crate::schema::{
        Brick, BrickMode, Collection, DatabaseAdapter, FieldDefinition, PostgresAdapter,
        SqliteAdapter,
    };
}

// Re-export key types at the crate root
pub use migrate::{MigrationError, MigrationPlan};
pub use schema::{Collection, SchemaError};

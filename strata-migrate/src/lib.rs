//! # strata-migrate
//!
//! Collection schema migration engine for Strata.
//!
//! This crate provides functionality for:
//! - Compiling declarative collections into flat relational table schemas
//! - Diffing compiled schemas against the live, introspected database state
//! - Ordered migration plans with create/modify/remove table operations
//! - Per-dialect column alteration strategies (in-place vs drop-and-add)
//! - Data-safety policy gating for destructive operations
//! - SQL generation for the supported dialects
//!
//! ## Architecture
//!
//! A [`Collection`](strata_schema::Collection) definition is compiled into a
//! forest of table descriptors (document fields, bricks, repeaters). The
//! planner diffs that forest against introspected tables and emits a
//! [`MigrationPlan`], which the SQL generator renders as DDL.
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌─────────────┐
//! │ Collection   │────▶│ Schema Compiler│────▶│  Planner    │
//! └──────────────┘     └────────────────┘     └─────────────┘
//!                                                    ▲
//! ┌──────────────┐     ┌────────────────┐            │
//! │ Live Tables  │────▶│  Normaliser    │────────────┘
//! └──────────────┘     └────────────────┘
//!                                                    │
//!                                                    ▼
//!                      ┌────────────────┐     ┌─────────────┐
//!                      │ Migration Plan │────▶│  SQL Gen    │
//!                      └────────────────┘     └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use strata_migrate::{compile_collection, MigrationPlanner, SqlGenerator};
//! use strata_schema::{Collection, FieldDefinition, SqliteAdapter};
//!
//! # fn main() -> Result<(), strata_migrate::MigrationError> {
//! let collection = Collection::builder("page")
//!     .field(FieldDefinition::text("title"))
//!     .build()?;
//!
//! let adapter = SqliteAdapter;
//! let schema = compile_collection(
//!     &collection,
//!     "strata_document__page",
//!     "strata_document__page__versions",
//!     &adapter,
//! )?;
//!
//! // No existing tables: the plan creates everything.
//! let plan = MigrationPlanner::new(&adapter).plan(&[], &schema)?;
//! assert!(!plan.is_empty());
//!
//! let statements = SqlGenerator::new(&adapter).generate(&plan);
//! assert!(statements[0].starts_with("CREATE TABLE"));
//! # Ok(())
//! # }
//! ```

pub mod compile;
pub mod error;
pub mod modify;
pub mod naming;
pub mod normalise;
pub mod plan;
pub mod priority;
pub mod schema;
pub mod sql;

// Re-exports
pub use compile::compile_collection;
pub use error::{MigrateResult, MigrationError};
pub use modify::{ColumnChanges, ColumnModification, ModStrategy};
pub use naming::{document_table_name, parse_table_name, version_table_name};
pub use plan::{
    ColumnOperation, MigrationPlan, MigrationPlanner, MigrationPolicy, TableMigration,
    TableMigrationKind, requires_migration,
};
pub use priority::{PRIORITY_DOCUMENT, PRIORITY_FIELD_HOLDER, table_priority};
pub use schema::{
    CollectionSchema, CollectionSchemaColumn, CollectionSchemaTable, ColumnSource, InferredColumn,
    InferredTable, TableKey, TableType,
};
pub use sql::SqlGenerator;

//! Error types for the migration engine.

use thiserror::Error;

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Errors that can occur during schema compilation and plan generation.
///
/// Everything here is a configuration error: it aborts the whole compile or
/// plan call and no partial result is returned. Capability mismatches and
/// data-loss policy suppressions are decisions, not errors, and never appear
/// here.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A layout node referenced a field key with no registered field.
    #[error("field `{field}` not found in `{owner}`")]
    FieldNotFound {
        /// The missing field key.
        field: String,
        /// The collection or brick that referenced it.
        owner: String,
    },

    /// A table's structural key is inconsistent with its type.
    #[error("malformed key for table `{table}`: {reason}")]
    MalformedTableKey {
        /// Table name.
        table: String,
        /// What is wrong with the key.
        reason: String,
    },

    /// Definition error surfaced by the schema crate.
    #[error("schema error: {0}")]
    Schema(#[from] strata_schema::SchemaError),

    /// General migration error.
    #[error("migration error: {0}")]
    Other(String),
}

impl MigrationError {
    /// Create a field-not-found error.
    pub fn field_not_found(field: impl Into<String>, owner: impl Into<String>) -> Self {
        Self::FieldNotFound {
            field: field.into(),
            owner: owner.into(),
        }
    }

    /// Create a malformed table key error.
    pub fn malformed_key(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTableKey {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Create an other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

//! Shared logical types for the Strata schema model.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Name of the registry table holding one row per collection.
pub const COLLECTIONS_TABLE: &str = "strata_collections";
/// Name of the registry table holding one row per configured locale.
pub const LOCALES_TABLE: &str = "strata_locales";
/// Name of the media library table.
pub const MEDIA_TABLE: &str = "strata_media";
/// Name of the users table.
pub const USERS_TABLE: &str = "strata_users";

/// Dialect-neutral logical column types.
///
/// Concrete spellings are supplied by a [`DatabaseAdapter`](crate::adapter::DatabaseAdapter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnDataType {
    /// Auto-incrementing integer primary key.
    PrimaryKey,
    /// Integer type.
    Integer,
    /// Boolean type (stored as an integer on dialects without booleans).
    Boolean,
    /// Unbounded text type.
    Text,
    /// Date and time type.
    Timestamp,
    /// JSON document type.
    Json,
}

impl ColumnDataType {
    /// Canonical dialect-neutral token for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrimaryKey => "primary-key",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Timestamp => "timestamp",
            Self::Json => "json",
        }
    }
}

/// Referential action applied when a foreign-key target row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnDeleteAction {
    /// Delete dependent rows.
    Cascade,
    /// Null out the referencing column.
    SetNull,
    /// Refuse the delete.
    Restrict,
}

impl OnDeleteAction {
    /// SQL clause fragment for this action.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::Restrict => "RESTRICT",
        }
    }
}

/// A foreign-key descriptor attached to a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    /// Referenced table name.
    pub table: SmolStr,
    /// Referenced column name.
    pub column: SmolStr,
    /// Action on delete of the referenced row.
    pub on_delete: OnDeleteAction,
}

impl ForeignKeyRef {
    /// Create a new foreign-key descriptor.
    pub fn new(
        table: impl Into<SmolStr>,
        column: impl Into<SmolStr>,
        on_delete: OnDeleteAction,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            on_delete,
        }
    }

    /// Cascade-deleting reference.
    pub fn cascade(table: impl Into<SmolStr>, column: impl Into<SmolStr>) -> Self {
        Self::new(table, column, OnDeleteAction::Cascade)
    }

    /// Null-on-delete reference.
    pub fn set_null(table: impl Into<SmolStr>, column: impl Into<SmolStr>) -> Self {
        Self::new(table, column, OnDeleteAction::SetNull)
    }
}

/// Well-known default-value keys an adapter can spell out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultKey {
    /// Current timestamp.
    Now,
    /// Boolean true.
    True,
    /// Boolean false.
    False,
    /// Integer zero.
    Zero,
}

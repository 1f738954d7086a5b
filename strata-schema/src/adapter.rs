//! The capability surface Strata requires from a SQL dialect adapter.
//!
//! The migration engine never talks to a live database; everything it needs
//! from a concrete dialect is the type-mapping and capability contract below.
//! The reference implementations here are pure mapping tables with no driver
//! attached, used both by the engine's tests and by downstream adapter crates
//! as the contract they must satisfy.

use serde_json::{Value, json};

use crate::types::{ColumnDataType, DefaultKey};

/// Optional capabilities a dialect may or may not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Capability {
    /// In-place `ALTER TABLE ... ALTER COLUMN` for type, nullability,
    /// defaults, and foreign keys.
    AlterColumn,
}

/// Fixed contract between the migration engine and a SQL dialect.
pub trait DatabaseAdapter: Send + Sync {
    /// Short dialect name, for logging and plan summaries.
    fn dialect(&self) -> &'static str;

    /// Dialect spelling of a logical column type.
    fn data_type(&self, data_type: ColumnDataType) -> &'static str;

    /// Dialect encoding of a well-known default value.
    fn default_value(&self, data_type: ColumnDataType, key: DefaultKey) -> Value;

    /// Whether the dialect supports a given capability.
    fn supports(&self, capability: Capability) -> bool;

    /// Preferred fuzzy-match operator. Unused by the migration engine but
    /// part of the shared adapter contract consumed by the query layer.
    fn fuzzy_operator(&self) -> &'static str;
}

/// Reference PostgreSQL type mapping. Supports in-place column alteration.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresAdapter;

impl DatabaseAdapter for PostgresAdapter {
    fn dialect(&self) -> &'static str {
        "postgres"
    }

    fn data_type(&self, data_type: ColumnDataType) -> &'static str {
        match data_type {
            ColumnDataType::PrimaryKey => "serial",
            ColumnDataType::Integer => "integer",
            ColumnDataType::Boolean => "boolean",
            ColumnDataType::Text => "text",
            ColumnDataType::Timestamp => "timestamptz",
            ColumnDataType::Json => "jsonb",
        }
    }

    fn default_value(&self, _data_type: ColumnDataType, key: DefaultKey) -> Value {
        match key {
            DefaultKey::Now => json!("NOW()"),
            DefaultKey::True => json!(true),
            DefaultKey::False => json!(false),
            DefaultKey::Zero => json!(0),
        }
    }

    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::AlterColumn => true,
        }
    }

    fn fuzzy_operator(&self) -> &'static str {
        "ILIKE"
    }
}

/// Reference SQLite/libSQL type mapping.
///
/// SQLite cannot alter column type, nullability, or foreign keys in place,
/// so it reports no [`Capability::AlterColumn`]; the plan generator falls
/// back to destructive drop-and-add for those changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteAdapter;

impl DatabaseAdapter for SqliteAdapter {
    fn dialect(&self) -> &'static str {
        "sqlite"
    }

    fn data_type(&self, data_type: ColumnDataType) -> &'static str {
        match data_type {
            ColumnDataType::PrimaryKey => "integer",
            ColumnDataType::Integer => "integer",
            // SQLite has no boolean affinity; 0/1 integers by convention.
            ColumnDataType::Boolean => "integer",
            ColumnDataType::Text => "text",
            ColumnDataType::Timestamp => "timestamp",
            ColumnDataType::Json => "text",
        }
    }

    fn default_value(&self, _data_type: ColumnDataType, key: DefaultKey) -> Value {
        match key {
            DefaultKey::Now => json!("CURRENT_TIMESTAMP"),
            DefaultKey::True => json!(1),
            DefaultKey::False => json!(0),
            DefaultKey::Zero => json!(0),
        }
    }

    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::AlterColumn => false,
        }
    }

    fn fuzzy_operator(&self) -> &'static str {
        "LIKE"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_supports_alter_column() {
        assert!(PostgresAdapter.supports(Capability::AlterColumn));
        assert!(!SqliteAdapter.supports(Capability::AlterColumn));
    }

    #[test]
    fn test_boolean_spellings_differ() {
        assert_eq!(PostgresAdapter.data_type(ColumnDataType::Boolean), "boolean");
        assert_eq!(SqliteAdapter.data_type(ColumnDataType::Boolean), "integer");
    }

    #[test]
    fn test_boolean_default_encodings() {
        assert_eq!(
            PostgresAdapter.default_value(ColumnDataType::Boolean, DefaultKey::False),
            json!(false)
        );
        assert_eq!(
            SqliteAdapter.default_value(ColumnDataType::Boolean, DefaultKey::False),
            json!(0)
        );
    }

    #[test]
    fn test_adapter_is_object_safe() {
        let adapters: Vec<Box<dyn DatabaseAdapter>> =
            vec![Box::new(PostgresAdapter), Box::new(SqliteAdapter)];
        assert_eq!(adapters[0].dialect(), "postgres");
        assert_eq!(adapters[1].fuzzy_operator(), "LIKE");
    }
}

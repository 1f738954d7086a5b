//! Compiled schema descriptors and their live-database mirror.
//!
//! The compiler produces a flat forest of [`CollectionSchemaTable`]s; the
//! introspection collaborator produces [`InferredTable`]s in the same
//! normalizable column shape. Everything here is plain serializable data.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use strata_schema::{ColumnDataType, FieldType, ForeignKeyRef};

/// Where a column came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnSource {
    /// Structural column (id, locale, position, ...).
    Core,
    /// Generated from a custom field.
    Field,
}

/// One relational column of a compiled table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchemaColumn {
    /// Column name, unique within its table.
    pub name: SmolStr,
    /// Structural or field-generated.
    pub source: ColumnSource,
    /// Dialect-neutral logical type.
    pub data_type: ColumnDataType,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Whether this is the table's single primary-key column.
    #[serde(default)]
    pub primary: bool,
    /// Logical default value, if any.
    pub default: Option<serde_json::Value>,
    /// Foreign-key descriptor, if any.
    pub foreign_key: Option<ForeignKeyRef>,
    /// The custom field type that generated this column, preserved for
    /// round-tripping field-specific column semantics.
    pub field_type: Option<FieldType>,
}

/// The structural role of a compiled table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableType {
    /// The collection's document table (externally managed).
    Document,
    /// The document version table (externally managed).
    Versions,
    /// The collection's own field storage.
    DocumentFields,
    /// One brick's field storage.
    Brick,
    /// One repeater level's group storage.
    Repeater,
}

impl TableType {
    /// Type name as it appears in serialized plans.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Versions => "versions",
            Self::DocumentFields => "document-fields",
            Self::Brick => "brick",
            Self::Repeater => "repeater",
        }
    }
}

/// The structural identity of a compiled table.
///
/// Table names are a pure function of this key, which is what makes diffing
/// possible without a persisted mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableKey {
    /// Owning collection key.
    pub collection: SmolStr,
    /// Brick key, when the table belongs to a brick subtree.
    pub brick: Option<SmolStr>,
    /// Ordered repeater key path, one entry per nesting level.
    pub repeater: Vec<SmolStr>,
}

impl TableKey {
    /// Key for a collection's document-fields table.
    pub fn document_fields(collection: impl Into<SmolStr>) -> Self {
        Self {
            collection: collection.into(),
            brick: None,
            repeater: Vec::new(),
        }
    }

    /// Key for a brick table.
    pub fn brick(collection: impl Into<SmolStr>, brick: impl Into<SmolStr>) -> Self {
        Self {
            collection: collection.into(),
            brick: Some(brick.into()),
            repeater: Vec::new(),
        }
    }

    /// Key for a repeater table nested under this one.
    pub fn child_repeater(&self, repeater: impl Into<SmolStr>) -> Self {
        let mut repeater_path = self.repeater.clone();
        repeater_path.push(repeater.into());
        Self {
            collection: self.collection.clone(),
            brick: self.brick.clone(),
            repeater: repeater_path,
        }
    }

    /// Repeater nesting depth (0 for non-repeater tables).
    pub fn depth(&self) -> usize {
        self.repeater.len()
    }
}

/// One compiled relational table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchemaTable {
    /// Deterministic table name, derived from `key`.
    pub name: SmolStr,
    /// Structural role.
    pub table_type: TableType,
    /// Structural identity.
    pub key: TableKey,
    /// Ordered columns.
    pub columns: Vec<CollectionSchemaColumn>,
}

impl CollectionSchemaTable {
    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&CollectionSchemaColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The table's primary-key column. Every compiled table has exactly one.
    pub fn primary_column(&self) -> Option<&CollectionSchemaColumn> {
        self.columns.iter().find(|c| c.primary)
    }
}

/// The compiled schema forest for one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Collection key.
    pub key: SmolStr,
    /// Flat forest of compiled tables, in dependency order.
    pub tables: Vec<CollectionSchemaTable>,
}

impl CollectionSchema {
    /// Look up a compiled table by name.
    pub fn table(&self, name: &str) -> Option<&CollectionSchemaTable> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// One column of a live-introspected table, with raw dialect spellings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferredColumn {
    /// Column name.
    pub name: SmolStr,
    /// Raw dialect type (e.g. `character varying`, `int4`, `TINYINT(1)`).
    pub data_type: String,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Raw default expression, if any.
    pub default: Option<String>,
    /// Foreign-key descriptor recovered from constraints, if any.
    pub foreign_key: Option<ForeignKeyRef>,
}

/// The live-database mirror of a compiled table, produced entirely by the
/// external introspection collaborator. The engine treats it as read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferredTable {
    /// Table name.
    pub name: SmolStr,
    /// Columns as they exist in the database.
    pub columns: Vec<InferredColumn>,
}

impl InferredTable {
    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&InferredColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

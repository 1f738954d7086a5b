//! Custom field definitions and their relational column shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use smol_str::SmolStr;

use crate::adapter::DatabaseAdapter;
use crate::types::{ColumnDataType, ForeignKeyRef, MEDIA_TABLE, USERS_TABLE};

/// The kinds of custom fields a collection or brick can declare.
///
/// `Repeater` and `Tab` are structural: a repeater's value lives in its own
/// child table, and a tab is a layout grouping that flattens into its owner.
/// Neither produces columns of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    Textarea,
    Wysiwyg,
    Number,
    Checkbox,
    Select,
    Media,
    User,
    Link,
    Colour,
    DateTime,
    Json,
    Repeater,
    Tab,
}

impl FieldType {
    /// Field type name as it appears in serialized definitions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Wysiwyg => "wysiwyg",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Select => "select",
            Self::Media => "media",
            Self::User => "user",
            Self::Link => "link",
            Self::Colour => "colour",
            Self::DateTime => "date-time",
            Self::Json => "json",
            Self::Repeater => "repeater",
            Self::Tab => "tab",
        }
    }

    /// Whether this field type holds other fields instead of a value.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Repeater | Self::Tab)
    }
}

/// One relational column a field contributes to its owning table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldColumnShape {
    /// Name suffix distinguishing this column when a field contributes more
    /// than one. `None` names the column after the field key alone; every
    /// built-in type is single-column and leaves it unset.
    #[serde(default)]
    pub name_suffix: Option<SmolStr>,
    /// Logical column type.
    pub data_type: ColumnDataType,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Logical default value, if any.
    pub default: Option<Value>,
    /// Foreign-key target, if any.
    pub foreign_key: Option<ForeignKeyRef>,
}

/// The column shapes a field contributes. Structural fields contribute none.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Columns, in emission order.
    pub columns: Vec<FieldColumnShape>,
}

/// A single custom field declared on a collection, brick, or repeater group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field key, unique within its owner.
    pub key: SmolStr,
    /// Field kind.
    pub field_type: FieldType,
    /// Whether a value is required (drives column nullability).
    pub required: bool,
    /// User-configured default value overriding the type's own.
    pub default: Option<Value>,
}

impl FieldDefinition {
    /// Create a field of an arbitrary type.
    pub fn new(key: impl Into<SmolStr>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            field_type,
            required: false,
            default: None,
        }
    }

    /// Single-line text field.
    pub fn text(key: impl Into<SmolStr>) -> Self {
        Self::new(key, FieldType::Text)
    }

    /// Multi-line text field.
    pub fn textarea(key: impl Into<SmolStr>) -> Self {
        Self::new(key, FieldType::Textarea)
    }

    /// Rich-text field.
    pub fn wysiwyg(key: impl Into<SmolStr>) -> Self {
        Self::new(key, FieldType::Wysiwyg)
    }

    /// Integer field.
    pub fn number(key: impl Into<SmolStr>) -> Self {
        Self::new(key, FieldType::Number)
    }

    /// Boolean field, defaulting to `false`.
    pub fn checkbox(key: impl Into<SmolStr>) -> Self {
        Self::new(key, FieldType::Checkbox)
    }

    /// Select field storing the chosen option value.
    pub fn select(key: impl Into<SmolStr>) -> Self {
        Self::new(key, FieldType::Select)
    }

    /// Reference to a media library entry.
    pub fn media(key: impl Into<SmolStr>) -> Self {
        Self::new(key, FieldType::Media)
    }

    /// Reference to a user.
    pub fn user(key: impl Into<SmolStr>) -> Self {
        Self::new(key, FieldType::User)
    }

    /// Link field.
    pub fn link(key: impl Into<SmolStr>) -> Self {
        Self::new(key, FieldType::Link)
    }

    /// Colour field.
    pub fn colour(key: impl Into<SmolStr>) -> Self {
        Self::new(key, FieldType::Colour)
    }

    /// Date-and-time field.
    pub fn date_time(key: impl Into<SmolStr>) -> Self {
        Self::new(key, FieldType::DateTime)
    }

    /// Arbitrary JSON field.
    pub fn json(key: impl Into<SmolStr>) -> Self {
        Self::new(key, FieldType::Json)
    }

    /// Repeater field; its child fields are declared in the layout tree.
    pub fn repeater(key: impl Into<SmolStr>) -> Self {
        Self::new(key, FieldType::Repeater)
    }

    /// Tab grouping; its child fields flatten into the owner.
    pub fn tab(key: impl Into<SmolStr>) -> Self {
        Self::new(key, FieldType::Tab)
    }

    /// Get the field key as a string slice.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Mark the field as required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Set a user-configured default value.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// The relational column shapes this field contributes to its owner's
    /// table. Structural fields (repeater, tab) contribute none.
    ///
    /// The adapter parameter keeps the contract uniform across field kinds;
    /// the built-in shapes are dialect-independent, but custom field crates
    /// may consult adapter capabilities here.
    pub fn schema_definition(&self, _adapter: &dyn DatabaseAdapter) -> SchemaDefinition {
        let nullable = !self.required;
        let shape = |data_type, default: Option<Value>, foreign_key| FieldColumnShape {
            name_suffix: None,
            data_type,
            nullable,
            default: self.default.clone().or(default),
            foreign_key,
        };

        let columns = match self.field_type {
            FieldType::Text
            | FieldType::Textarea
            | FieldType::Wysiwyg
            | FieldType::Select
            | FieldType::Link
            | FieldType::Colour => vec![shape(ColumnDataType::Text, None, None)],
            FieldType::Number => vec![shape(ColumnDataType::Integer, None, None)],
            FieldType::Checkbox => vec![shape(ColumnDataType::Boolean, Some(json!(false)), None)],
            FieldType::DateTime => vec![shape(ColumnDataType::Timestamp, None, None)],
            FieldType::Json => vec![shape(ColumnDataType::Json, None, None)],
            FieldType::Media => vec![shape(
                ColumnDataType::Integer,
                None,
                Some(ForeignKeyRef::set_null(MEDIA_TABLE, "id")),
            )],
            FieldType::User => vec![shape(
                ColumnDataType::Integer,
                None,
                Some(ForeignKeyRef::set_null(USERS_TABLE, "id")),
            )],
            FieldType::Repeater | FieldType::Tab => Vec::new(),
        };

        SchemaDefinition { columns }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::adapter::SqliteAdapter;

    #[test]
    fn test_text_field_shape() {
        let def = FieldDefinition::text("title").schema_definition(&SqliteAdapter);
        assert_eq!(def.columns.len(), 1);
        assert_eq!(def.columns[0].data_type, ColumnDataType::Text);
        assert!(def.columns[0].nullable);
        assert!(def.columns[0].foreign_key.is_none());
        assert!(def.columns[0].name_suffix.is_none());
    }

    #[test]
    fn test_required_field_is_not_nullable() {
        let def = FieldDefinition::number("count")
            .required(true)
            .schema_definition(&SqliteAdapter);
        assert!(!def.columns[0].nullable);
    }

    #[test]
    fn test_checkbox_defaults_false() {
        let def = FieldDefinition::checkbox("featured").schema_definition(&SqliteAdapter);
        assert_eq!(def.columns[0].default, Some(json!(false)));
    }

    #[test]
    fn test_user_default_overrides_type_default() {
        let def = FieldDefinition::checkbox("featured")
            .default_value(json!(true))
            .schema_definition(&SqliteAdapter);
        assert_eq!(def.columns[0].default, Some(json!(true)));
    }

    #[test]
    fn test_media_field_references_media_table() {
        let def = FieldDefinition::media("cover").schema_definition(&SqliteAdapter);
        let fk = def.columns[0].foreign_key.as_ref().unwrap();
        assert_eq!(fk.table, MEDIA_TABLE);
        assert_eq!(fk.column, "id");
    }

    #[test]
    fn test_structural_fields_have_no_columns() {
        assert!(FieldDefinition::repeater("items")
            .schema_definition(&SqliteAdapter)
            .columns
            .is_empty());
        assert!(FieldDefinition::tab("seo")
            .schema_definition(&SqliteAdapter)
            .columns
            .is_empty());
    }
}

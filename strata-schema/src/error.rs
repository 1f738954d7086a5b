//! Error types for collection definition and validation.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur while defining or validating collections.
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    /// Invalid collection, brick, or field key.
    #[error("invalid key `{key}`: {message}")]
    #[diagnostic(code(strata::schema::invalid_key))]
    InvalidKey { key: String, message: String },

    /// A brick uses a key reserved for structural tables.
    #[error("brick key `{key}` is reserved")]
    #[diagnostic(code(strata::schema::reserved_key))]
    ReservedKey { key: String },

    /// The same field key was registered twice on one owner.
    #[error("duplicate field `{field}` in `{owner}`")]
    #[diagnostic(code(strata::schema::duplicate_field))]
    DuplicateField { owner: String, field: String },

    /// A layout node references a key with no registered field.
    #[error("layout references unknown field `{field}` in `{owner}`")]
    #[diagnostic(code(strata::schema::unknown_layout_field))]
    UnknownLayoutField { owner: String, field: String },

    /// A repeater was declared without any child fields.
    #[error("repeater `{field}` in `{owner}` has no child fields")]
    #[diagnostic(code(strata::schema::empty_repeater))]
    EmptyRepeater { owner: String, field: String },

    /// A tab was nested inside a repeater group.
    #[error("tab `{field}` in `{owner}` cannot be nested inside a repeater")]
    #[diagnostic(code(strata::schema::nested_tab))]
    NestedTab { owner: String, field: String },

    /// A layout node declares children on a field type that takes none.
    #[error("field `{field}` in `{owner}` is not a repeater or tab but has children")]
    #[diagnostic(code(strata::schema::unexpected_children))]
    UnexpectedChildren { owner: String, field: String },

    /// Validation error with multiple issues.
    #[error("collection validation failed with {count} error(s)")]
    #[diagnostic(code(strata::schema::validation_failed))]
    ValidationFailed {
        count: usize,
        #[related]
        errors: Vec<SchemaError>,
    },
}

impl SchemaError {
    /// Create an invalid key error.
    pub fn invalid_key(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate field error.
    pub fn duplicate_field(owner: impl Into<String>, field: impl Into<String>) -> Self {
        Self::DuplicateField {
            owner: owner.into(),
            field: field.into(),
        }
    }

    /// Create an unknown layout field error.
    pub fn unknown_layout_field(owner: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownLayoutField {
            owner: owner.into(),
            field: field.into(),
        }
    }

    /// Create an empty repeater error.
    pub fn empty_repeater(owner: impl Into<String>, field: impl Into<String>) -> Self {
        Self::EmptyRepeater {
            owner: owner.into(),
            field: field.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_display() {
        let err = SchemaError::invalid_key("Blog Posts", "keys must be snake_case");
        let display = format!("{}", err);
        assert!(display.contains("Blog Posts"));
        assert!(display.contains("snake_case"));
    }

    #[test]
    fn test_duplicate_field_display() {
        let err = SchemaError::duplicate_field("hero", "title");
        let display = format!("{}", err);
        assert!(display.contains("hero"));
        assert!(display.contains("title"));
    }

    #[test]
    fn test_validation_failed_display() {
        let err = SchemaError::ValidationFailed {
            count: 2,
            errors: vec![
                SchemaError::duplicate_field("blog", "title"),
                SchemaError::empty_repeater("blog", "items"),
            ],
        };
        assert!(err.to_string().contains("2"));
    }
}

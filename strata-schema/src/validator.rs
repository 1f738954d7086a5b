//! Validation for collection and brick definitions.
//!
//! Builders run these checks from `build()`, and hand-constructed
//! definitions can be validated explicitly before compilation.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::collection::{Brick, Collection, FieldNode};
use crate::error::{SchemaError, SchemaResult};
use crate::field::{FieldDefinition, FieldType};

/// Brick keys that would collide with structural table-name segments.
const RESERVED_BRICK_KEYS: &[&str] = &["fields", "versions"];

fn key_pattern() -> &'static Regex {
    static KEY_RE: OnceLock<Regex> = OnceLock::new();
    KEY_RE.get_or_init(|| Regex::new("^[a-z][a-z0-9_]*$").expect("key pattern compiles"))
}

/// Check a collection, brick, or field key against the naming rules.
///
/// Keys are snake_case and may not contain a double underscore, which is the
/// separator in generated table names.
pub fn validate_key(key: &str) -> Option<SchemaError> {
    if !key_pattern().is_match(key) {
        return Some(SchemaError::invalid_key(
            key,
            "keys must be snake_case: lowercase letters, digits, underscores",
        ));
    }
    if key.contains("__") {
        return Some(SchemaError::invalid_key(
            key,
            "keys may not contain a double underscore",
        ));
    }
    None
}

/// Validate a collection in place, appending problems to `errors`.
pub fn validate_collection(collection: &Collection, errors: &mut Vec<SchemaError>) {
    errors.extend(validate_key(&collection.key));

    for key in collection.fields.keys() {
        errors.extend(validate_key(key));
    }
    validate_field_set(
        &collection.key,
        &collection.fields,
        &collection.layout,
        false,
        errors,
    );

    let mut seen = Vec::with_capacity(collection.bricks.len());
    for brick in &collection.bricks {
        if seen.contains(&brick.key.as_str()) {
            errors.push(SchemaError::duplicate_field(
                collection.key.as_str(),
                brick.key.as_str(),
            ));
        }
        seen.push(brick.key.as_str());
        validate_brick(brick, errors);
    }
}

/// Validate a brick in place, appending problems to `errors`.
pub fn validate_brick(brick: &Brick, errors: &mut Vec<SchemaError>) {
    errors.extend(validate_key(&brick.key));
    if RESERVED_BRICK_KEYS.contains(&brick.key.as_str()) {
        errors.push(SchemaError::ReservedKey {
            key: brick.key.to_string(),
        });
    }
    for key in brick.fields.keys() {
        errors.extend(validate_key(key));
    }
    validate_field_set(&brick.key, &brick.fields, &brick.layout, false, errors);
}

fn validate_field_set(
    owner: &str,
    fields: &indexmap::IndexMap<smol_str::SmolStr, FieldDefinition>,
    layout: &[FieldNode],
    in_repeater: bool,
    errors: &mut Vec<SchemaError>,
) {
    for node in layout {
        let Some(field) = fields.get(&node.key) else {
            errors.push(SchemaError::unknown_layout_field(owner, node.key.as_str()));
            continue;
        };
        match field.field_type {
            FieldType::Repeater => {
                if node.children.is_empty() {
                    errors.push(SchemaError::empty_repeater(owner, node.key.as_str()));
                }
                validate_field_set(owner, fields, &node.children, true, errors);
            }
            FieldType::Tab => {
                if in_repeater {
                    errors.push(SchemaError::NestedTab {
                        owner: owner.to_string(),
                        field: node.key.to_string(),
                    });
                }
                validate_field_set(owner, fields, &node.children, in_repeater, errors);
            }
            _ => {
                if !node.children.is_empty() {
                    errors.push(SchemaError::UnexpectedChildren {
                        owner: owner.to_string(),
                        field: node.key.to_string(),
                    });
                }
            }
        }
    }
}

/// Collapse collected validation errors into a result.
pub fn finish(mut errors: Vec<SchemaError>) -> SchemaResult<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        count => Err(SchemaError::ValidationFailed { count, errors }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{BrickMode, Collection};
    use crate::field::FieldDefinition;

    #[test]
    fn test_key_syntax() {
        assert!(validate_key("blog").is_none());
        assert!(validate_key("blog_posts").is_none());
        assert!(validate_key("Blog").is_some());
        assert!(validate_key("blog posts").is_some());
        assert!(validate_key("émoji").is_some());
        assert!(validate_key("_leading").is_some());
        assert!(validate_key("blog__posts").is_some());
    }

    #[test]
    fn test_reserved_brick_key_rejected() {
        let err = crate::collection::Brick::builder("fields", BrickMode::Fixed)
            .field(FieldDefinition::text("title"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::ReservedKey { .. }));
    }

    #[test]
    fn test_duplicate_brick_keys_rejected() {
        let hero = |mode| {
            crate::collection::Brick::builder("hero", mode)
                .field(FieldDefinition::text("heading"))
                .build()
                .unwrap()
        };
        let err = Collection::builder("blog")
            .brick(hero(BrickMode::Fixed))
            .brick(hero(BrickMode::Builder))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { .. }));
    }

    #[test]
    fn test_empty_repeater_rejected() {
        let err = Collection::builder("blog")
            .repeater("items", |r| r)
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::EmptyRepeater { .. }));
    }

    #[test]
    fn test_hand_built_layout_with_unknown_key() {
        // Builders keep registry and layout consistent; a hand-assembled
        // collection can drift, which validation must catch.
        let mut collection = Collection::builder("blog")
            .field(FieldDefinition::text("title"))
            .build()
            .unwrap();
        collection.layout.push(FieldNode::leaf("ghost"));

        let mut errors = Vec::new();
        validate_collection(&collection, &mut errors);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], SchemaError::UnknownLayoutField { .. }));
    }

    #[test]
    fn test_multiple_errors_collapse_to_validation_failed() {
        let mut errors = vec![
            SchemaError::duplicate_field("blog", "a"),
            SchemaError::empty_repeater("blog", "b"),
        ];
        errors.extend(validate_key("ok"));
        let err = finish(errors).unwrap_err();
        assert!(matches!(err, SchemaError::ValidationFailed { count: 2, .. }));
    }
}

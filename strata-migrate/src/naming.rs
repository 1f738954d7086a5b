//! Deterministic table and column naming.
//!
//! Table names are a pure function of the structural [`TableKey`], so
//! recompiling the same collection always produces identical names, and a
//! live table name can be parsed back into its key. Field-generated columns
//! go through a single reversible prefix so a field key can never collide
//! with a core column name.

use smol_str::{SmolStr, format_smolstr};

use crate::schema::{TableKey, TableType};

/// Prefix shared by every generated document-storage table.
pub const DOCUMENT_TABLE_PREFIX: &str = "strata_document__";

/// Segment separator inside generated table names. Definition keys may not
/// contain it (enforced by `strata_schema::validator`).
const SEPARATOR: &str = "__";

/// Prefix applied to every field-generated column.
const FIELD_COLUMN_PREFIX: &str = "_";

/// Name of a collection's document table.
pub fn document_table_name(collection: &str) -> SmolStr {
    format_smolstr!("{DOCUMENT_TABLE_PREFIX}{collection}")
}

/// Name of a collection's version table.
pub fn version_table_name(collection: &str) -> SmolStr {
    format_smolstr!("{DOCUMENT_TABLE_PREFIX}{collection}{SEPARATOR}versions")
}

/// Derive the table name for a compiled table key.
///
/// Template: `strata_document__{collection}__fields` for document-fields,
/// `strata_document__{collection}__{brick}` for bricks, and the owner name
/// plus the `__`-joined repeater key path for repeater tables.
pub fn table_name(key: &TableKey) -> SmolStr {
    let mut name = String::from(DOCUMENT_TABLE_PREFIX);
    name.push_str(&key.collection);
    name.push_str(SEPARATOR);
    match &key.brick {
        Some(brick) => name.push_str(brick),
        None => name.push_str("fields"),
    }
    for repeater in &key.repeater {
        name.push_str(SEPARATOR);
        name.push_str(repeater);
    }
    SmolStr::from(name)
}

/// Recover the structural key and type from a Strata-generated table name.
///
/// Returns `None` for tables the engine did not name; those are never
/// candidates for removal or priority assignment.
pub fn parse_table_name(name: &str) -> Option<(TableKey, TableType)> {
    let rest = name.strip_prefix(DOCUMENT_TABLE_PREFIX)?;
    let mut segments = rest.split(SEPARATOR);
    let collection = SmolStr::from(segments.next()?);
    if collection.is_empty() {
        return None;
    }

    let Some(owner) = segments.next() else {
        // Bare document table: strata_document__{collection}
        return Some((TableKey::document_fields(collection), TableType::Document));
    };

    let (key, table_type) = match owner {
        "" => return None,
        "versions" => (TableKey::document_fields(collection), TableType::Versions),
        "fields" => (TableKey::document_fields(collection), TableType::DocumentFields),
        brick => (TableKey::brick(collection, brick), TableType::Brick),
    };

    let repeater: Vec<SmolStr> = segments.map(SmolStr::from).collect();
    if repeater.is_empty() {
        return Some((key, table_type));
    }
    if repeater.iter().any(|r| r.is_empty()) || table_type == TableType::Versions {
        return None;
    }

    let mut key = key;
    key.repeater = repeater;
    Some((key, TableType::Repeater))
}

/// Column name for a custom field, via the reversible prefix scheme.
pub fn field_column_name(field_key: &str) -> SmolStr {
    format_smolstr!("{FIELD_COLUMN_PREFIX}{field_key}")
}

/// Recover the field key from a prefixed column name. Returns `None` for
/// core columns, which never carry the prefix.
pub fn field_key_from_column(column_name: &str) -> Option<&str> {
    column_name.strip_prefix(FIELD_COLUMN_PREFIX)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_table_name_templates() {
        assert_eq!(
            table_name(&TableKey::document_fields("blog")),
            "strata_document__blog__fields"
        );
        assert_eq!(
            table_name(&TableKey::brick("blog", "hero")),
            "strata_document__blog__hero"
        );
        assert_eq!(
            table_name(
                &TableKey::brick("blog", "hero")
                    .child_repeater("items")
                    .child_repeater("nested_items")
            ),
            "strata_document__blog__hero__items__nested_items"
        );
        assert_eq!(
            table_name(&TableKey::document_fields("blog").child_repeater("links")),
            "strata_document__blog__fields__links"
        );
    }

    #[test]
    fn test_table_name_is_pure_function_of_key() {
        let a = TableKey::brick("blog", "hero").child_repeater("items");
        let b = TableKey::brick("blog", "hero").child_repeater("items");
        assert_eq!(table_name(&a), table_name(&b));
    }

    #[test]
    fn test_parse_round_trip() {
        for key in [
            TableKey::document_fields("blog"),
            TableKey::brick("blog", "hero"),
            TableKey::brick("blog", "hero").child_repeater("items"),
            TableKey::document_fields("blog")
                .child_repeater("links")
                .child_repeater("sub_links"),
        ] {
            let name = table_name(&key);
            let (parsed, _) = parse_table_name(&name).unwrap();
            assert_eq!(parsed, key, "round trip failed for {name}");
        }
    }

    #[test]
    fn test_parse_document_and_versions() {
        let (_, t) = parse_table_name("strata_document__blog").unwrap();
        assert_eq!(t, TableType::Document);
        let (_, t) = parse_table_name("strata_document__blog__versions").unwrap();
        assert_eq!(t, TableType::Versions);
        let (_, t) = parse_table_name("strata_document__blog__fields").unwrap();
        assert_eq!(t, TableType::DocumentFields);
    }

    #[test]
    fn test_parse_foreign_tables() {
        assert!(parse_table_name("users").is_none());
        assert!(parse_table_name("strata_collections").is_none());
        assert!(parse_table_name("strata_document__").is_none());
    }

    #[test]
    fn test_field_column_prefix_round_trip() {
        let name = field_column_name("id");
        assert_eq!(name, "_id");
        assert_eq!(field_key_from_column(&name), Some("id"));
        assert_eq!(field_key_from_column("position"), None);
    }
}

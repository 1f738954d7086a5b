//! Column modification resolution.
//!
//! Given a compiled target column and its live counterpart, decides whether
//! anything meaningful changed and, if so, whether the target adapter can
//! apply the change in place or must destructively replace the column.

use serde::{Deserialize, Serialize};

use strata_schema::{Capability, DatabaseAdapter};

use crate::normalise::{normalise_inferred_column, normalise_schema_column};
use crate::schema::{CollectionSchemaColumn, ColumnSource, InferredColumn};

/// Which aspects of a column differ between live and compiled state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnChanges {
    /// The canonical type token differs.
    pub data_type: bool,
    /// Nullability differs.
    pub nullable: bool,
    /// The canonical default differs.
    pub default: bool,
    /// The foreign-key descriptor differs.
    pub foreign_key: bool,
}

impl ColumnChanges {
    /// Whether any aspect changed.
    pub fn any(&self) -> bool {
        self.data_type || self.nullable || self.default || self.foreign_key
    }

    /// Whether the default is the only changed aspect.
    pub fn default_only(&self) -> bool {
        self.default && !self.data_type && !self.nullable && !self.foreign_key
    }
}

/// A resolved difference: the target column plus what changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnModification {
    /// The column as it should end up.
    pub column: CollectionSchemaColumn,
    /// The changed aspects.
    pub changes: ColumnChanges,
}

/// How a modification is applied on the target dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModStrategy {
    /// Single in-place `ALTER COLUMN`.
    Alter,
    /// Destructive replacement: drop the column, then re-add it.
    DropAndAdd,
    /// Leave the live column untouched.
    Skip,
}

/// Compare a compiled column with its live counterpart.
///
/// Both sides are normalized through the target adapter before comparison,
/// so dialect type spellings and default encodings never register as
/// changes. Returns `None` when no meaningful difference exists.
pub fn determine_column_mods(
    target: &CollectionSchemaColumn,
    existing: &InferredColumn,
    adapter: &dyn DatabaseAdapter,
) -> Option<ColumnModification> {
    let target_norm = normalise_schema_column(target, adapter);
    let existing_norm = normalise_inferred_column(existing);

    let changes = ColumnChanges {
        data_type: target_norm.data_type != existing_norm.data_type,
        nullable: target_norm.nullable != existing_norm.nullable,
        default: target_norm.default != existing_norm.default,
        foreign_key: target_norm.foreign_key != existing_norm.foreign_key,
    };

    if !changes.any() {
        return None;
    }
    Some(ColumnModification {
        column: target.clone(),
        changes,
    })
}

/// Classify how the target adapter must apply a modification.
///
/// Adapters without [`Capability::AlterColumn`] (SQLite-family) cannot change
/// type, nullability, or foreign keys in place, so those changes become a
/// destructive drop-and-add. A default-only change on a custom-field column
/// is skipped on such adapters rather than destroying data over a cosmetic
/// change; core columns still drop-and-add.
pub fn determine_mod_strategy(
    modification: &ColumnModification,
    adapter: &dyn DatabaseAdapter,
) -> ModStrategy {
    if adapter.supports(Capability::AlterColumn) {
        return ModStrategy::Alter;
    }
    if modification.changes.default_only() && modification.column.source == ColumnSource::Field {
        tracing::debug!(
            column = %modification.column.name,
            "skipping default-only change on adapter without alter-column support"
        );
        return ModStrategy::Skip;
    }
    tracing::warn!(
        column = %modification.column.name,
        dialect = adapter.dialect(),
        "column change requires destructive drop-and-add"
    );
    ModStrategy::DropAndAdd
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use smol_str::SmolStr;

    use strata_schema::{ColumnDataType, ForeignKeyRef, PostgresAdapter, SqliteAdapter};

    use super::*;

    fn target(data_type: ColumnDataType) -> CollectionSchemaColumn {
        CollectionSchemaColumn {
            name: SmolStr::new_static("_title"),
            source: ColumnSource::Field,
            data_type,
            nullable: true,
            primary: false,
            default: None,
            foreign_key: None,
            field_type: None,
        }
    }

    fn live(data_type: &str) -> InferredColumn {
        InferredColumn {
            name: SmolStr::new_static("_title"),
            data_type: data_type.into(),
            nullable: true,
            default: None,
            foreign_key: None,
        }
    }

    #[test]
    fn test_identical_columns_yield_no_modification() {
        let m = determine_column_mods(
            &target(ColumnDataType::Text),
            &live("varchar(255)"),
            &PostgresAdapter,
        );
        assert_eq!(m, None);
    }

    #[test]
    fn test_type_change_detected() {
        let m = determine_column_mods(
            &target(ColumnDataType::Integer),
            &live("text"),
            &PostgresAdapter,
        )
        .unwrap();
        assert!(m.changes.data_type);
        assert!(!m.changes.nullable);
        assert!(!m.changes.default_only());
    }

    #[test]
    fn test_nullability_change_detected() {
        let mut t = target(ColumnDataType::Text);
        t.nullable = false;
        let m = determine_column_mods(&t, &live("text"), &PostgresAdapter).unwrap();
        assert!(m.changes.nullable);
        assert!(!m.changes.data_type);
    }

    #[test]
    fn test_foreign_key_change_detected() {
        let mut t = target(ColumnDataType::Integer);
        t.foreign_key = Some(ForeignKeyRef::set_null("strata_media", "id"));
        let m = determine_column_mods(&t, &live("integer"), &PostgresAdapter).unwrap();
        assert!(m.changes.foreign_key);
    }

    #[test]
    fn test_alter_capable_adapter_classifies_alter() {
        let m = determine_column_mods(
            &target(ColumnDataType::Integer),
            &live("text"),
            &PostgresAdapter,
        )
        .unwrap();
        assert_eq!(determine_mod_strategy(&m, &PostgresAdapter), ModStrategy::Alter);
    }

    #[test]
    fn test_type_change_on_sqlite_is_drop_and_add() {
        let m = determine_column_mods(
            &target(ColumnDataType::Json),
            &live("integer"),
            &SqliteAdapter,
        )
        .unwrap();
        assert_eq!(
            determine_mod_strategy(&m, &SqliteAdapter),
            ModStrategy::DropAndAdd
        );
    }

    #[test]
    fn test_default_only_change_on_sqlite_field_column_is_skipped() {
        let mut t = target(ColumnDataType::Text);
        t.default = Some(json!("draft"));
        let m = determine_column_mods(&t, &live("text"), &SqliteAdapter).unwrap();
        assert!(m.changes.default_only());
        assert_eq!(determine_mod_strategy(&m, &SqliteAdapter), ModStrategy::Skip);
    }

    #[test]
    fn test_default_only_change_on_core_column_still_drops() {
        let mut t = target(ColumnDataType::Integer);
        t.name = SmolStr::new_static("position");
        t.source = ColumnSource::Core;
        t.default = Some(json!(10));
        let live = InferredColumn {
            name: SmolStr::new_static("position"),
            data_type: "integer".into(),
            nullable: true,
            default: Some("0".into()),
            foreign_key: None,
        };
        let m = determine_column_mods(&t, &live, &SqliteAdapter).unwrap();
        assert!(m.changes.default_only());
        assert_eq!(
            determine_mod_strategy(&m, &SqliteAdapter),
            ModStrategy::DropAndAdd
        );
    }
}

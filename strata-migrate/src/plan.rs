//! Migration plan generation.
//!
//! Compares a compiled schema forest against the live introspected schema
//! and produces an ordered, serializable plan of table and column
//! operations. Plan generation is pure: it is safe to run speculatively for
//! a dry-run or "needs migration" check.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use strata_schema::DatabaseAdapter;

use crate::error::MigrateResult;
use crate::modify::{ColumnChanges, ModStrategy, determine_column_mods, determine_mod_strategy};
use crate::naming;
use crate::priority::table_priority;
use crate::schema::{
    CollectionSchema, CollectionSchemaColumn, CollectionSchemaTable, InferredTable, TableKey,
    TableType,
};

/// Data-safety policy for destructive operations.
///
/// Both toggles default to off: a schema edit never silently deletes
/// content. Stale columns and tables are simply left in place until an
/// operator opts in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationPolicy {
    /// Drop columns no longer present in the compiled schema.
    pub drop_columns: bool,
    /// Drop Strata-named tables no longer present in the compiled schema.
    pub drop_tables: bool,
}

impl MigrationPolicy {
    /// Create the default (fully non-destructive) policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow dropping stale columns.
    pub fn drop_columns(mut self, drop: bool) -> Self {
        self.drop_columns = drop;
        self
    }

    /// Allow dropping stale tables.
    pub fn drop_tables(mut self, drop: bool) -> Self {
        self.drop_tables = drop;
        self
    }
}

/// One column-level operation inside a table migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ColumnOperation {
    /// Add a new column.
    Add {
        /// The column to add.
        column: CollectionSchemaColumn,
    },
    /// Alter an existing column in place.
    Modify {
        /// The column as it should end up.
        column: CollectionSchemaColumn,
        /// Which aspects changed.
        changes: ColumnChanges,
    },
    /// Drop a column.
    Remove {
        /// Name of the column to drop.
        column_name: SmolStr,
    },
}

/// What happens to one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableMigrationKind {
    /// Create the table with all its columns.
    Create,
    /// Alter an existing table.
    Modify,
    /// Drop a stale table.
    Remove,
}

/// One table-level entry of a migration plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMigration {
    /// Operation kind.
    pub kind: TableMigrationKind,
    /// Table name.
    pub table_name: SmolStr,
    /// Structural role, when known.
    pub table_type: Option<TableType>,
    /// Structural key, when known.
    pub key: Option<TableKey>,
    /// Dependency rank; creates apply ascending, removals descending.
    pub priority: u32,
    /// Column operations, empty for removals.
    pub column_operations: Vec<ColumnOperation>,
}

/// The engine's sole output: an ordered set of table and column operations.
///
/// Pure data with no open resources, so it can be serialized, logged, or
/// inspected before the executor applies it inside a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationPlan {
    /// The collection this plan belongs to.
    pub collection_key: SmolStr,
    /// Table migrations, sorted by priority.
    pub tables: Vec<TableMigration>,
}

impl MigrationPlan {
    /// Whether the live schema already matches the compiled schema.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Human-readable summary of the plan.
    pub fn summary(&self) -> String {
        let count = |kind| {
            self.tables
                .iter()
                .filter(|t| t.kind == kind)
                .count()
        };
        let mut parts = Vec::new();
        let creates = count(TableMigrationKind::Create);
        let modifies = count(TableMigrationKind::Modify);
        let removes = count(TableMigrationKind::Remove);
        if creates > 0 {
            parts.push(format!("create {creates} tables"));
        }
        if modifies > 0 {
            parts.push(format!("modify {modifies} tables"));
        }
        if removes > 0 {
            parts.push(format!("remove {removes} tables"));
        }
        if parts.is_empty() {
            format!("{}: no changes", self.collection_key)
        } else {
            format!("{}: {}", self.collection_key, parts.join(", "))
        }
    }
}

/// Generates migration plans for one target adapter and policy.
pub struct MigrationPlanner<'a> {
    adapter: &'a dyn DatabaseAdapter,
    policy: MigrationPolicy,
}

impl<'a> MigrationPlanner<'a> {
    /// Create a planner with the default non-destructive policy.
    pub fn new(adapter: &'a dyn DatabaseAdapter) -> Self {
        Self {
            adapter,
            policy: MigrationPolicy::default(),
        }
    }

    /// Override the data-safety policy.
    pub fn with_policy(mut self, policy: MigrationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Compute the plan that evolves `existing` toward `schema`.
    ///
    /// Never fails for "no changes needed"; the only failure mode is a
    /// malformed structural key during priority resolution, which aborts
    /// the whole plan.
    pub fn plan(
        &self,
        existing: &[InferredTable],
        schema: &CollectionSchema,
    ) -> MigrateResult<MigrationPlan> {
        let mut tables = Vec::new();

        if existing.is_empty() {
            // Bootstrap: first synchronization of this collection.
            for table in &schema.tables {
                tables.push(self.create_table(table)?);
            }
        } else {
            let live: HashMap<&str, &InferredTable> =
                existing.iter().map(|t| (t.name.as_str(), t)).collect();

            for table in &schema.tables {
                match live.get(table.name.as_str()) {
                    None => tables.push(self.create_table(table)?),
                    Some(existing_table) => {
                        if let Some(migration) = self.modify_table(table, existing_table)? {
                            tables.push(migration);
                        }
                    }
                }
            }

            tables.extend(self.stale_tables(existing, schema)?);
        }

        // Stable sort keeps compile order within one priority rank.
        tables.sort_by_key(|t| t.priority);

        let plan = MigrationPlan {
            collection_key: schema.key.clone(),
            tables,
        };
        tracing::debug!(summary = %plan.summary(), "generated migration plan");
        Ok(plan)
    }

    fn create_table(&self, table: &CollectionSchemaTable) -> MigrateResult<TableMigration> {
        Ok(TableMigration {
            kind: TableMigrationKind::Create,
            table_name: table.name.clone(),
            table_type: Some(table.table_type),
            key: Some(table.key.clone()),
            priority: table_priority(table.table_type, &table.key)?,
            column_operations: table
                .columns
                .iter()
                .map(|column| ColumnOperation::Add {
                    column: column.clone(),
                })
                .collect(),
        })
    }

    fn modify_table(
        &self,
        table: &CollectionSchemaTable,
        existing: &InferredTable,
    ) -> MigrateResult<Option<TableMigration>> {
        let mut operations = Vec::new();

        for column in &table.columns {
            match existing.column(&column.name) {
                None => operations.push(ColumnOperation::Add {
                    column: column.clone(),
                }),
                Some(live) => {
                    let Some(modification) = determine_column_mods(column, live, self.adapter)
                    else {
                        continue;
                    };
                    match determine_mod_strategy(&modification, self.adapter) {
                        ModStrategy::Alter => operations.push(ColumnOperation::Modify {
                            column: modification.column,
                            changes: modification.changes,
                        }),
                        ModStrategy::DropAndAdd => {
                            operations.push(ColumnOperation::Remove {
                                column_name: column.name.clone(),
                            });
                            operations.push(ColumnOperation::Add {
                                column: modification.column,
                            });
                        }
                        ModStrategy::Skip => {}
                    }
                }
            }
        }

        operations.extend(self.stale_columns(table, existing));

        if operations.is_empty() {
            return Ok(None);
        }
        Ok(Some(TableMigration {
            kind: TableMigrationKind::Modify,
            table_name: table.name.clone(),
            table_type: Some(table.table_type),
            key: Some(table.key.clone()),
            priority: table_priority(table.table_type, &table.key)?,
            column_operations: operations,
        }))
    }

    /// Live columns no longer present in the compiled table. Only
    /// field-prefixed columns are ever dropped, and only when the policy
    /// allows it.
    fn stale_columns(
        &self,
        table: &CollectionSchemaTable,
        existing: &InferredTable,
    ) -> Vec<ColumnOperation> {
        let mut operations = Vec::new();
        for live in &existing.columns {
            if table.column(&live.name).is_some() {
                continue;
            }
            if naming::field_key_from_column(&live.name).is_none() {
                continue;
            }
            if !self.policy.drop_columns {
                tracing::warn!(
                    table = %table.name,
                    column = %live.name,
                    "stale column left in place (column removal disabled by policy)"
                );
                continue;
            }
            operations.push(ColumnOperation::Remove {
                column_name: live.name.clone(),
            });
        }
        operations
    }

    /// Live Strata tables for this collection with no compiled counterpart.
    fn stale_tables(
        &self,
        existing: &[InferredTable],
        schema: &CollectionSchema,
    ) -> MigrateResult<Vec<TableMigration>> {
        let mut removals = Vec::new();
        for live in existing {
            if schema.table(&live.name).is_some() {
                continue;
            }
            // Only tables this collection's compiler would have named are
            // candidates; the engine never drops tables it did not create.
            let Some((key, table_type)) = naming::parse_table_name(&live.name) else {
                continue;
            };
            if key.collection != schema.key
                || matches!(table_type, TableType::Document | TableType::Versions)
            {
                continue;
            }
            if !self.policy.drop_tables {
                tracing::warn!(
                    table = %live.name,
                    "stale table left in place (table removal disabled by policy)"
                );
                continue;
            }
            removals.push(TableMigration {
                kind: TableMigrationKind::Remove,
                table_name: live.name.clone(),
                table_type: Some(table_type),
                key: Some(key.clone()),
                priority: table_priority(table_type, &key)?,
                column_operations: Vec::new(),
            });
        }
        Ok(removals)
    }
}

/// Cheap "does this collection need migrating" check: generates the plan
/// without executing anything and reports whether it is non-empty.
pub fn requires_migration(
    existing: &[InferredTable],
    schema: &CollectionSchema,
    adapter: &dyn DatabaseAdapter,
) -> MigrateResult<bool> {
    let plan = MigrationPlanner::new(adapter).plan(existing, schema)?;
    Ok(!plan.is_empty())
}

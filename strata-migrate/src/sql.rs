//! SQL generation for migration plans.
//!
//! Renders a [`MigrationPlan`] into executable DDL statements. Type
//! spellings and default encodings come from the target
//! [`DatabaseAdapter`], so the same plan structure renders correctly for
//! each dialect.

use serde_json::Value;

use strata_schema::{ColumnDataType, DatabaseAdapter, DefaultKey, ForeignKeyRef};

use crate::modify::ColumnChanges;
use crate::plan::{ColumnOperation, MigrationPlan, TableMigration, TableMigrationKind};
use crate::schema::CollectionSchemaColumn;

/// SQL generator for one target adapter.
pub struct SqlGenerator<'a> {
    adapter: &'a dyn DatabaseAdapter,
}

impl<'a> SqlGenerator<'a> {
    pub fn new(adapter: &'a dyn DatabaseAdapter) -> Self {
        Self { adapter }
    }

    /// Render a plan as ordered DDL statements.
    ///
    /// Creates and modifications come out in plan order (ascending
    /// priority, so parents before children). Removals come out last and
    /// deepest-first, so child tables drop before the tables their
    /// foreign keys point at.
    pub fn generate(&self, plan: &MigrationPlan) -> Vec<String> {
        let mut statements = Vec::new();

        for migration in &plan.tables {
            match migration.kind {
                TableMigrationKind::Create => statements.push(self.create_table(migration)),
                TableMigrationKind::Modify => statements.extend(self.alter_table(migration)),
                TableMigrationKind::Remove => {}
            }
        }
        for migration in plan
            .tables
            .iter()
            .rev()
            .filter(|m| m.kind == TableMigrationKind::Remove)
        {
            statements.push(self.drop_table(&migration.table_name));
        }

        statements
    }

    /// Generate CREATE TABLE statement.
    fn create_table(&self, migration: &TableMigration) -> String {
        let columns: Vec<String> = migration
            .column_operations
            .iter()
            .filter_map(|op| match op {
                ColumnOperation::Add { column } => Some(self.column_definition(column)),
                _ => None,
            })
            .collect();

        format!(
            "CREATE TABLE \"{}\" (\n    {}\n);",
            migration.table_name,
            columns.join(",\n    ")
        )
    }

    /// Generate DROP TABLE statement.
    fn drop_table(&self, name: &str) -> String {
        format!("DROP TABLE IF EXISTS \"{name}\";")
    }

    /// Generate ALTER TABLE statements for one table migration.
    fn alter_table(&self, migration: &TableMigration) -> Vec<String> {
        let mut stmts = Vec::new();

        for op in &migration.column_operations {
            match op {
                ColumnOperation::Add { column } => stmts.push(format!(
                    "ALTER TABLE \"{}\" ADD COLUMN {};",
                    migration.table_name,
                    self.column_definition(column)
                )),
                ColumnOperation::Remove { column_name } => stmts.push(format!(
                    "ALTER TABLE \"{}\" DROP COLUMN \"{}\";",
                    migration.table_name, column_name
                )),
                ColumnOperation::Modify { column, changes } => {
                    stmts.extend(self.alter_column(&migration.table_name, column, changes));
                }
            }
        }

        stmts
    }

    /// Generate ALTER COLUMN statements for an in-place modification.
    ///
    /// Only reachable on adapters that support column alteration; the
    /// planner downgrades to drop-and-add everywhere else.
    fn alter_column(
        &self,
        table: &str,
        column: &CollectionSchemaColumn,
        changes: &ColumnChanges,
    ) -> Vec<String> {
        let mut stmts = Vec::new();

        if changes.data_type {
            let sql_type = self.adapter.data_type(column.data_type);
            stmts.push(format!(
                "ALTER TABLE \"{table}\" ALTER COLUMN \"{}\" TYPE {sql_type} USING \"{}\"::{sql_type};",
                column.name, column.name
            ));
        }

        if changes.nullable {
            if column.nullable {
                stmts.push(format!(
                    "ALTER TABLE \"{table}\" ALTER COLUMN \"{}\" DROP NOT NULL;",
                    column.name
                ));
            } else {
                stmts.push(format!(
                    "ALTER TABLE \"{table}\" ALTER COLUMN \"{}\" SET NOT NULL;",
                    column.name
                ));
            }
        }

        if changes.default {
            match self.render_default(column) {
                Some(default) => stmts.push(format!(
                    "ALTER TABLE \"{table}\" ALTER COLUMN \"{}\" SET DEFAULT {default};",
                    column.name
                )),
                None => stmts.push(format!(
                    "ALTER TABLE \"{table}\" ALTER COLUMN \"{}\" DROP DEFAULT;",
                    column.name
                )),
            }
        }

        stmts
    }

    /// Generate one column definition for CREATE TABLE / ADD COLUMN.
    fn column_definition(&self, column: &CollectionSchemaColumn) -> String {
        let mut parts = vec![
            format!("\"{}\"", column.name),
            self.adapter.data_type(column.data_type).to_string(),
        ];

        if column.primary {
            parts.push("PRIMARY KEY".to_string());
        } else if !column.nullable {
            parts.push("NOT NULL".to_string());
        }

        if let Some(default) = self.render_default(column) {
            parts.push(format!("DEFAULT {default}"));
        }

        if let Some(fk) = &column.foreign_key {
            parts.push(self.references_clause(fk));
        }

        parts.join(" ")
    }

    fn references_clause(&self, fk: &ForeignKeyRef) -> String {
        format!(
            "REFERENCES \"{}\" (\"{}\") ON DELETE {}",
            fk.table,
            fk.column,
            fk.on_delete.as_sql()
        )
    }

    /// Encode a column's default through the adapter.
    fn render_default(&self, column: &CollectionSchemaColumn) -> Option<String> {
        let default = column.default.as_ref()?;
        let rendered = match default {
            Value::Bool(b) => {
                let key = if *b { DefaultKey::True } else { DefaultKey::False };
                match self.adapter.default_value(column.data_type, key) {
                    Value::String(s) => s,
                    other => other.to_string(),
                }
            }
            Value::Number(n) => n.to_string(),
            Value::String(s) if column.data_type == ColumnDataType::Timestamp => s.clone(),
            Value::String(s) => format!("'{}'", s.replace('\'', "''")),
            other => format!("'{}'", other.to_string().replace('\'', "''")),
        };
        Some(rendered)
    }
}

//! Column normalization.
//!
//! Canonicalizes a column description from either side of the diff (the
//! compiler's logical types, or a live table's raw dialect spellings) into a
//! comparable form. Both entry points are total, deterministic functions.

use serde_json::Value;
use smol_str::SmolStr;

use strata_schema::{DatabaseAdapter, DefaultKey, ForeignKeyRef};

use crate::schema::{CollectionSchemaColumn, InferredColumn};

/// A column reduced to its comparable aspects.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalisedColumn {
    /// Column name.
    pub name: SmolStr,
    /// Canonical type token (`integer`, `text`, `boolean`, `timestamp`,
    /// `json`, or the lowercased raw spelling when unrecognized).
    pub data_type: SmolStr,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Canonical default value.
    pub default: NormalisedDefault,
    /// Foreign-key descriptor, if any.
    pub foreign_key: Option<ForeignKeyRef>,
}

/// Canonical representation of a column default.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalisedDefault {
    /// No default.
    None,
    /// Logical boolean.
    Bool(bool),
    /// Integer literal.
    Integer(i64),
    /// String literal, quotes and casts stripped.
    Text(String),
    /// Current-timestamp expression (`NOW()`, `CURRENT_TIMESTAMP`, ...).
    TimestampNow,
    /// Anything else, trimmed but otherwise verbatim.
    Raw(String),
}

/// Normalize a compiled column through the target adapter's spellings.
///
/// Routing the logical type and defaults through the adapter means a column
/// compares equal to what introspection reports after this exact adapter
/// created it: a `Json` column on SQLite canonicalizes to `text`, a boolean
/// `false` default canonicalizes to `0`.
pub fn normalise_schema_column(
    column: &CollectionSchemaColumn,
    adapter: &dyn DatabaseAdapter,
) -> NormalisedColumn {
    let dialect_type = adapter.data_type(column.data_type);
    let default = match &column.default {
        None => NormalisedDefault::None,
        Some(Value::Bool(b)) => {
            let key = if *b { DefaultKey::True } else { DefaultKey::False };
            normalise_value(&adapter.default_value(column.data_type, key))
        }
        Some(value) => normalise_value(value),
    };

    NormalisedColumn {
        name: column.name.clone(),
        data_type: canonical_type(dialect_type),
        nullable: column.nullable,
        default,
        foreign_key: column.foreign_key.clone(),
    }
}

/// Normalize a live-introspected column.
pub fn normalise_inferred_column(column: &InferredColumn) -> NormalisedColumn {
    let data_type = canonical_type(&column.data_type);
    let default = match &column.default {
        None => NormalisedDefault::None,
        Some(raw) => normalise_raw_default(raw, &data_type),
    };

    NormalisedColumn {
        name: column.name.clone(),
        data_type,
        nullable: column.nullable,
        default,
        foreign_key: column.foreign_key.clone(),
    }
}

/// Map a dialect type spelling to its canonical token.
pub fn canonical_type(raw: &str) -> SmolStr {
    let lowered = raw.trim().to_ascii_lowercase();
    // Strip a length/precision suffix such as varchar(255).
    let base = lowered.split('(').next().unwrap_or(&lowered).trim_end();

    let token = match base {
        "int" | "int2" | "int4" | "int8" | "integer" | "smallint" | "bigint" | "serial"
        | "bigserial" | "smallserial" | "tinyint" => "integer",
        "text" | "varchar" | "character varying" | "character" | "char" | "clob"
        | "mediumtext" | "longtext" => "text",
        "bool" | "boolean" => "boolean",
        "timestamp" | "timestamptz" | "timestamp with time zone"
        | "timestamp without time zone" | "datetime" => "timestamp",
        "json" | "jsonb" => "json",
        other => other,
    };
    // tinyint(1) is the MySQL boolean convention.
    if base == "tinyint" && lowered.starts_with("tinyint(1)") {
        return SmolStr::new_static("boolean");
    }
    SmolStr::from(token)
}

/// Canonicalize a logical default value carried by a compiled column.
fn normalise_value(value: &Value) -> NormalisedDefault {
    match value {
        Value::Null => NormalisedDefault::None,
        Value::Bool(b) => NormalisedDefault::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => NormalisedDefault::Integer(i),
            None => NormalisedDefault::Raw(n.to_string()),
        },
        Value::String(s) if is_now_expression(s) => NormalisedDefault::TimestampNow,
        Value::String(s) => NormalisedDefault::Text(s.clone()),
        other => NormalisedDefault::Raw(other.to_string()),
    }
}

/// Canonicalize a raw default expression reported by introspection.
fn normalise_raw_default(raw: &str, data_type: &str) -> NormalisedDefault {
    let trimmed = strip_cast(raw.trim());

    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return NormalisedDefault::None;
    }
    // Serial/identity machinery is not a logical default.
    if trimmed.to_ascii_lowercase().starts_with("nextval(") {
        return NormalisedDefault::None;
    }
    if is_now_expression(trimmed) {
        return NormalisedDefault::TimestampNow;
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return NormalisedDefault::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return NormalisedDefault::Bool(false);
    }
    if let Some(inner) = strip_quotes(trimmed) {
        return NormalisedDefault::Text(inner.to_string());
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        // Dialects without a boolean affinity report boolean defaults as
        // 0/1 integers; on a boolean-typed column keep the logical token.
        if data_type == "boolean" {
            return NormalisedDefault::Bool(i != 0);
        }
        return NormalisedDefault::Integer(i);
    }
    NormalisedDefault::Raw(trimmed.to_string())
}

fn is_now_expression(s: &str) -> bool {
    let lowered = s.trim().to_ascii_lowercase();
    matches!(
        lowered.as_str(),
        "now()" | "current_timestamp" | "current_timestamp()" | "statement_timestamp()"
    )
}

/// Strip a Postgres-style `::type` cast suffix from a default expression.
fn strip_cast(raw: &str) -> &str {
    match raw.rfind("::") {
        Some(idx) => raw[..idx].trim_end(),
        None => raw,
    }
}

fn strip_quotes(raw: &str) -> Option<&str> {
    let inner = raw
        .strip_prefix('\'')
        .and_then(|r| r.strip_suffix('\''))
        .or_else(|| raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')))?;
    Some(inner)
}

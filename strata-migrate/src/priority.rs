//! Table priority resolution.
//!
//! Assigns each table a rank such that any table it can foreign-key to has a
//! strictly lower rank: document and version tables first, then brick and
//! document-fields tables, then repeater tables by nesting depth. The
//! executor applies creates in ascending and removals in descending
//! priority order.

use crate::error::{MigrateResult, MigrationError};
use crate::schema::{TableKey, TableType};

/// Priority of document and version tables.
pub const PRIORITY_DOCUMENT: u32 = 0;
/// Priority of brick and document-fields tables.
pub const PRIORITY_FIELD_HOLDER: u32 = 1;

/// Resolve the priority for a table of the given type and structural key.
///
/// Fails only when the key is inconsistent with the type: a repeater table
/// whose key carries no repeater path cannot be ordered.
pub fn table_priority(table_type: TableType, key: &TableKey) -> MigrateResult<u32> {
    match table_type {
        TableType::Document | TableType::Versions => Ok(PRIORITY_DOCUMENT),
        TableType::DocumentFields | TableType::Brick => Ok(PRIORITY_FIELD_HOLDER),
        TableType::Repeater => {
            let depth = key.depth();
            if depth == 0 {
                return Err(MigrationError::malformed_key(
                    crate::naming::table_name(key).as_str(),
                    "repeater table key has an empty repeater path",
                ));
            }
            Ok(PRIORITY_FIELD_HOLDER + depth as u32)
        }
    }
}

// SQLite Emitter

use tracing::warn;

use super::SqlEmitter;
use crate::ast::{ColumnDef, Dialect, SchemaTable};

/// Emitter for SQLite
pub struct SqliteEmitter;

impl SqliteEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SqliteEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlEmitter for SqliteEmitter {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
    }

    // AUTOINCREMENT only exists on the rowid alias, which must be declared
    // inline as INTEGER PRIMARY KEY
    fn inlines_primary_key(&self, table: &SchemaTable, column: &ColumnDef) -> bool {
        column.auto_increment
            && matches!(table.primary_key.as_slice(), [only] if only.eq_ignore_ascii_case(&column.name))
    }

    fn column_type(&self, column: &ColumnDef, inline_key: bool) -> String {
        if inline_key {
            return "INTEGER PRIMARY KEY AUTOINCREMENT".to_string();
        }
        if column.auto_increment {
            warn!(
                column = %column.name,
                "SQLite only supports AUTOINCREMENT on a single-column INTEGER PRIMARY KEY; dropped"
            );
        }
        column.type_with_length()
    }
}

// SQL Server Emitter

use super::SqlEmitter;
use crate::ast::{ColumnDef, Dialect, ReferentialAction};
use crate::identifier::ident;
use crate::value::quote_string;

/// Emitter for Microsoft SQL Server (T-SQL)
pub struct SqlServerEmitter;

impl SqlServerEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SqlServerEmitter {
    fn default() -> Self {
        Self::new()
    }
}

/// `OBJECT_ID(N'name', N'U')`
fn object_id(name: &str) -> String {
    format!("OBJECT_ID(N{}, N'U')", quote_string(name))
}

impl SqlEmitter for SqlServerEmitter {
    fn dialect(&self) -> Dialect {
        Dialect::SQLServer
    }

    fn column_type(&self, column: &ColumnDef, _inline_key: bool) -> String {
        if column.auto_increment {
            format!("{} IDENTITY(1,1)", column.type_with_length())
        } else {
            column.type_with_length()
        }
    }

    // No RESTRICT in T-SQL; NO ACTION rejects the same statements
    fn referential_action(&self, action: ReferentialAction) -> String {
        match action {
            ReferentialAction::Restrict => ReferentialAction::NoAction.to_string(),
            other => other.to_string(),
        }
    }

    /// T-SQL has no CREATE TABLE IF NOT EXISTS; guard on OBJECT_ID instead.
    fn create_table_header(&self, name: &str, if_not_exists: bool) -> String {
        let create = format!("CREATE TABLE {}", ident(name, Dialect::SQLServer));
        if if_not_exists {
            format!("IF {} IS NULL\n{}", object_id(name), create)
        } else {
            create
        }
    }

    fn emit_drop_table(&self, name: &str) -> String {
        format!(
            "IF {} IS NOT NULL DROP TABLE {};",
            object_id(name),
            ident(name, Dialect::SQLServer)
        )
    }

    fn emit_add_column(&self, table: &str, column: &ColumnDef, _after: Option<&str>) -> String {
        format!(
            "ALTER TABLE {} ADD {};",
            ident(table, Dialect::SQLServer),
            self.emit_column(column, false)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Constraint, Length, SchemaTable};
    use crate::emitter::EmitOptions;
    use pretty_assertions::assert_eq;

    fn orders() -> SchemaTable {
        SchemaTable::new(
            "orders",
            vec![
                ColumnDef::new("id", "int", None).not_null().with_auto_increment(),
                ColumnDef::new("paid", "bit", None).not_null().with_default("'0'"),
                ColumnDef::new("note", "nvarchar", Some(Length::Max)),
            ],
            vec!["id".to_string()],
            vec![Constraint::ForeignKey {
                name: None,
                columns: vec!["id".to_string()],
                ref_table: "carts".to_string(),
                ref_columns: vec!["id".to_string()],
                on_delete: Some(ReferentialAction::Restrict),
                on_update: None,
            }],
        )
    }

    #[test]
    fn test_emit_identity_and_guard() {
        let options = EmitOptions {
            create_if_not_exists: true,
            drop_if_exists: true,
            ..EmitOptions::default()
        };
        let sql = SqlServerEmitter::new().emit_create_table(&orders(), &options).unwrap();
        assert_eq!(
            sql,
            "IF OBJECT_ID(N'orders', N'U') IS NOT NULL DROP TABLE orders;\n\
             IF OBJECT_ID(N'orders', N'U') IS NULL\n\
             CREATE TABLE orders (\n\
             \x20 id int IDENTITY(1,1) NOT NULL,\n\
             \x20 paid bit NOT NULL DEFAULT 0,\n\
             \x20 note nvarchar(max),\n\
             \x20 PRIMARY KEY (id),\n\
             \x20 FOREIGN KEY (id) REFERENCES carts (id) ON DELETE NO ACTION\n\
             );"
        );
    }

    #[test]
    fn test_emit_add_column_without_keyword() {
        let column = ColumnDef::new("total", "decimal", Some(Length::Precision { precision: 12, scale: 2 }));
        assert_eq!(
            SqlServerEmitter::new().emit_add_column("orders", &column, Some("paid")),
            "ALTER TABLE orders ADD total decimal(12,2);"
        );
    }
}

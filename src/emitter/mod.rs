// SqlEmitter trait and implementations

pub mod mysql;
pub mod postgres;
pub mod sqlite;
pub mod sqlserver;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ast::{ColumnDef, Constraint, Dialect, ReferentialAction, SchemaTable};
use crate::error::EmitError;
use crate::identifier::{ident, ident_list};
use crate::value::format_default;

pub use self::mysql::MySqlEmitter;
pub use self::postgres::PostgresEmitter;
pub use self::sqlite::SqliteEmitter;
pub use self::sqlserver::SqlServerEmitter;

/// Options controlling CREATE TABLE output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitOptions {
    /// `CREATE TABLE IF NOT EXISTS` (an `OBJECT_ID` guard on SQL Server)
    pub create_if_not_exists: bool,
    /// Precede the CREATE with `DROP TABLE IF EXISTS`
    pub drop_if_exists: bool,
    /// MySQL/MariaDB storage engine
    pub engine: String,
    /// MySQL/MariaDB default character set
    pub charset: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            create_if_not_exists: false,
            drop_if_exists: false,
            engine: "InnoDB".to_string(),
            charset: "utf8mb4".to_string(),
        }
    }
}

/// Trait for emitting DDL in a specific dialect from the neutral schema model.
///
/// Column types are written as found in the table, so a table coming from
/// another dialect must go through [`crate::typemap::TypeMapper`] first.
pub trait SqlEmitter: Send + Sync {
    /// What dialect does this emitter produce?
    fn dialect(&self) -> Dialect;

    /// Type clause of a column. Autoincrement spellings that replace or
    /// directly follow the type are part of it.
    fn column_type(&self, column: &ColumnDef, _inline_key: bool) -> String {
        column.type_with_length()
    }

    /// Attributes written after NOT NULL and DEFAULT
    fn column_extras(&self, _column: &ColumnDef) -> Vec<String> {
        vec![]
    }

    /// Write `NULL` for nullable columns where the dialect's default differs
    fn explicit_null(&self, _column: &ColumnDef) -> bool {
        false
    }

    /// Whether `column` declares the primary key inline
    fn inlines_primary_key(&self, _table: &SchemaTable, _column: &ColumnDef) -> bool {
        false
    }

    /// Plain index written inside CREATE TABLE; `None` moves it to a
    /// trailing CREATE INDEX
    fn emit_inline_index(&self, _name: &str, _columns: &[String]) -> Option<String> {
        None
    }

    /// Trailing table options after the closing parenthesis
    fn table_options(&self, _options: &EmitOptions) -> String {
        String::new()
    }

    fn referential_action(&self, action: ReferentialAction) -> String {
        action.to_string()
    }

    fn create_table_header(&self, name: &str, if_not_exists: bool) -> String {
        let ine = if if_not_exists { "IF NOT EXISTS " } else { "" };
        format!("CREATE TABLE {}{}", ine, ident(name, self.dialect()))
    }

    fn emit_drop_table(&self, name: &str) -> String {
        format!("DROP TABLE IF EXISTS {};", ident(name, self.dialect()))
    }

    /// Emit a column definition (without indentation)
    fn emit_column(&self, column: &ColumnDef, inline_key: bool) -> String {
        let dialect = self.dialect();
        let mut parts = vec![
            ident(&column.name, dialect),
            self.column_type(column, inline_key),
        ];

        if !column.nullable {
            parts.push("NOT NULL".to_string());
        } else if self.explicit_null(column) {
            parts.push("NULL".to_string());
        }

        // DEFAULT value; autoincrement columns get theirs from the engine
        if let Some(default) = &column.default_value {
            if !column.auto_increment {
                parts.push(format!(
                    "DEFAULT {}",
                    format_default(default, column.normalized_type, dialect)
                ));
            }
        }

        parts.extend(self.column_extras(column));
        parts.join(" ")
    }

    /// Emit a table-level constraint, or `None` when it is written elsewhere
    fn emit_constraint(&self, constraint: &Constraint) -> Option<String> {
        let dialect = self.dialect();
        let named = |name: &Option<String>| match name {
            Some(n) => format!("CONSTRAINT {} ", ident(n, dialect)),
            None => String::new(),
        };

        match constraint {
            Constraint::Unique { name, columns } => Some(format!(
                "{}UNIQUE ({})",
                named(name),
                ident_list(columns, dialect)
            )),
            Constraint::ForeignKey {
                name,
                columns,
                ref_table,
                ref_columns,
                on_delete,
                on_update,
            } => {
                let mut fk = format!(
                    "{}FOREIGN KEY ({}) REFERENCES {}",
                    named(name),
                    ident_list(columns, dialect),
                    ident(ref_table, dialect)
                );
                if !ref_columns.is_empty() {
                    fk.push_str(&format!(" ({})", ident_list(ref_columns, dialect)));
                }
                if let Some(action) = on_delete {
                    fk.push_str(&format!(" ON DELETE {}", self.referential_action(*action)));
                }
                if let Some(action) = on_update {
                    fk.push_str(&format!(" ON UPDATE {}", self.referential_action(*action)));
                }
                Some(fk)
            }
            Constraint::Check { name, expression } => {
                Some(format!("{}CHECK ({})", named(name), expression))
            }
            Constraint::Index { name, columns } => self.emit_inline_index(name, columns),
        }
    }

    /// Standalone CREATE INDEX for dialects without inline indexes
    fn emit_index(&self, table: &str, name: &str, columns: &[String]) -> String {
        let dialect = self.dialect();
        // index names share one namespace per schema outside MySQL
        let index_name = if name.starts_with(&format!("{}_", table)) {
            name.to_string()
        } else {
            format!("{}_{}", table, name)
        };
        format!(
            "CREATE INDEX {} ON {} ({});",
            ident(&index_name, dialect),
            ident(table, dialect),
            ident_list(columns, dialect)
        )
    }

    /// Emit CREATE TABLE, preceded by an optional DROP and followed by any
    /// standalone CREATE INDEX statements.
    fn emit_create_table(
        &self,
        table: &SchemaTable,
        options: &EmitOptions,
    ) -> Result<String, EmitError> {
        table.validate()?;
        let dialect = self.dialect();

        // Emit columns
        let mut key_inlined = false;
        let mut parts: Vec<String> = table
            .columns
            .iter()
            .map(|column| {
                let inline = self.inlines_primary_key(table, column);
                key_inlined |= inline;
                format!("  {}", self.emit_column(column, inline))
            })
            .collect();

        if !table.primary_key.is_empty() && !key_inlined {
            parts.push(format!(
                "  PRIMARY KEY ({})",
                ident_list(&table.primary_key, dialect)
            ));
        }

        // Emit constraints
        parts.extend(
            table
                .constraints
                .iter()
                .filter_map(|c| self.emit_constraint(c))
                .map(|c| format!("  {}", c)),
        );

        let mut sql = String::new();
        if options.drop_if_exists {
            sql.push_str(&self.emit_drop_table(&table.name));
            sql.push('\n');
        }
        sql.push_str(&self.create_table_header(&table.name, options.create_if_not_exists));
        sql.push_str(" (\n");
        sql.push_str(&parts.join(",\n"));
        sql.push_str("\n)");
        sql.push_str(&self.table_options(options));
        sql.push(';');

        for constraint in &table.constraints {
            if let Constraint::Index { name, columns } = constraint {
                if self.emit_inline_index(name, columns).is_none() {
                    sql.push('\n');
                    sql.push_str(&self.emit_index(&table.name, name, columns));
                }
            }
        }

        Ok(sql)
    }

    /// `ALTER TABLE ... ADD COLUMN`; `after` names the preceding column
    fn emit_add_column(&self, table: &str, column: &ColumnDef, _after: Option<&str>) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {};",
            ident(table, self.dialect()),
            self.emit_column(column, false)
        )
    }

    /// Retrofit autoincrement onto an existing column
    fn emit_auto_increment(&self, table: &str, column: &ColumnDef) -> String {
        warn!(
            dialect = %self.dialect(),
            table = %table,
            column = %column.name,
            "auto-increment cannot be added to an existing column"
        );
        format!(
            "-- {} cannot add auto-increment to existing column {}.{}; rebuild the table",
            self.dialect(),
            table,
            column.name
        )
    }

    /// ADD COLUMN statements for columns of `desired` missing from `existing`,
    /// each positioned after its predecessor in `desired`.
    fn emit_add_missing_columns(&self, desired: &SchemaTable, existing: &SchemaTable) -> Vec<String> {
        let mut statements = Vec::new();
        let mut previous: Option<&str> = None;
        for column in &desired.columns {
            if existing.column(&column.name).is_none() {
                statements.push(self.emit_add_column(&existing.name, column, previous));
            }
            previous = Some(column.name.as_str());
        }
        statements
    }
}

/// Emitter for a dialect. MariaDB shares the MySQL emitter.
pub fn emitter_for(dialect: Dialect) -> Box<dyn SqlEmitter> {
    match dialect {
        Dialect::MySQL => Box::new(MySqlEmitter::new()),
        Dialect::MariaDB => Box::new(MySqlEmitter::mariadb()),
        Dialect::PostgreSQL => Box::new(PostgresEmitter::new()),
        Dialect::SQLite => Box::new(SqliteEmitter::new()),
        Dialect::SQLServer => Box::new(SqlServerEmitter::new()),
    }
}

/// Emit CREATE TABLE for a table whose types are already in `dialect`.
pub fn emit(table: &SchemaTable, dialect: Dialect, options: &EmitOptions) -> Result<String, EmitError> {
    emitter_for(dialect).emit_create_table(table, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Length;

    fn orders() -> SchemaTable {
        SchemaTable::new(
            "orders",
            vec![
                ColumnDef::new("id", "integer", None).not_null(),
                ColumnDef::new("user_id", "integer", None).not_null(),
                ColumnDef::new("note", "varchar", Some(Length::Size(80))),
            ],
            vec!["id".to_string()],
            vec![
                Constraint::ForeignKey {
                    name: Some("fk_user".to_string()),
                    columns: vec!["user_id".to_string()],
                    ref_table: "users".to_string(),
                    ref_columns: vec!["id".to_string()],
                    on_delete: Some(ReferentialAction::Cascade),
                    on_update: None,
                },
                Constraint::Index {
                    name: "idx_user".to_string(),
                    columns: vec!["user_id".to_string()],
                },
            ],
        )
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: EmitOptions = serde_json::from_str(r#"{"drop_if_exists": true}"#).unwrap();
        assert!(options.drop_if_exists);
        assert_eq!(options.engine, "InnoDB");
        assert_eq!(options.charset, "utf8mb4");
    }

    #[test]
    fn test_foreign_key_and_trailing_index() {
        let sql = emit(&orders(), Dialect::PostgreSQL, &EmitOptions::default()).unwrap();
        assert!(sql.contains("  CONSTRAINT fk_user FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE"));
        assert!(sql.ends_with(");\nCREATE INDEX orders_idx_user ON orders (user_id);"));
    }

    #[test]
    fn test_mysql_keeps_index_inline() {
        let sql = emit(&orders(), Dialect::MySQL, &EmitOptions::default()).unwrap();
        assert!(sql.contains("  KEY idx_user (user_id)"));
        assert!(!sql.contains("CREATE INDEX"));
    }

    #[test]
    fn test_invalid_table_is_rejected() {
        let table = SchemaTable::new(
            "t",
            vec![ColumnDef::new("a", "int", None), ColumnDef::new("A", "int", None)],
            vec![],
            vec![],
        );
        for dialect in Dialect::ALL {
            assert!(emit(&table, dialect, &EmitOptions::default()).is_err());
        }
    }

    #[test]
    fn test_add_missing_columns() {
        let existing = SchemaTable::new(
            "orders",
            vec![ColumnDef::new("id", "integer", None).not_null()],
            vec!["id".to_string()],
            vec![],
        );
        let statements = PostgresEmitter::new().emit_add_missing_columns(&orders(), &existing);
        assert_eq!(
            statements,
            vec![
                "ALTER TABLE orders ADD COLUMN user_id integer NOT NULL;".to_string(),
                "ALTER TABLE orders ADD COLUMN note varchar(80);".to_string(),
            ]
        );
    }
}

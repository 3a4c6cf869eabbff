// MySQL / MariaDB Emitter

use super::{EmitOptions, SqlEmitter};
use crate::ast::{ColumnDef, Dialect};
use crate::identifier::{ident, ident_list};
use crate::value::quote_string;

/// Emitter for the MySQL family of dialects
pub struct MySqlEmitter {
    dialect: Dialect,
}

impl MySqlEmitter {
    pub fn new() -> Self {
        Self {
            dialect: Dialect::MySQL,
        }
    }

    pub fn mariadb() -> Self {
        Self {
            dialect: Dialect::MariaDB,
        }
    }
}

impl Default for MySqlEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlEmitter for MySqlEmitter {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn column_type(&self, column: &ColumnDef, _inline_key: bool) -> String {
        let mut ty = column.type_with_length();
        if column.unsigned {
            ty.push_str(" unsigned");
        }
        ty
    }

    fn column_extras(&self, column: &ColumnDef) -> Vec<String> {
        let mut extras = Vec::new();
        // ON UPDATE CURRENT_TIMESTAMP
        if column.on_update_timestamp {
            extras.push("ON UPDATE CURRENT_TIMESTAMP".to_string());
        }
        // AUTO_INCREMENT
        if column.auto_increment {
            extras.push("AUTO_INCREMENT".to_string());
        }
        if let Some(comment) = &column.comment {
            extras.push(format!("COMMENT {}", quote_string(comment)));
        }
        extras
    }

    // A nullable timestamp must say so, or older servers make it NOT NULL
    // with an implicit CURRENT_TIMESTAMP default
    fn explicit_null(&self, column: &ColumnDef) -> bool {
        column.raw_type == "timestamp"
    }

    fn emit_inline_index(&self, name: &str, columns: &[String]) -> Option<String> {
        Some(format!(
            "KEY {} ({})",
            ident(name, self.dialect),
            ident_list(columns, self.dialect)
        ))
    }

    fn table_options(&self, options: &EmitOptions) -> String {
        let mut out = String::new();
        if !options.engine.is_empty() {
            out.push_str(&format!(" ENGINE={}", options.engine));
        }
        if !options.charset.is_empty() {
            out.push_str(&format!(" DEFAULT CHARSET={}", options.charset));
        }
        out
    }

    fn emit_add_column(&self, table: &str, column: &ColumnDef, after: Option<&str>) -> String {
        let position = match after {
            Some(previous) => format!(" AFTER {}", ident(previous, self.dialect)),
            None => " FIRST".to_string(),
        };
        format!(
            "ALTER TABLE {} ADD COLUMN {}{};",
            ident(table, self.dialect),
            self.emit_column(column, false),
            position
        )
    }

    fn emit_auto_increment(&self, table: &str, column: &ColumnDef) -> String {
        let mut column = column.clone();
        column.auto_increment = true;
        column.nullable = false;
        column.default_value = None;
        format!(
            "ALTER TABLE {} MODIFY {};",
            ident(table, self.dialect),
            self.emit_column(&column, false)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Constraint, Length, SchemaTable};
    use pretty_assertions::assert_eq;

    fn admin() -> SchemaTable {
        SchemaTable::new(
            "admin",
            vec![
                ColumnDef::new("admin_id", "int", None)
                    .not_null()
                    .with_auto_increment(),
                ColumnDef::new("username", "varchar", Some(Length::Size(40))).not_null(),
                ColumnDef::new("active", "tinyint", Some(Length::Size(1)))
                    .not_null()
                    .with_default("'1'"),
            ],
            vec!["admin_id".to_string()],
            vec![],
        )
    }

    #[test]
    fn test_emit_simple_create_table() {
        let sql = MySqlEmitter::new()
            .emit_create_table(&admin(), &EmitOptions::default())
            .unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE admin (\n\
             \x20 admin_id int NOT NULL AUTO_INCREMENT,\n\
             \x20 username varchar(40) NOT NULL,\n\
             \x20 active tinyint(1) NOT NULL DEFAULT true,\n\
             \x20 PRIMARY KEY (admin_id)\n\
             ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;"
        );
    }

    // ========== Table options ==========

    #[test]
    fn test_emit_drop_and_if_not_exists() {
        let options = EmitOptions {
            create_if_not_exists: true,
            drop_if_exists: true,
            engine: "MyISAM".to_string(),
            charset: "latin1".to_string(),
        };
        let sql = MySqlEmitter::mariadb().emit_create_table(&admin(), &options).unwrap();
        assert!(sql.starts_with("DROP TABLE IF EXISTS admin;\nCREATE TABLE IF NOT EXISTS admin (\n"));
        assert!(sql.ends_with(") ENGINE=MyISAM DEFAULT CHARSET=latin1;"));
    }

    // ========== Column attributes ==========

    #[test]
    fn test_emit_timestamp_null_default_null() {
        let column = ColumnDef::new("deleted_at", "timestamp", None).with_default("NULL");
        assert_eq!(
            MySqlEmitter::new().emit_column(&column, false),
            "deleted_at timestamp NULL DEFAULT NULL"
        );
        let column = ColumnDef::new("seen_at", "datetime", None);
        assert_eq!(MySqlEmitter::new().emit_column(&column, false), "seen_at datetime");
    }

    #[test]
    fn test_emit_unsigned_on_update_comment() {
        let mut column = ColumnDef::new("updated_at", "timestamp", None)
            .not_null()
            .with_default("CURRENT_TIMESTAMP");
        column.on_update_timestamp = true;
        column.comment = Some("last change".to_string());
        assert_eq!(
            MySqlEmitter::new().emit_column(&column, false),
            "updated_at timestamp NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP COMMENT 'last change'"
        );

        let mut column = ColumnDef::new("hits", "bigint", None).not_null();
        column.unsigned = true;
        assert_eq!(
            MySqlEmitter::new().emit_column(&column, false),
            "hits bigint unsigned NOT NULL"
        );
    }

    #[test]
    fn test_emit_enum_and_reserved_name() {
        let mut column = ColumnDef::new("order", "enum", None).with_default("'new'");
        column.enum_values = vec!["new".to_string(), "it's done".to_string()];
        assert_eq!(
            MySqlEmitter::new().emit_column(&column, false),
            "`order` enum('new', 'it''s done') DEFAULT 'new'"
        );
    }

    // ========== Constraints ==========

    #[test]
    fn test_emit_unique_and_key() {
        let mut table = admin();
        table.constraints = vec![
            Constraint::Unique {
                name: Some("uniq_username".to_string()),
                columns: vec!["username".to_string()],
            },
            Constraint::Index {
                name: "idx_active".to_string(),
                columns: vec!["active".to_string()],
            },
        ];
        let sql = MySqlEmitter::new()
            .emit_create_table(&table, &EmitOptions::default())
            .unwrap();
        assert!(sql.contains("  PRIMARY KEY (admin_id),\n  CONSTRAINT uniq_username UNIQUE (username),\n  KEY idx_active (active)\n)"));
    }

    // ========== ALTER TABLE ==========

    #[test]
    fn test_emit_add_column_positions() {
        let emitter = MySqlEmitter::new();
        let column = ColumnDef::new("email", "varchar", Some(Length::Size(255)));
        assert_eq!(
            emitter.emit_add_column("admin", &column, Some("username")),
            "ALTER TABLE admin ADD COLUMN email varchar(255) AFTER username;"
        );
        assert_eq!(
            emitter.emit_add_column("admin", &column, None),
            "ALTER TABLE admin ADD COLUMN email varchar(255) FIRST;"
        );
    }

    #[test]
    fn test_emit_auto_increment_retrofit() {
        let column = ColumnDef::new("id", "int", None);
        assert_eq!(
            MySqlEmitter::new().emit_auto_increment("admin", &column),
            "ALTER TABLE admin MODIFY id int NOT NULL AUTO_INCREMENT;"
        );
    }
}

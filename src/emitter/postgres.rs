// PostgreSQL Emitter

use tracing::warn;

use super::SqlEmitter;
use crate::ast::{ColumnDef, Dialect, NormalizedType};
use crate::identifier::ident;
use crate::typemap::IntWidth;

/// Emitter for PostgreSQL
pub struct PostgresEmitter;

impl PostgresEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PostgresEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlEmitter for PostgresEmitter {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSQL
    }

    /// Autoincrement integers become `serial` / `bigserial`, replacing the
    /// declared type. Other autoincrement columns keep their type and lose
    /// the sequence.
    fn column_type(&self, column: &ColumnDef, _inline_key: bool) -> String {
        if column.auto_increment {
            if column.normalized_type == NormalizedType::Integer {
                return match IntWidth::of(&column.raw_type) {
                    IntWidth::Big => "bigserial".to_string(),
                    _ => "serial".to_string(),
                };
            }
            warn!(
                column = %column.name,
                r#type = %column.type_with_length(),
                "PostgreSQL serial needs an integer column; auto-increment dropped"
            );
        }
        column.type_with_length()
    }

    fn emit_auto_increment(&self, table: &str, column: &ColumnDef) -> String {
        let sequence = format!("{}_{}_seq", table, column.name);
        let seq = ident(&sequence, Dialect::PostgreSQL);
        let tbl = ident(table, Dialect::PostgreSQL);
        let col = ident(&column.name, Dialect::PostgreSQL);
        [
            format!("CREATE SEQUENCE IF NOT EXISTS {};", seq),
            format!(
                "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT nextval('{}');",
                tbl,
                col,
                sequence.replace('\'', "''")
            ),
            format!("ALTER SEQUENCE {} OWNED BY {}.{};", seq, tbl, col),
            format!(
                "SELECT setval('{}', COALESCE(MAX({}), 0) + 1, false) FROM {};",
                sequence.replace('\'', "''"),
                col,
                tbl
            ),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Length, SchemaTable};
    use crate::emitter::EmitOptions;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_emit_serial_types() {
        let emitter = PostgresEmitter::new();
        let id = ColumnDef::new("id", "integer", None).not_null().with_auto_increment();
        assert_eq!(emitter.emit_column(&id, false), "id serial NOT NULL");
        let id = ColumnDef::new("id", "bigint", None).not_null().with_auto_increment();
        assert_eq!(emitter.emit_column(&id, false), "id bigserial NOT NULL");
    }

    #[test]
    fn test_non_integer_identity_keeps_its_type() {
        let emitter = PostgresEmitter::new();
        let id = ColumnDef::new("id", "numeric", Some(Length::Precision { precision: 18, scale: 0 }))
            .not_null()
            .with_auto_increment();
        assert_eq!(emitter.emit_column(&id, false), "id numeric(18,0) NOT NULL");
    }

    #[test]
    fn test_emit_no_table_options() {
        let table = SchemaTable::new(
            "tags",
            vec![
                ColumnDef::new("id", "integer", None).not_null(),
                ColumnDef::new("label", "varchar", Some(Length::Size(30))).with_default("'x'"),
            ],
            vec!["id".to_string()],
            vec![],
        );
        let options = EmitOptions {
            create_if_not_exists: true,
            ..EmitOptions::default()
        };
        let sql = PostgresEmitter::new().emit_create_table(&table, &options).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS tags (\n\
             \x20 id integer NOT NULL,\n\
             \x20 label varchar(30) DEFAULT 'x',\n\
             \x20 PRIMARY KEY (id)\n\
             );"
        );
    }

    #[test]
    fn test_emit_auto_increment_uses_sequence() {
        let column = ColumnDef::new("id", "integer", None);
        let sql = PostgresEmitter::new().emit_auto_increment("users", &column);
        assert_eq!(
            sql,
            "CREATE SEQUENCE IF NOT EXISTS users_id_seq;\n\
             ALTER TABLE users ALTER COLUMN id SET DEFAULT nextval('users_id_seq');\n\
             ALTER SEQUENCE users_id_seq OWNED BY users.id;\n\
             SELECT setval('users_id_seq', COALESCE(MAX(id), 0) + 1, false) FROM users;"
        );
    }
}

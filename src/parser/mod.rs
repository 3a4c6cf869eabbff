// SqlParser trait and the CREATE TABLE parser

pub mod column;
pub mod constraint;
pub mod insert;
pub(crate) mod scanner;

use sqlparser::tokenizer::Token;
use tracing::debug;

use crate::ast::{Dialect, SchemaTable};
use crate::error::ParseError;

use self::column::parse_column;
use self::constraint::{is_table_clause, parse_table_clause, TableClause};
use self::scanner::{is_word_ci, render, split_top_level, TokenCursor};

pub use self::insert::{parse_insert, parse_inserts, InsertData};

/// Trait for parsing DDL from a specific dialect into the neutral schema model
pub trait SqlParser: Send + Sync {
    /// Parse the first CREATE TABLE statement in `sql`
    fn parse(&self, sql: &str) -> Result<SchemaTable, ParseError>;

    /// What dialect does this parser handle?
    fn dialect(&self) -> Dialect;
}

/// Token-driven CREATE TABLE parser.
///
/// One implementation serves every dialect; the dialect picks the tokenizer
/// rules (identifier quotes, string escapes) and nothing else.
#[derive(Debug, Clone, Copy)]
pub struct DdlParser {
    dialect: Dialect,
}

impl DdlParser {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

impl SqlParser for DdlParser {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn parse(&self, sql: &str) -> Result<SchemaTable, ParseError> {
        // Step 1: tokenize and find the CREATE TABLE header
        let tokens = scanner::tokenize(sql, self.dialect)?;
        let start = find_create_table(&tokens)
            .ok_or_else(|| ParseError::new("No CREATE TABLE statement found"))?;
        let mut cursor = TokenCursor::new(&tokens[start..]);
        cursor.advance();
        let _ = cursor.expect_any_word_ci(&["TEMPORARY", "TEMP"]);
        cursor.advance();
        let _ = cursor.expect_words_ci(&["IF", "NOT", "EXISTS"]);

        let name = cursor.parse_qualified_name().ok_or_else(|| {
            ParseError::with_location("Expected table name", render(cursor.rest()))
        })?;

        // Step 2: isolate the body between the outer parentheses
        if !cursor.check_token(&Token::LParen) {
            return Err(ParseError::new(format!(
                "Expected '(' after CREATE TABLE {}",
                name
            )));
        }
        let body = cursor.consume_parenthesized().ok_or_else(|| {
            ParseError::new(format!("Unbalanced parentheses in CREATE TABLE {}", name))
        })?;
        if body.is_empty() {
            return Err(ParseError::new(format!("CREATE TABLE {} has no columns", name)));
        }

        // Step 3: classify each top-level clause
        let mut columns = Vec::new();
        let mut inline_key = Vec::new();
        let mut table_key: Option<Vec<String>> = None;
        let mut constraints = Vec::new();

        for clause in split_top_level(body)? {
            if is_table_clause(clause, self.dialect) {
                match parse_table_clause(clause)? {
                    TableClause::PrimaryKey(key) => {
                        if table_key.is_some() {
                            return Err(ParseError::new(format!(
                                "Table {} declares more than one primary key",
                                name
                            )));
                        }
                        table_key = Some(key);
                    }
                    TableClause::Constraint(constraint) => constraints.push(constraint),
                    TableClause::Ignored(_) => {}
                }
            } else {
                let parsed = parse_column(clause, self.dialect)?;
                if parsed.inline_primary_key {
                    inline_key.push(parsed.column.name.clone());
                }
                constraints.extend(parsed.constraints);
                columns.push(parsed.column);
            }
        }

        let primary_key = table_key.unwrap_or(inline_key);
        let table = SchemaTable::new(name, columns, primary_key, constraints);
        check_table(&table)?;

        // Table options after ')' (ENGINE=, WITHOUT ROWID, ON [PRIMARY]) are not carried
        if !cursor.is_at_end() {
            debug!(table = %table.name, options = %render(statement_tail(cursor.rest())), "ignoring table options");
        }

        debug!(
            dialect = %self.dialect,
            table = %table.name,
            columns = table.columns.len(),
            "parsed CREATE TABLE"
        );
        Ok(table)
    }
}

/// Parse a CREATE TABLE statement written in `dialect`.
pub fn parse(sql: &str, dialect: Dialect) -> Result<SchemaTable, ParseError> {
    DdlParser::new(dialect).parse(sql)
}

/// Split a script into statements on `;` outside quotes, comments and
/// parentheses. Each statement keeps its original text, trimmed; empty
/// statements are dropped.
pub fn split_statements(sql: &str, dialect: Dialect) -> Result<Vec<String>, ParseError> {
    let tokens = scanner::tokenize_raw(sql, dialect)?;
    Ok(scanner::split_statements(&tokens)
        .into_iter()
        .filter(|stmt| {
            stmt.iter()
                .any(|t| !matches!(t, Token::Whitespace(_) | Token::EOF))
        })
        .map(|stmt| scanner::render_raw(stmt).trim().to_string())
        .collect())
}

/// True when `sql` contains a CREATE TABLE statement.
pub fn contains_create_table(sql: &str, dialect: Dialect) -> Result<bool, ParseError> {
    Ok(find_create_table(&scanner::tokenize(sql, dialect)?).is_some())
}

fn find_create_table(tokens: &[Token]) -> Option<usize> {
    tokens.iter().enumerate().find_map(|(i, token)| {
        if !is_word_ci(token, "CREATE") {
            return None;
        }
        let next = tokens.get(i + 1)?;
        let is_table = is_word_ci(next, "TABLE")
            || ((is_word_ci(next, "TEMPORARY") || is_word_ci(next, "TEMP"))
                && tokens.get(i + 2).is_some_and(|t| is_word_ci(t, "TABLE")));
        is_table.then_some(i)
    })
}

fn statement_tail(tokens: &[Token]) -> &[Token] {
    let end = tokens
        .iter()
        .position(|t| *t == Token::SemiColon)
        .unwrap_or(tokens.len());
    &tokens[..end]
}

fn check_table(table: &SchemaTable) -> Result<(), ParseError> {
    for (i, column) in table.columns.iter().enumerate() {
        if table.columns[..i]
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(&column.name))
        {
            return Err(ParseError::new(format!(
                "Duplicate column '{}' in table {}",
                column.name, table.name
            )));
        }
    }
    if let Some(missing) = table
        .primary_key
        .iter()
        .find(|pk| table.column(pk).is_none())
    {
        return Err(ParseError::new(format!(
            "Primary key column '{}' is not defined in table {}",
            missing, table.name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Constraint, Length, NormalizedType};
    use pretty_assertions::assert_eq;

    const ADMIN_MYSQL: &str = "CREATE TABLE `admin` (\n\
        `admin_id` int(11) NOT NULL AUTO_INCREMENT,\n\
        `username` varchar(40) NOT NULL,\n\
        `active` tinyint(1) NOT NULL DEFAULT '1',\n\
        PRIMARY KEY (`admin_id`)\n\
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8;";

    #[test]
    fn test_parse_mysql_admin_table() {
        let table = parse(ADMIN_MYSQL, Dialect::MySQL).unwrap();
        assert_eq!(table.name, "admin");
        assert_eq!(table.primary_key, vec!["admin_id"]);

        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["admin_id", "username", "active"]);

        let id = &table.columns[0];
        assert!(id.auto_increment && id.is_primary_key && !id.nullable);
        assert_eq!(table.columns[1].length, Some(Length::Size(40)));
        assert_eq!(table.columns[2].normalized_type, NormalizedType::Boolean);
        assert_eq!(table.columns[2].default_value.as_deref(), Some("'1'"));
    }

    #[test]
    fn test_composite_key_order() {
        let table = parse(
            "CREATE TABLE user_roles (user_id int NOT NULL, role_id int NOT NULL, PRIMARY KEY (role_id, user_id))",
            Dialect::PostgreSQL,
        )
        .unwrap();
        assert_eq!(table.primary_key, vec!["role_id", "user_id"]);
        assert!(table.has_composite_key());
    }

    #[test]
    fn test_inline_primary_key_and_schema_prefix() {
        let table = parse(
            "CREATE TABLE IF NOT EXISTS public.\"users\" (\"id\" serial PRIMARY KEY, email text UNIQUE)",
            Dialect::PostgreSQL,
        )
        .unwrap();
        assert_eq!(table.name, "users");
        assert_eq!(table.primary_key, vec!["id"]);
        assert!(table.columns[0].auto_increment);
        assert_eq!(
            table.constraints,
            vec![Constraint::Unique {
                name: None,
                columns: vec!["email".into()]
            }]
        );
    }

    #[test]
    fn test_sqlserver_bracketed_table() {
        let table = parse(
            "CREATE TABLE [dbo].[Orders] ([Id] INT IDENTITY(1,1) NOT NULL, [Total] DECIMAL(12,2) NULL, CONSTRAINT [PK_Orders] PRIMARY KEY CLUSTERED ([Id] ASC)) ON [PRIMARY]",
            Dialect::SQLServer,
        )
        .unwrap();
        assert_eq!(table.name, "Orders");
        assert_eq!(table.primary_key, vec!["Id"]);
        assert_eq!(
            table.columns[1].length,
            Some(Length::Precision { precision: 12, scale: 2 })
        );
    }

    #[test]
    fn test_sqlite_autoincrement() {
        let table = parse(
            "CREATE TABLE notes (id INTEGER PRIMARY KEY AUTOINCREMENT, body TEXT NOT NULL DEFAULT '')",
            Dialect::SQLite,
        )
        .unwrap();
        assert!(table.columns[0].auto_increment);
        assert_eq!(table.primary_key, vec!["id"]);
        assert_eq!(table.columns[1].default_value.as_deref(), Some("''"));
    }

    #[test]
    fn test_index_words_as_column_names() {
        let table = parse(
            "CREATE TABLE settings (key text NOT NULL, value text, PRIMARY KEY (key))",
            Dialect::PostgreSQL,
        )
        .unwrap();
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["key", "value"]);
        assert_eq!(table.primary_key, vec!["key"]);
        assert!(!table.columns[0].nullable);

        let table = parse("CREATE TABLE kv (index integer, key text)", Dialect::SQLite).unwrap();
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["index", "key"]);
        assert_eq!(table.columns[0].normalized_type, NormalizedType::Integer);

        // MySQL still reads KEY as an index
        let table = parse(
            "CREATE TABLE kv (`key` varchar(20), KEY idx_key (`key`))",
            Dialect::MySQL,
        )
        .unwrap();
        assert_eq!(table.columns.len(), 1);
        assert_eq!(
            table.constraints,
            vec![Constraint::Index {
                name: "idx_key".into(),
                columns: vec!["key".into()]
            }]
        );
    }

    #[test]
    fn test_comments_and_leading_statements() {
        let sql = "-- dump header\nSET NAMES utf8;\n/* t */ CREATE TABLE t (a int -- first\n, b text);";
        let table = parse(sql, Dialect::MySQL).unwrap();
        assert_eq!(table.columns.len(), 2);
    }

    #[test]
    fn test_malformed_input() {
        assert!(parse("SELECT 1", Dialect::MySQL).is_err());
        assert!(parse("CREATE TABLE t (a int", Dialect::MySQL).is_err());
        assert!(parse("CREATE TABLE t ()", Dialect::MySQL).is_err());
        assert!(parse("CREATE TABLE t (a int, )", Dialect::MySQL).is_err());
        assert!(parse("CREATE TABLE t (a NOT NULL)", Dialect::MySQL).is_err());
        assert!(parse("CREATE TABLE t (a int, a text)", Dialect::MySQL).is_err());
        assert!(parse("CREATE TABLE t (a int, PRIMARY KEY (b))", Dialect::MySQL).is_err());
    }

    #[test]
    fn test_reparse_is_stable() {
        let first = parse(ADMIN_MYSQL, Dialect::MySQL).unwrap();
        let second = parse(ADMIN_MYSQL, Dialect::MySQL).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_split_statements_keeps_text() {
        let sql = "CREATE TABLE a (x text DEFAULT 'a;b');\n-- note; here\nCREATE TABLE b (y int);\n\n";
        let statements = split_statements(sql, Dialect::PostgreSQL).unwrap();
        assert_eq!(
            statements,
            vec![
                "CREATE TABLE a (x text DEFAULT 'a;b')".to_string(),
                "-- note; here\nCREATE TABLE b (y int)".to_string(),
            ]
        );
    }
}

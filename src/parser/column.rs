//! Column definition parsing.
//!
//! A column clause is `name type [(args)] [modifiers] [attributes...]`. The
//! type is everything up to the first attribute keyword, so multi-word types
//! such as `double precision` or `character varying(20)` come out as one raw
//! type. `with time zone` and array brackets go to the type suffix so that
//! they render after the length.

use sqlparser::tokenizer::Token;
use tracing::debug;

use crate::ast::{ColumnDef, Constraint, Dialect, Length, NormalizedType};
use crate::error::ParseError;
use crate::typemap;

use super::constraint::{parse_check_body, parse_references};
use super::scanner::{is_word_ci, render, TokenCursor};

/// Words that end a DEFAULT expression
const ATTRIBUTE_KEYWORDS: &[&str] = &[
    "NOT",
    "NULL",
    "PRIMARY",
    "UNIQUE",
    "KEY",
    "AUTO_INCREMENT",
    "AUTOINCREMENT",
    "IDENTITY",
    "GENERATED",
    "COMMENT",
    "COLLATE",
    "CHARACTER",
    "CHARSET",
    "ON",
    "CHECK",
    "REFERENCES",
    "CONSTRAINT",
    "DEFAULT",
];

/// Words allowed after the base type token
const TYPE_MODIFIERS: &[&str] = &["PRECISION", "VARYING", "UNSIGNED", "SIGNED", "ZEROFILL"];

/// A column plus the inline constraints declared with it
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedColumn {
    pub column: ColumnDef,
    pub inline_primary_key: bool,
    pub constraints: Vec<Constraint>,
}

fn is_attribute_keyword(token: &Token) -> bool {
    ATTRIBUTE_KEYWORDS.iter().any(|k| is_word_ci(token, k))
}

/// Parse one column clause.
pub(crate) fn parse_column(clause: &[Token], dialect: Dialect) -> Result<ParsedColumn, ParseError> {
    let location = render(clause);
    let mut cursor = TokenCursor::new(clause);

    let name = cursor
        .parse_identifier()
        .ok_or_else(|| ParseError::with_location("Expected column name", &location))?;

    let data_type = parse_data_type(&mut cursor).ok_or_else(|| {
        ParseError::with_location(
            format!("Cannot determine data type of column '{}'", name),
            &location,
        )
    })?;

    let mut column = ColumnDef::new(&name, data_type.raw_type, data_type.length);
    column.enum_values = data_type.enum_values;
    column.unsigned = data_type.unsigned;
    if data_type.suffix.contains("[]") {
        column.normalized_type = NormalizedType::Unknown;
    }
    column.type_suffix = data_type.suffix;

    // PostgreSQL serial types carry their own sequence
    if matches!(
        column.raw_type.as_str(),
        "serial" | "bigserial" | "smallserial" | "serial4" | "serial8" | "serial2"
    ) {
        column.auto_increment = true;
        column.nullable = false;
    }

    let mut parsed = ParsedColumn {
        column,
        inline_primary_key: false,
        constraints: Vec::new(),
    };
    parse_attributes(&mut cursor, &mut parsed, dialect, &location)?;

    if let Some(default) = &parsed.column.default_value {
        if default.to_ascii_lowercase().contains("nextval(") {
            debug!(column = %name, "sequence default read as auto-increment");
            parsed.column.auto_increment = true;
            parsed.column.default_value = None;
        }
    }

    Ok(parsed)
}

struct DataType {
    raw_type: String,
    length: Option<Length>,
    enum_values: Vec<String>,
    unsigned: bool,
    /// words that follow the length, kept in source order
    suffix: String,
}

fn starts_type(cursor: &TokenCursor<'_>, token: &Token) -> bool {
    // CHARACTER is a type unless it opens CHARACTER SET
    if is_word_ci(token, "CHARACTER") {
        return !cursor.peek(1).is_some_and(|t| is_word_ci(t, "SET"));
    }
    !is_attribute_keyword(token)
}

fn parse_data_type(cursor: &mut TokenCursor<'_>) -> Option<DataType> {
    let token = cursor.current()?;
    let base = match token {
        Token::Word(w) if starts_type(cursor, token) => w.value.to_lowercase(),
        _ => return None,
    };
    cursor.advance();

    let mut words = vec![base];
    let mut length = None;
    let mut enum_values = Vec::new();
    let mut unsigned = false;
    let mut suffix = String::new();

    loop {
        if cursor.check_token(&Token::LParen) {
            let args = cursor.consume_parenthesized()?;
            if let Some(values) = string_list(args) {
                enum_values = values;
            } else {
                length = typemap::parse_length(&render(args));
                if length.is_none() {
                    debug!(args = %render(args), "type arguments not carried");
                }
            }
        } else if cursor.check_token(&Token::LBracket) && cursor.peek(1) == Some(&Token::RBracket) {
            cursor.advance();
            cursor.advance();
            suffix.push_str("[]");
        } else if cursor.expect_words_ci(&["WITH", "TIME", "ZONE"]) {
            suffix.push_str(" with time zone");
        } else if cursor.expect_words_ci(&["WITHOUT", "TIME", "ZONE"]) {
            // the default for timestamp and time
        } else if let Some(modifier) = cursor.expect_any_word_ci(TYPE_MODIFIERS) {
            match modifier {
                "UNSIGNED" => unsigned = true,
                "SIGNED" | "ZEROFILL" => {}
                other => words.push(other.to_lowercase()),
            }
        } else {
            break;
        }
    }

    Some(DataType {
        raw_type: words.join(" "),
        length,
        enum_values,
        unsigned,
        suffix,
    })
}

/// `'a', 'b', 'c'` as enum members
fn string_list(args: &[Token]) -> Option<Vec<String>> {
    let mut values = Vec::new();
    for (i, token) in args.iter().enumerate() {
        match (i % 2, token) {
            (0, Token::SingleQuotedString(s)) => values.push(s.clone()),
            (1, Token::Comma) => {}
            _ => return None,
        }
    }
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

fn parse_attributes(
    cursor: &mut TokenCursor<'_>,
    parsed: &mut ParsedColumn,
    dialect: Dialect,
    location: &str,
) -> Result<(), ParseError> {
    let column = &mut parsed.column;

    while !cursor.is_at_end() {
        if cursor.expect_words_ci(&["NOT", "NULL"]) {
            column.nullable = false;
        } else if cursor.expect_word_ci("NULL") {
            column.nullable = true;
        } else if cursor.expect_word_ci("DEFAULT") {
            let expr = cursor.take_expression(is_attribute_keyword);
            if expr.is_empty() {
                return Err(ParseError::with_location("DEFAULT without a value", location));
            }
            column.default_value = Some(render(expr));
        } else if cursor.expect_words_ci(&["PRIMARY", "KEY"]) || cursor.expect_word_ci("KEY") {
            parsed.inline_primary_key = true;
            let _ = cursor.expect_any_word_ci(&["ASC", "DESC", "CLUSTERED", "NONCLUSTERED"]);
        } else if cursor.expect_word_ci("UNIQUE") {
            let _ = cursor.expect_word_ci("KEY");
            parsed.constraints.push(Constraint::Unique {
                name: None,
                columns: vec![column.name.clone()],
            });
        } else if cursor
            .expect_any_word_ci(&["AUTO_INCREMENT", "AUTOINCREMENT"])
            .is_some()
        {
            column.auto_increment = true;
        } else if cursor.expect_word_ci("IDENTITY") {
            column.auto_increment = true;
            let _ = cursor.consume_parenthesized();
        } else if cursor.expect_word_ci("GENERATED") {
            let _ = cursor.expect_word_ci("ALWAYS") || cursor.expect_words_ci(&["BY", "DEFAULT"]);
            if cursor.expect_words_ci(&["AS", "IDENTITY"]) {
                column.auto_increment = true;
                let _ = cursor.consume_parenthesized();
            } else if cursor.expect_word_ci("AS") {
                let expr = cursor.consume_parenthesized().unwrap_or_default();
                debug!(column = %column.name, expr = %render(expr), "generated column expression not carried");
                let _ = cursor.expect_any_word_ci(&["STORED", "VIRTUAL", "PERSISTED"]);
            }
        } else if cursor.expect_words_ci(&["ON", "UPDATE"]) {
            let expr = render(cursor.take_expression(is_attribute_keyword)).to_ascii_lowercase();
            if expr.starts_with("current_timestamp") || expr.starts_with("now") {
                column.on_update_timestamp = true;
            }
        } else if cursor.expect_word_ci("COMMENT") {
            match cursor.current() {
                Some(Token::SingleQuotedString(s)) | Some(Token::DoubleQuotedString(s)) => {
                    column.comment = Some(s.clone());
                    cursor.advance();
                }
                _ => return Err(ParseError::with_location("COMMENT without text", location)),
            }
        } else if cursor.expect_word_ci("COLLATE")
            || cursor.expect_words_ci(&["CHARACTER", "SET"])
            || cursor.expect_word_ci("CHARSET")
        {
            cursor.advance();
        } else if cursor.expect_word_ci("CONSTRAINT") {
            // named column constraints keep their effect, not their name
            let _ = cursor.parse_identifier();
        } else if cursor.check_word_ci("CHECK") {
            cursor.advance();
            let expression = parse_check_body(cursor, location)?;
            parsed.constraints.push(Constraint::Check {
                name: None,
                expression,
            });
        } else if cursor.check_word_ci("REFERENCES") {
            let fk = parse_references(cursor, None, vec![column.name.clone()], location)?;
            parsed.constraints.push(fk);
        } else if cursor.check_token(&Token::LParen) {
            let _ = cursor.consume_parenthesized();
        } else {
            if let Some(token) = cursor.current() {
                debug!(%dialect, column = %column.name, token = %token, "skipping unknown column attribute");
            }
            cursor.advance();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::scanner::tokenize;
    use pretty_assertions::assert_eq;

    fn column(sql: &str, dialect: Dialect) -> ParsedColumn {
        let tokens = tokenize(sql, dialect).unwrap();
        parse_column(&tokens, dialect).unwrap()
    }

    #[test]
    fn test_mysql_varchar_not_null() {
        let parsed = column("`username` varchar(40) NOT NULL", Dialect::MySQL);
        let c = parsed.column;
        assert_eq!(c.name, "username");
        assert_eq!(c.raw_type, "varchar");
        assert_eq!(c.length, Some(Length::Size(40)));
        assert_eq!(c.normalized_type, NormalizedType::String);
        assert!(!c.nullable);
        assert_eq!(c.default_value, None);
    }

    #[test]
    fn test_unsigned_auto_increment() {
        let c = column("`admin_id` int(11) unsigned NOT NULL AUTO_INCREMENT", Dialect::MySQL).column;
        assert_eq!(c.raw_type, "int");
        assert!(c.unsigned);
        assert!(c.auto_increment);
        assert_eq!(c.normalized_type, NormalizedType::Integer);
    }

    #[test]
    fn test_default_stops_at_next_attribute() {
        let c = column(
            "updated_at timestamp NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP COMMENT 'touched'",
            Dialect::MySQL,
        )
        .column;
        assert!(c.nullable);
        assert_eq!(c.default_value.as_deref(), Some("CURRENT_TIMESTAMP"));
        assert!(c.on_update_timestamp);
        assert_eq!(c.comment.as_deref(), Some("touched"));
    }

    #[test]
    fn test_default_with_commas_and_parens() {
        let c = column("price decimal(10,2) DEFAULT (0.00) NOT NULL", Dialect::MySQL).column;
        assert_eq!(c.length, Some(Length::Precision { precision: 10, scale: 2 }));
        assert_eq!(c.default_value.as_deref(), Some("(0.00)"));
        assert!(!c.nullable);
    }

    #[test]
    fn test_multi_word_postgres_types() {
        let c = column("ratio double precision", Dialect::PostgreSQL).column;
        assert_eq!(c.raw_type, "double precision");
        assert_eq!(c.normalized_type, NormalizedType::Float);

        let c = column("seen timestamp(3) with time zone NOT NULL", Dialect::PostgreSQL).column;
        assert_eq!(c.raw_type, "timestamp");
        assert_eq!(c.type_suffix, " with time zone");
        assert_eq!(c.length, Some(Length::Size(3)));
        assert_eq!(c.normalized_type, NormalizedType::DateTime);
        assert_eq!(c.type_with_length(), "timestamp(3) with time zone");

        let c = column("nick character varying(20)", Dialect::PostgreSQL).column;
        assert_eq!(c.raw_type, "character varying");
        assert_eq!(c.length, Some(Length::Size(20)));
    }

    #[test]
    fn test_array_suffix_follows_length() {
        let c = column("tags varchar(20)[] NOT NULL", Dialect::PostgreSQL).column;
        assert_eq!(c.raw_type, "varchar");
        assert_eq!(c.type_suffix, "[]");
        assert_eq!(c.normalized_type, NormalizedType::Unknown);
        assert_eq!(c.type_with_length(), "varchar(20)[]");
        assert!(!c.nullable);

        let c = column("grid int[][]", Dialect::PostgreSQL).column;
        assert_eq!(c.type_with_length(), "int[][]");
    }

    #[test]
    fn test_serial_and_nextval_mean_auto_increment() {
        let c = column("id bigserial", Dialect::PostgreSQL).column;
        assert!(c.auto_increment);
        assert!(!c.nullable);

        let c = column(
            "id integer NOT NULL DEFAULT nextval('users_id_seq'::regclass)",
            Dialect::PostgreSQL,
        )
        .column;
        assert!(c.auto_increment);
        assert_eq!(c.default_value, None);
    }

    #[test]
    fn test_sqlserver_identity_and_max() {
        let c = column("[id] INT IDENTITY(1,1) NOT NULL", Dialect::SQLServer).column;
        assert!(c.auto_increment);
        let c = column("[body] NVARCHAR(MAX) NULL", Dialect::SQLServer).column;
        assert_eq!(c.length, Some(Length::Max));
        assert_eq!(c.normalized_type, NormalizedType::String);
    }

    #[test]
    fn test_enum_values() {
        let c = column("status enum('active','banned') DEFAULT 'active'", Dialect::MySQL).column;
        assert_eq!(c.normalized_type, NormalizedType::Enum);
        assert_eq!(c.enum_values, vec!["active".to_string(), "banned".to_string()]);
        assert_eq!(c.default_value.as_deref(), Some("'active'"));
    }

    #[test]
    fn test_inline_constraints() {
        let parsed = column(
            "role_id integer UNIQUE REFERENCES roles(id) ON DELETE CASCADE",
            Dialect::PostgreSQL,
        );
        assert_eq!(parsed.constraints.len(), 2);
        assert!(matches!(parsed.constraints[0], Constraint::Unique { .. }));
        assert!(matches!(
            &parsed.constraints[1],
            Constraint::ForeignKey { ref_table, .. } if ref_table == "roles"
        ));

        let parsed = column("id INTEGER PRIMARY KEY AUTOINCREMENT", Dialect::SQLite);
        assert!(parsed.inline_primary_key);
        assert!(parsed.column.auto_increment);
    }

    #[test]
    fn test_missing_type_is_an_error() {
        let tokens = tokenize("name NOT NULL", Dialect::MySQL).unwrap();
        assert!(parse_column(&tokens, Dialect::MySQL).is_err());
        let tokens = tokenize("name", Dialect::MySQL).unwrap();
        assert!(parse_column(&tokens, Dialect::MySQL).is_err());
    }
}

// INSERT ... VALUES parsing, the read side of a data import

use std::collections::HashMap;

use sqlparser::tokenizer::Token;

use crate::ast::{Dialect, SchemaTable};
use crate::error::ParseError;
use crate::value::SqlValue;

use super::scanner::{self, is_word_ci, render, split_top_level, TokenCursor};

/// Rows of one INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertData {
    pub table: String,
    /// Explicit column list; empty when the statement had none
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl InsertData {
    /// Key each row by column name.
    ///
    /// Statements without a column list take the column order of `schema`.
    pub fn records(&self, schema: &SchemaTable) -> Result<Vec<HashMap<String, SqlValue>>, ParseError> {
        let names: Vec<String> = if self.columns.is_empty() {
            schema.columns.iter().map(|c| c.name.clone()).collect()
        } else {
            self.columns.clone()
        };

        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                if row.len() != names.len() {
                    return Err(ParseError::new(format!(
                        "Row {} of INSERT INTO {} has {} values for {} columns",
                        i + 1,
                        self.table,
                        row.len(),
                        names.len()
                    )));
                }
                Ok(names.iter().cloned().zip(row.iter().cloned()).collect())
            })
            .collect()
    }
}

/// Parse the first INSERT statement in `sql`.
pub fn parse_insert(sql: &str, dialect: Dialect) -> Result<InsertData, ParseError> {
    parse_inserts(sql, dialect)?
        .into_iter()
        .next()
        .ok_or_else(|| ParseError::new("No INSERT statement found"))
}

/// Parse every INSERT statement in a script, skipping other statements.
pub fn parse_inserts(sql: &str, dialect: Dialect) -> Result<Vec<InsertData>, ParseError> {
    let tokens = scanner::tokenize(sql, dialect)?;
    scanner::split_statements(&tokens)
        .into_iter()
        .filter(|stmt| stmt.first().is_some_and(|t| is_word_ci(t, "INSERT")))
        .map(parse_statement)
        .collect()
}

fn parse_statement(tokens: &[Token]) -> Result<InsertData, ParseError> {
    let location = render(&tokens[..tokens.len().min(8)]);
    let mut cursor = TokenCursor::new(tokens);
    cursor.advance();
    let _ = cursor.expect_any_word_ci(&["IGNORE", "LOW_PRIORITY", "DELAYED", "HIGH_PRIORITY"]);
    let _ = cursor.expect_words_ci(&["OR", "REPLACE"]) || cursor.expect_words_ci(&["OR", "IGNORE"]);
    let _ = cursor.expect_word_ci("INTO");

    let table = cursor
        .parse_qualified_name()
        .ok_or_else(|| ParseError::with_location("Expected table name after INSERT INTO", &location))?;

    let mut columns = Vec::new();
    if cursor.check_token(&Token::LParen) {
        let inner = cursor.consume_parenthesized().unwrap_or_default();
        for part in split_top_level(inner)? {
            let name = match part {
                [token] => scanner::identifier(token),
                _ => None,
            }
            .ok_or_else(|| ParseError::with_location("Expected column name", render(part)))?;
            columns.push(name);
        }
    }

    if !cursor.expect_word_ci("VALUES") && !cursor.expect_word_ci("VALUE") {
        return Err(ParseError::with_location(
            "Only INSERT ... VALUES is supported",
            location,
        ));
    }

    let mut rows = Vec::new();
    loop {
        let tuple = cursor
            .consume_parenthesized()
            .ok_or_else(|| ParseError::with_location("Expected '(' to open a row", &location))?;
        let values = if tuple.is_empty() {
            Vec::new()
        } else {
            split_top_level(tuple)?
                .into_iter()
                .map(parse_literal)
                .collect::<Result<Vec<_>, _>>()?
        };
        rows.push(values);
        if !cursor.expect_token(&Token::Comma) {
            break;
        }
    }

    if !cursor.is_at_end() && !cursor.check_word_ci("ON") && !cursor.check_word_ci("RETURNING") {
        return Err(ParseError::with_location(
            "Unexpected tokens after VALUES",
            render(cursor.rest()),
        ));
    }

    Ok(InsertData {
        table,
        columns,
        rows,
    })
}

fn parse_number(text: &str, negative: bool) -> SqlValue {
    let signed = if negative {
        format!("-{}", text)
    } else {
        text.to_string()
    };
    if let Ok(i) = signed.parse::<i64>() {
        SqlValue::Int(i)
    } else if let Ok(f) = signed.parse::<f64>() {
        SqlValue::Float(f)
    } else {
        SqlValue::Text(signed)
    }
}

/// A single literal value in a VALUES tuple
fn parse_literal(tokens: &[Token]) -> Result<SqlValue, ParseError> {
    let value = match tokens {
        [Token::Number(n, _)] => parse_number(n, false),
        [Token::Minus, Token::Number(n, _)] => parse_number(n, true),
        [Token::Plus, Token::Number(n, _)] => parse_number(n, false),
        [Token::SingleQuotedString(s)]
        | [Token::NationalStringLiteral(s)]
        | [Token::EscapedStringLiteral(s)]
        | [Token::DoubleQuotedString(s)] => SqlValue::Text(s.clone()),
        [t] if is_word_ci(t, "NULL") => SqlValue::Null,
        [t] if is_word_ci(t, "TRUE") => SqlValue::Bool(true),
        [t] if is_word_ci(t, "FALSE") => SqlValue::Bool(false),
        // MySQL bit literal b'1'
        [t, Token::SingleQuotedString(bits)] if is_word_ci(t, "b") => i64::from_str_radix(bits, 2)
            .map(SqlValue::Int)
            .map_err(|_| ParseError::with_location("Invalid bit literal", render(tokens)))?,
        [Token::SingleQuotedByteStringLiteral(bits)] => i64::from_str_radix(bits, 2)
            .map(SqlValue::Int)
            .map_err(|_| ParseError::with_location("Invalid bit literal", render(tokens)))?,
        // SQL Server N'...' tokenized as a word and a string
        [t, Token::SingleQuotedString(s)] if is_word_ci(t, "N") => SqlValue::Text(s.clone()),
        // PostgreSQL 'x'::type casts
        [first, Token::DoubleColon, ..] => parse_literal(std::slice::from_ref(first))?,
        _ => {
            return Err(ParseError::with_location(
                "Unsupported value expression in VALUES",
                render(tokens),
            ))
        }
    };
    Ok(value)
}

//! Literal formatting for row values and DEFAULT clauses.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{Dialect, NormalizedType};
use crate::error::FormatError;

static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$").expect("numeric pattern is valid")
});

/// A raw scalar value as supplied by the host application
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    /// SQL NULL, or the text `NULL` in any case
    pub fn is_null(&self) -> bool {
        match self {
            SqlValue::Null => true,
            SqlValue::Text(s) => s.eq_ignore_ascii_case("null"),
            _ => false,
        }
    }

    fn as_text(&self) -> String {
        match self {
            SqlValue::Null => String::new(),
            SqlValue::Bool(true) => "1".to_string(),
            SqlValue::Bool(false) => "0".to_string(),
            SqlValue::Int(i) => i.to_string(),
            SqlValue::Float(f) => f.to_string(),
            SqlValue::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            other => f.write_str(&other.as_text()),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v.into())
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

impl TryFrom<serde_json::Value> for SqlValue {
    type Error = FormatError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(SqlValue::Null),
            Value::Bool(b) => Ok(SqlValue::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(SqlValue::Int(i)),
                None => n
                    .as_f64()
                    .map(SqlValue::Float)
                    .ok_or_else(|| FormatError::new(format!("Number {} is out of range", n))),
            },
            Value::String(s) => Ok(SqlValue::Text(s)),
            other @ (Value::Array(_) | Value::Object(_)) => Err(FormatError::new(format!(
                "Expected a scalar value, got {}",
                other
            ))),
        }
    }
}

/// `1`, `"1"`, `true`, `"true"` and `"TRUE"` are true; everything else is false.
pub fn to_boolean(value: &SqlValue) -> bool {
    match value {
        SqlValue::Bool(b) => *b,
        SqlValue::Int(i) => *i == 1,
        SqlValue::Text(s) => matches!(s.as_str(), "1" | "true" | "TRUE"),
        SqlValue::Float(_) | SqlValue::Null => false,
    }
}

/// Boolean literal spelling; SQLite and SQL Server model booleans as integers.
pub fn boolean_literal(value: bool, dialect: Dialect) -> &'static str {
    match (dialect, value) {
        (Dialect::PostgreSQL | Dialect::MySQL | Dialect::MariaDB, true) => "true",
        (Dialect::PostgreSQL | Dialect::MySQL | Dialect::MariaDB, false) => "false",
        (Dialect::SQLite | Dialect::SQLServer, true) => "1",
        (Dialect::SQLite | Dialect::SQLServer, false) => "0",
    }
}

/// Single-quote a string, doubling embedded quotes.
pub fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

pub fn is_numeric_literal(s: &str) -> bool {
    NUMERIC_RE.is_match(s)
}

/// Render a value as a SQL literal for a column of type `ty`.
pub fn format_value(
    value: &SqlValue,
    ty: NormalizedType,
    dialect: Dialect,
) -> Result<String, FormatError> {
    if value.is_null() {
        return Ok("NULL".to_string());
    }

    match ty {
        NormalizedType::Boolean => Ok(boolean_literal(to_boolean(value), dialect).to_string()),
        NormalizedType::Integer | NormalizedType::Float => match value {
            SqlValue::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
            SqlValue::Int(i) => Ok(i.to_string()),
            SqlValue::Float(f) if f.is_finite() => Ok(f.to_string()),
            SqlValue::Float(f) => Err(FormatError::new(format!(
                "{} cannot be written as a {} literal",
                f, ty
            ))),
            SqlValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Ok("NULL".to_string())
                } else if is_numeric_literal(trimmed) {
                    Ok(trimmed.to_string())
                } else {
                    Err(FormatError::new(format!(
                        "'{}' is not a valid {} literal",
                        s, ty
                    )))
                }
            }
            SqlValue::Null => Ok("NULL".to_string()),
        },
        _ => Ok(quote_string(&value.as_text())),
    }
}

/// Classified form of a raw DEFAULT expression
#[derive(Debug, Clone, PartialEq)]
enum DefaultExpr {
    Null,
    Bool(bool),
    Number(String),
    Literal(String),
    CurrentTimestamp,
    CurrentDate,
    Uuid,
    Expression(String),
}

impl DefaultExpr {
    fn classify(raw: &str) -> Self {
        let expr = strip_cast(strip_outer_parens(raw.trim()));
        let compact: String = expr
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        match compact.as_str() {
            "null" => return DefaultExpr::Null,
            "true" => return DefaultExpr::Bool(true),
            "false" => return DefaultExpr::Bool(false),
            "now()" | "getdate()" | "getutcdate()" | "sysdatetime()" | "localtimestamp"
            | "datetime('now')" | "datetime('now','localtime')" | "current_timestamp()" => {
                return DefaultExpr::CurrentTimestamp
            }
            "current_date" | "curdate()" | "current_date()" | "date('now')" => {
                return DefaultExpr::CurrentDate
            }
            "uuid()" | "gen_random_uuid()" | "uuid_generate_v4()" | "newid()" => {
                return DefaultExpr::Uuid
            }
            _ => {}
        }
        if compact.starts_with("current_timestamp") {
            return DefaultExpr::CurrentTimestamp;
        }

        if let Some(text) = unquote_literal(expr) {
            return DefaultExpr::Literal(text);
        }
        if let Some(bits) = compact.strip_prefix("b'").and_then(|s| s.strip_suffix('\'')) {
            return DefaultExpr::Number(bits.to_string());
        }
        if is_numeric_literal(expr) {
            return DefaultExpr::Number(expr.to_string());
        }
        DefaultExpr::Expression(expr.to_string())
    }
}

/// Remove parentheses wrapping the whole expression: `((0))` → `0`.
fn strip_outer_parens(expr: &str) -> &str {
    let mut current = expr.trim();
    while current.starts_with('(') && current.ends_with(')') && encloses_all(current) {
        current = current[1..current.len() - 1].trim();
    }
    current
}

fn encloses_all(expr: &str) -> bool {
    let mut depth = 0usize;
    let mut in_quote = false;
    let last = expr.len() - 1;
    for (i, c) in expr.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth = depth.saturating_sub(1);
                if depth == 0 && i != last {
                    return false;
                }
            }
            _ => {}
        }
    }
    true
}

/// Drop a trailing PostgreSQL cast: `'abc'::character varying` → `'abc'`.
fn strip_cast(expr: &str) -> &str {
    let mut in_quote = false;
    let bytes = expr.as_bytes();
    for i in 0..bytes.len() {
        match bytes[i] {
            b'\'' => in_quote = !in_quote,
            b':' if !in_quote && bytes.get(i + 1) == Some(&b':') => return expr[..i].trim(),
            _ => {}
        }
    }
    expr
}

/// Unescape a single-quoted literal, accepting `N'..'`, `E'..'` and
/// `_charset'..'` prefixes.
fn unquote_literal(expr: &str) -> Option<String> {
    let start = expr.find('\'')?;
    let prefix = &expr[..start];
    let prefix_ok = prefix.is_empty()
        || prefix.eq_ignore_ascii_case("n")
        || prefix.eq_ignore_ascii_case("e")
        || (prefix.starts_with('_') && prefix[1..].chars().all(|c| c.is_ascii_alphanumeric()));
    if !prefix_ok {
        return None;
    }

    let body = expr[start..].strip_prefix('\'')?.strip_suffix('\'')?;
    // every remaining quote must be doubled
    if body.replace("''", "").contains('\'') {
        return None;
    }
    Some(body.replace("''", "'"))
}

fn current_timestamp(_dialect: Dialect) -> &'static str {
    "CURRENT_TIMESTAMP"
}

fn current_date(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::MySQL | Dialect::MariaDB => "(CURRENT_DATE)",
        Dialect::PostgreSQL | Dialect::SQLite => "CURRENT_DATE",
        Dialect::SQLServer => "CAST(GETDATE() AS DATE)",
    }
}

fn uuid_generator(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::MySQL | Dialect::MariaDB => "(UUID())",
        Dialect::PostgreSQL => "gen_random_uuid()",
        Dialect::SQLite => "(lower(hex(randomblob(16))))",
        Dialect::SQLServer => "NEWID()",
    }
}

/// Render the value of a `DEFAULT` clause for the target dialect.
///
/// `NULL` always stays `NULL`. Literals follow [`format_value`]; a literal
/// that does not fit a numeric column is kept quoted rather than rejected.
/// Well-known functions are respelled and unknown expressions pass through.
pub fn format_default(raw: &str, ty: NormalizedType, dialect: Dialect) -> String {
    if raw.trim().eq_ignore_ascii_case("null") {
        return "NULL".to_string();
    }

    match DefaultExpr::classify(raw) {
        DefaultExpr::Null => "NULL".to_string(),
        DefaultExpr::CurrentTimestamp => current_timestamp(dialect).to_string(),
        DefaultExpr::CurrentDate => current_date(dialect).to_string(),
        DefaultExpr::Uuid => uuid_generator(dialect).to_string(),
        DefaultExpr::Bool(b) => format_value(&SqlValue::Bool(b), ty, dialect)
            .unwrap_or_else(|_| boolean_literal(b, dialect).to_string()),
        DefaultExpr::Number(text) | DefaultExpr::Literal(text) => {
            format_value(&SqlValue::Text(text.clone()), ty, dialect)
                .unwrap_or_else(|_| quote_string(&text))
        }
        DefaultExpr::Expression(expr) => expr,
    }
}

//! Identifier quoting for emitted SQL.
//!
//! Identifiers are written unquoted whenever that is safe. Quoting kicks in
//! only for names that are not plain identifiers or that collide with a word
//! in [`RESERVED_WORDS`]. A name reserved in one engine but missing from
//! that list is emitted bare.

use crate::ast::Dialect;

/// Words reserved in at least one supported dialect that commonly show up as
/// column or table names.
const RESERVED_WORDS: &[&str] = &[
    "add", "all", "alter", "and", "as", "asc", "between", "by", "case", "check", "column",
    "constraint", "create", "cross", "current_date", "current_time", "current_timestamp",
    "current_user", "database", "default", "delete", "desc", "distinct", "drop", "else", "end",
    "exists", "foreign", "from", "full", "grant", "group", "having", "in", "index", "inner",
    "insert", "interval", "into", "is", "join", "key", "left", "like", "limit", "not", "null",
    "offset", "on", "or", "order", "outer", "primary", "references", "right", "select", "set",
    "table", "then", "to", "union", "unique", "update", "user", "using", "values", "when",
    "where", "with",
];

/// True when `name` can be written without quotes in every dialect.
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn is_reserved(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    RESERVED_WORDS.binary_search(&lower.as_str()).is_ok()
}

/// Wrap `name` in the dialect's identifier quotes, escaping embedded quotes.
pub fn quote(name: &str, dialect: Dialect) -> String {
    match dialect {
        Dialect::MySQL | Dialect::MariaDB => format!("`{}`", name.replace('`', "``")),
        Dialect::PostgreSQL | Dialect::SQLite => format!("\"{}\"", name.replace('"', "\"\"")),
        Dialect::SQLServer => format!("[{}]", name.replace(']', "]]")),
    }
}

/// Emit an identifier, quoting only when required.
pub fn ident(name: &str, dialect: Dialect) -> String {
    if is_plain_identifier(name) && !is_reserved(name) {
        name.to_string()
    } else {
        quote(name, dialect)
    }
}

/// Emit a comma-separated identifier list
pub fn ident_list(names: &[String], dialect: Dialect) -> String {
    names
        .iter()
        .map(|n| ident(n, dialect))
        .collect::<Vec<_>>()
        .join(", ")
}

// Error types

use thiserror::Error;

use crate::ast::Dialect;

/// Errors that can occur during parsing
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Parse error{}: {message}", .location.as_ref().map(|l| format!(" at `{}`", l)).unwrap_or_default())]
pub struct ParseError {
    pub message: String,
    pub location: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    pub fn with_location(message: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: Some(location.into()),
        }
    }
}

/// Errors that can occur during SQL emission
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Emit error: {message}")]
pub struct EmitError {
    pub message: String,
}

impl EmitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A value could not be rendered as a SQL literal
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Format error: {message}")]
pub struct FormatError {
    pub message: String,
}

impl FormatError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Top-level transpiler errors
#[derive(Error, Debug)]
pub enum TranspileError {
    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(Dialect),

    #[error("Unknown dialect: '{0}'. Supported: mysql, mariadb, postgresql, sqlite, sqlserver")]
    UnknownDialect(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Emit(#[from] EmitError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Tokenizer failures surface as parse errors
impl From<sqlparser::tokenizer::TokenizerError> for ParseError {
    fn from(err: sqlparser::tokenizer::TokenizerError) -> Self {
        ParseError::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        assert_eq!(ParseError::new("boom").to_string(), "Parse error: boom");
        assert_eq!(
            ParseError::with_location("bad column", "x y z").to_string(),
            "Parse error at `x y z`: bad column"
        );
    }

    #[test]
    fn test_transpile_error_wraps_sources() {
        let err: TranspileError = ParseError::new("no CREATE TABLE").into();
        assert_eq!(err.to_string(), "Parse error: no CREATE TABLE");

        let err = TranspileError::UnsupportedDialect(Dialect::SQLite);
        assert_eq!(err.to_string(), "Unsupported dialect: SQLite");
    }
}

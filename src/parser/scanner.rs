//! Token scanning shared by the DDL and INSERT parsers.
//!
//! Tokenizing is delegated to `sqlparser` with the matching dialect so that
//! quoting rules (backticks, double quotes, brackets, doubled quote escapes)
//! are honoured. Everything above the token level, including the
//! parenthesis-aware clause splitter, lives here.

use sqlparser::dialect::{MsSqlDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::tokenizer::{Token, Tokenizer};

use crate::ast::Dialect;
use crate::error::ParseError;

/// Tokenize keeping whitespace and comments, so the tokens can be rendered
/// back into the original text.
pub(crate) fn tokenize_raw(sql: &str, dialect: Dialect) -> Result<Vec<Token>, ParseError> {
    let tokens = match dialect {
        Dialect::MySQL | Dialect::MariaDB => Tokenizer::new(&MySqlDialect {}, sql).tokenize()?,
        Dialect::PostgreSQL => Tokenizer::new(&PostgreSqlDialect {}, sql).tokenize()?,
        Dialect::SQLite => Tokenizer::new(&SQLiteDialect {}, sql).tokenize()?,
        Dialect::SQLServer => Tokenizer::new(&MsSqlDialect {}, sql).tokenize()?,
    };
    Ok(tokens)
}

/// Tokenize and drop whitespace and comments.
pub(crate) fn tokenize(sql: &str, dialect: Dialect) -> Result<Vec<Token>, ParseError> {
    Ok(tokenize_raw(sql, dialect)?
        .into_iter()
        .filter(|t| !matches!(t, Token::Whitespace(_) | Token::EOF))
        .collect())
}

/// Index of the parenthesis closing the one at `open`.
pub(crate) fn matching_paren(tokens: &[Token], open: usize) -> Option<usize> {
    if tokens.get(open) != Some(&Token::LParen) {
        return None;
    }
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on commas at parenthesis depth zero.
///
/// `id int, price decimal(10,2)` yields two clauses; the comma inside
/// `decimal(10,2)` does not split. Unbalanced parentheses and empty clauses
/// are errors.
pub(crate) fn split_top_level(tokens: &[Token]) -> Result<Vec<&[Token]>, ParseError> {
    let mut clauses = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    ParseError::with_location("Unbalanced ')'", render(&tokens[start..=i]))
                })?;
            }
            Token::Comma if depth == 0 => {
                clauses.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ParseError::with_location(
            "Unbalanced '('",
            render(&tokens[start..]),
        ));
    }
    clauses.push(&tokens[start..]);

    if let Some(empty) = clauses.iter().position(|c| c.is_empty()) {
        return Err(ParseError::new(format!(
            "Empty clause at position {} of the column list",
            empty + 1
        )));
    }
    Ok(clauses)
}

/// Split raw tokens into statements on `;` outside parentheses.
pub(crate) fn split_statements(tokens: &[Token]) -> Vec<&[Token]> {
    let mut statements = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            Token::SemiColon if depth == 0 => {
                statements.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    statements.push(&tokens[start..]);
    statements
}

fn is_wordlike(token: &Token) -> bool {
    matches!(
        token,
        Token::Word(_)
            | Token::Number(..)
            | Token::SingleQuotedString(_)
            | Token::DoubleQuotedString(_)
            | Token::NationalStringLiteral(_)
            | Token::EscapedStringLiteral(_)
            | Token::HexStringLiteral(_)
            | Token::SingleQuotedByteStringLiteral(_)
    )
}

const OPERATOR_WORDS: &[&str] = &["AND", "OR", "NOT", "IN", "EXISTS", "BETWEEN", "IS"];

// A sign is unary at the start or after an operator, comma or '('
fn is_unary_position(before: &[Token]) -> bool {
    match before.last() {
        None => true,
        Some(t) => !is_wordlike(t) && *t != Token::RParen,
    }
}

fn needs_space(before: &[Token], token: &Token) -> bool {
    let Some(prev) = before.last() else {
        return false;
    };
    if matches!(
        token,
        Token::Comma
            | Token::RParen
            | Token::Period
            | Token::DoubleColon
            | Token::LBracket
            | Token::RBracket
    ) {
        return false;
    }
    if matches!(
        prev,
        Token::LParen | Token::Period | Token::DoubleColon | Token::LBracket
    ) {
        return false;
    }
    if matches!(prev, Token::Minus | Token::Plus) && is_unary_position(&before[..before.len() - 1])
    {
        return false;
    }
    if *token == Token::LParen {
        return OPERATOR_WORDS.iter().any(|w| is_word_ci(prev, w))
            || (!is_wordlike(prev) && *prev != Token::RParen);
    }
    true
}

/// Render whitespace-free tokens back into SQL text.
pub(crate) fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if needs_space(&tokens[..i], token) {
            out.push(' ');
        }
        out.push_str(&token.to_string());
    }
    out
}

/// Render raw tokens (including whitespace) verbatim.
pub(crate) fn render_raw(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.to_string()).collect::<String>()
}

/// True for an unquoted word equal to `word` (case-insensitive).
pub(crate) fn is_word_ci(token: &Token, word: &str) -> bool {
    matches!(token, Token::Word(w) if w.quote_style.is_none() && w.value.eq_ignore_ascii_case(word))
}

/// Identifier value of a token, without quotes.
pub(crate) fn identifier(token: &Token) -> Option<String> {
    match token {
        Token::Word(w) => Some(w.value.clone()),
        // ANSI-quoted identifiers under MySQL tokenization
        Token::DoubleQuotedString(s) => Some(s.clone()),
        _ => None,
    }
}

/// Cursor over a whitespace-free token slice
pub(crate) struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    #[inline]
    pub fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    #[inline]
    pub fn peek(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset)
    }

    #[inline]
    pub fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    /// Tokens not yet consumed
    pub fn rest(&self) -> &'a [Token] {
        &self.tokens[self.pos.min(self.tokens.len())..]
    }

    pub fn check_word_ci(&self, word: &str) -> bool {
        self.current().is_some_and(|t| is_word_ci(t, word))
    }

    pub fn check_token(&self, expected: &Token) -> bool {
        self.current() == Some(expected)
    }

    pub fn expect_word_ci(&mut self, word: &str) -> bool {
        if self.check_word_ci(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a whole keyword sequence, or nothing.
    pub fn expect_words_ci(&mut self, words: &[&str]) -> bool {
        let matches = words
            .iter()
            .enumerate()
            .all(|(i, w)| self.peek(i).is_some_and(|t| is_word_ci(t, w)));
        if matches {
            self.pos += words.len();
        }
        matches
    }

    /// Consume the first matching word from `words`, returning it.
    pub fn expect_any_word_ci(&mut self, words: &[&'static str]) -> Option<&'static str> {
        let found = words.iter().copied().find(|w| self.check_word_ci(w))?;
        self.advance();
        Some(found)
    }

    pub fn expect_token(&mut self, expected: &Token) -> bool {
        if self.check_token(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Parse an identifier (quoted or not) and return its unquoted value.
    pub fn parse_identifier(&mut self) -> Option<String> {
        let name = identifier(self.current()?)?;
        self.advance();
        Some(name)
    }

    /// Parse `a.b.c`, returning the last part.
    pub fn parse_qualified_name(&mut self) -> Option<String> {
        let mut name = self.parse_identifier()?;
        while self.check_token(&Token::Period) {
            self.advance();
            name = self.parse_identifier()?;
        }
        Some(name)
    }

    /// Consume `( ... )` and return the tokens between the parentheses.
    pub fn consume_parenthesized(&mut self) -> Option<&'a [Token]> {
        let close = matching_paren(self.tokens, self.pos)?;
        let inner = &self.tokens[self.pos + 1..close];
        self.pos = close + 1;
        Some(inner)
    }

    /// Consume tokens up to (not including) the first token at depth zero
    /// for which `stop` holds. The first token is always taken.
    pub fn take_expression(&mut self, stop: impl Fn(&Token) -> bool) -> &'a [Token] {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(token) = self.current() {
            if depth == 0 && self.pos > start && stop(token) {
                break;
            }
            match token {
                Token::LParen => depth += 1,
                Token::RParen => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.advance();
        }
        &self.tokens[start..self.pos]
    }
}

// Table-level constraint clauses

use sqlparser::tokenizer::Token;
use tracing::debug;

use crate::ast::{Constraint, Dialect, ReferentialAction};
use crate::error::ParseError;

use super::scanner::{identifier, is_word_ci, render, split_top_level, TokenCursor};

/// Words that open a table-level clause in every dialect
const CLAUSE_KEYWORDS: &[&str] = &["CONSTRAINT", "PRIMARY", "UNIQUE", "FOREIGN", "CHECK"];

/// Words that follow an index opener, before or after its name
const INDEX_BODY_WORDS: &[&str] = &["KEY", "INDEX", "USING", "CLUSTERED", "NONCLUSTERED"];

/// Index clause openers per dialect. Outside these dialects the words are
/// ordinary column names.
fn index_openers(dialect: Dialect) -> &'static [&'static str] {
    match dialect {
        Dialect::MySQL | Dialect::MariaDB => &["KEY", "INDEX", "FULLTEXT", "SPATIAL"],
        Dialect::SQLServer => &["INDEX"],
        Dialect::PostgreSQL => &["EXCLUDE"],
        Dialect::SQLite => &[],
    }
}

/// A parsed table-level clause
#[derive(Debug, Clone, PartialEq)]
pub enum TableClause {
    PrimaryKey(Vec<String>),
    Constraint(Constraint),
    /// Recognized but not carried into the model (full-text indexes etc.)
    Ignored(String),
}

/// True when the clause is a table-level constraint or index rather than a
/// column. `KEY`, `INDEX` and the like only count where `dialect` uses them
/// that way, and only when an index body follows.
pub(crate) fn is_table_clause(clause: &[Token], dialect: Dialect) -> bool {
    let Some((first, rest)) = clause.split_first() else {
        return false;
    };
    if CLAUSE_KEYWORDS.iter().any(|k| is_word_ci(first, k)) {
        return true;
    }
    // PostgreSQL EXCLUDE takes no name
    let named = dialect != Dialect::PostgreSQL;
    index_openers(dialect).iter().any(|k| is_word_ci(first, k)) && opens_index_body(rest, named)
}

/// `(` or an index word next, or with `named`, an index name before either
fn opens_index_body(rest: &[Token], named: bool) -> bool {
    let opens = |t: &Token| *t == Token::LParen || INDEX_BODY_WORDS.iter().any(|k| is_word_ci(t, k));
    match rest {
        [next, ..] if opens(next) => true,
        [name, next, ..] if named => identifier(name).is_some() && opens(next),
        _ => false,
    }
}

/// Parse a clause already known to be table-level.
pub(crate) fn parse_table_clause(clause: &[Token]) -> Result<TableClause, ParseError> {
    let location = render(clause);
    let mut cursor = TokenCursor::new(clause);

    let name = if cursor.expect_word_ci("CONSTRAINT") {
        let name = cursor
            .parse_identifier()
            .ok_or_else(|| ParseError::with_location("Expected constraint name", &location))?;
        Some(name)
    } else {
        None
    };

    if cursor.expect_words_ci(&["PRIMARY", "KEY"]) {
        skip_index_modifiers(&mut cursor);
        let columns = parse_column_list(&mut cursor, &location)?;
        return Ok(TableClause::PrimaryKey(columns));
    }

    if cursor.expect_word_ci("UNIQUE") {
        let _ = cursor.expect_any_word_ci(&["KEY", "INDEX"]);
        skip_index_modifiers(&mut cursor);
        let index_name = optional_index_name(&mut cursor);
        let columns = parse_column_list(&mut cursor, &location)?;
        return Ok(TableClause::Constraint(Constraint::Unique {
            name: name.or(index_name),
            columns,
        }));
    }

    if cursor.expect_words_ci(&["FOREIGN", "KEY"]) {
        let index_name = optional_index_name(&mut cursor);
        let columns = parse_column_list(&mut cursor, &location)?;
        let fk = parse_references(&mut cursor, name.or(index_name), columns, &location)?;
        return Ok(TableClause::Constraint(fk));
    }

    if cursor.expect_word_ci("CHECK") {
        let expression = parse_check_body(&mut cursor, &location)?;
        return Ok(TableClause::Constraint(Constraint::Check { name, expression }));
    }

    if name.is_none() && cursor.expect_any_word_ci(&["KEY", "INDEX"]).is_some() {
        let index_name = optional_index_name(&mut cursor);
        skip_index_modifiers(&mut cursor);
        let columns = parse_column_list(&mut cursor, &location)?;
        let name = index_name.unwrap_or_else(|| format!("idx_{}", columns.join("_")));
        return Ok(TableClause::Constraint(Constraint::Index { name, columns }));
    }

    if name.is_none()
        && cursor
            .expect_any_word_ci(&["FULLTEXT", "SPATIAL", "EXCLUDE"])
            .is_some()
    {
        debug!(clause = %location, "dropping index clause with no portable equivalent");
        return Ok(TableClause::Ignored(location));
    }

    Err(ParseError::with_location(
        "Unsupported table constraint",
        location,
    ))
}

/// Parse `REFERENCES tbl (cols) [ON DELETE ..] [ON UPDATE ..]` into a
/// foreign key over `columns`.
pub(crate) fn parse_references(
    cursor: &mut TokenCursor<'_>,
    name: Option<String>,
    columns: Vec<String>,
    location: &str,
) -> Result<Constraint, ParseError> {
    if !cursor.expect_word_ci("REFERENCES") {
        return Err(ParseError::with_location("Expected REFERENCES", location));
    }
    let ref_table = cursor
        .parse_qualified_name()
        .ok_or_else(|| ParseError::with_location("Expected referenced table", location))?;
    let ref_columns = if cursor.check_token(&Token::LParen) {
        parse_column_list(cursor, location)?
    } else {
        Vec::new()
    };

    let mut on_delete = None;
    let mut on_update = None;
    loop {
        if cursor.expect_words_ci(&["ON", "DELETE"]) {
            on_delete = Some(parse_action(cursor, location)?);
        } else if cursor.expect_words_ci(&["ON", "UPDATE"]) {
            on_update = Some(parse_action(cursor, location)?);
        } else if cursor.expect_word_ci("MATCH") {
            cursor.advance();
        } else if cursor.expect_words_ci(&["NOT", "DEFERRABLE"])
            || cursor.expect_word_ci("DEFERRABLE")
            || cursor.expect_words_ci(&["INITIALLY", "DEFERRED"])
            || cursor.expect_words_ci(&["INITIALLY", "IMMEDIATE"])
            || cursor.expect_words_ci(&["NOT", "FOR", "REPLICATION"])
        {
            // deferral and replication options are not carried
        } else {
            break;
        }
    }

    Ok(Constraint::ForeignKey {
        name,
        columns,
        ref_table,
        ref_columns,
        on_delete,
        on_update,
    })
}

fn parse_action(
    cursor: &mut TokenCursor<'_>,
    location: &str,
) -> Result<ReferentialAction, ParseError> {
    if cursor.expect_word_ci("CASCADE") {
        Ok(ReferentialAction::Cascade)
    } else if cursor.expect_words_ci(&["SET", "NULL"]) {
        Ok(ReferentialAction::SetNull)
    } else if cursor.expect_words_ci(&["SET", "DEFAULT"]) {
        Ok(ReferentialAction::SetDefault)
    } else if cursor.expect_word_ci("RESTRICT") {
        Ok(ReferentialAction::Restrict)
    } else if cursor.expect_words_ci(&["NO", "ACTION"]) {
        Ok(ReferentialAction::NoAction)
    } else {
        Err(ParseError::with_location(
            "Unknown referential action",
            location,
        ))
    }
}

/// Body of `CHECK ( expr )`, rendered back to text
pub(crate) fn parse_check_body(
    cursor: &mut TokenCursor<'_>,
    location: &str,
) -> Result<String, ParseError> {
    let inner = cursor
        .consume_parenthesized()
        .ok_or_else(|| ParseError::with_location("Expected '(' after CHECK", location))?;
    if inner.is_empty() {
        return Err(ParseError::with_location("Empty CHECK expression", location));
    }
    Ok(render(inner))
}

/// `(a, b(10) DESC, c)`: identifiers only, prefix lengths and sort order dropped
fn parse_column_list(
    cursor: &mut TokenCursor<'_>,
    location: &str,
) -> Result<Vec<String>, ParseError> {
    let inner = cursor
        .consume_parenthesized()
        .ok_or_else(|| ParseError::with_location("Expected column list", location))?;
    if inner.is_empty() {
        return Err(ParseError::with_location("Empty column list", location));
    }
    split_top_level(inner)?
        .into_iter()
        .map(|part| {
            part.first()
                .and_then(identifier)
                .ok_or_else(|| ParseError::with_location("Expected column name", render(part)))
        })
        .collect()
}

fn optional_index_name(cursor: &mut TokenCursor<'_>) -> Option<String> {
    if cursor.check_token(&Token::LParen)
        || ["USING", "CLUSTERED", "NONCLUSTERED"].iter().any(|k| cursor.check_word_ci(k))
    {
        None
    } else {
        let name = cursor.parse_identifier();
        // MySQL `USING BTREE` may follow the name
        if cursor.expect_word_ci("USING") {
            cursor.advance();
        }
        name
    }
}

fn skip_index_modifiers(cursor: &mut TokenCursor<'_>) {
    while cursor
        .expect_any_word_ci(&["CLUSTERED", "NONCLUSTERED"])
        .is_some()
    {}
    if cursor.expect_word_ci("USING") {
        cursor.advance();
    }
}

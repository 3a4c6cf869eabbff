//! Batched INSERT generation.
//!
//! Rows are consumed lazily and turned into one multi-row `INSERT` per
//! batch, so a dump of any size can be streamed to a file or socket without
//! holding more than one batch in memory.
//!
//! ```text
//! INSERT INTO admin (admin_id, active) VALUES
//! ('a1', true),
//! ('a2', false);
//! ```

use std::collections::HashMap;
use std::io::Write;
use std::iter::Fuse;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ast::{ColumnDef, Dialect};
use crate::error::{FormatError, TranspileError};
use crate::identifier::{ident, ident_list};
use crate::value::{format_value, SqlValue};

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// One input record, keyed by column name
pub type Row = HashMap<String, SqlValue>;

/// Dump settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DumpOptions {
    /// Rows per INSERT statement; 0 means [`DEFAULT_BATCH_SIZE`]
    pub batch_size: usize,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl DumpOptions {
    pub fn effective_batch_size(&self) -> usize {
        if self.batch_size == 0 {
            DEFAULT_BATCH_SIZE
        } else {
            self.batch_size
        }
    }
}

/// Build a row from a JSON object.
pub fn row_from_json(value: serde_json::Value) -> Result<Row, FormatError> {
    match value {
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(key, v)| Ok((key, SqlValue::try_from(v)?)))
            .collect(),
        other => Err(FormatError::new(format!(
            "expected a JSON object for a row, got {}",
            other
        ))),
    }
}

fn lookup<'r>(row: &'r Row, name: &str) -> Option<&'r SqlValue> {
    row.get(name).or_else(|| {
        row.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

/// Format one record as a parenthesized VALUES tuple in schema column order.
/// Keys not in `columns` are dropped; missing keys become NULL.
pub fn format_row(columns: &[ColumnDef], row: &Row, dialect: Dialect) -> Result<String, FormatError> {
    let values = columns
        .iter()
        .map(|column| match lookup(row, &column.name) {
            Some(value) => format_value(value, column.normalized_type, dialect).map_err(|e| {
                FormatError::new(format!("column {}: {}", column.name, e.message))
            }),
            None => Ok("NULL".to_string()),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("({})", values.join(", ")))
}

/// Lazy sequence of INSERT statements, one per batch
pub struct InsertBatches<'a, I: Iterator<Item = Row>> {
    columns: &'a [ColumnDef],
    header: String,
    dialect: Dialect,
    batch_size: usize,
    rows: Fuse<I>,
    emitted: usize,
    /// set after the first error; the sequence ends there
    failed: bool,
}

impl<'a, I: Iterator<Item = Row>> Iterator for InsertBatches<'a, I> {
    type Item = Result<String, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let mut tuples = Vec::with_capacity(self.batch_size);
        for row in self.rows.by_ref().take(self.batch_size) {
            match format_row(self.columns, &row, self.dialect) {
                Ok(tuple) => tuples.push(tuple),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
        if tuples.is_empty() {
            return None;
        }

        self.emitted += 1;
        debug!(batch = self.emitted, rows = tuples.len(), "emitting INSERT batch");
        Some(Ok(format!("{}\n{};", self.header, tuples.join(",\n"))))
    }
}

/// Partition `rows` into INSERT statements of at most `batch_size` rows.
///
/// The column list is always the full `columns` order. A `batch_size` of 0
/// falls back to [`DEFAULT_BATCH_SIZE`].
pub fn dump_batches<'a, R>(
    columns: &'a [ColumnDef],
    table: &str,
    rows: R,
    batch_size: usize,
    dialect: Dialect,
) -> InsertBatches<'a, R::IntoIter>
where
    R: IntoIterator<Item = Row>,
{
    let names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
    let header = format!(
        "INSERT INTO {} ({}) VALUES",
        ident(table, dialect),
        ident_list(&names, dialect)
    );
    InsertBatches {
        columns,
        header,
        dialect,
        batch_size: DumpOptions { batch_size }.effective_batch_size(),
        rows: rows.into_iter().fuse(),
        emitted: 0,
        failed: false,
    }
}

/// Statements wrapped around each batch, needed on SQL Server to insert
/// explicit values into an IDENTITY column.
fn identity_insert(columns: &[ColumnDef], table: &str, dialect: Dialect) -> Option<(String, String)> {
    if dialect != Dialect::SQLServer || !columns.iter().any(|c| c.auto_increment) {
        return None;
    }
    let name = ident(table, dialect);
    Some((
        format!("SET IDENTITY_INSERT {} ON;", name),
        format!("SET IDENTITY_INSERT {} OFF;", name),
    ))
}

/// Stream every batch through `sink`; returns the number of statements.
///
/// The sink's error type only needs to absorb [`FormatError`], so callers can
/// forward batches to their own writers and stop on the first failure.
pub fn dump_with<R, F, E>(
    columns: &[ColumnDef],
    table: &str,
    rows: R,
    options: &DumpOptions,
    dialect: Dialect,
    mut sink: F,
) -> Result<usize, E>
where
    R: IntoIterator<Item = Row>,
    F: FnMut(&str) -> Result<(), E>,
    E: From<FormatError>,
{
    let guard = identity_insert(columns, table, dialect);
    let mut count = 0;
    for batch in dump_batches(columns, table, rows, options.effective_batch_size(), dialect) {
        let batch = batch?;
        match &guard {
            Some((on, off)) => sink(&format!("{}\n{}\n{}", on, batch, off))?,
            None => sink(&batch)?,
        }
        count += 1;
    }
    Ok(count)
}

/// Write every batch to `writer`, one statement per line group.
pub fn dump_to_writer<R, W>(
    columns: &[ColumnDef],
    table: &str,
    rows: R,
    options: &DumpOptions,
    dialect: Dialect,
    writer: &mut W,
) -> Result<usize, TranspileError>
where
    R: IntoIterator<Item = Row>,
    W: Write,
{
    dump_with(columns, table, rows, options, dialect, |batch| -> Result<(), TranspileError> {
        writeln!(writer, "{}", batch)?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Length;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("admin_id", "varchar", Some(Length::Size(40))).not_null(),
            ColumnDef::new("active", "tinyint", Some(Length::Size(1))),
        ]
    }

    fn rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| {
                let mut row = Row::new();
                row.insert("admin_id".to_string(), SqlValue::Text(format!("a{}", i)));
                row.insert("active".to_string(), SqlValue::Int((i % 2) as i64));
                row
            })
            .collect()
    }

    #[test]
    fn test_batches_of_two() {
        let cols = columns();
        let batches: Vec<String> = dump_batches(&cols, "admin", rows(5), 2, Dialect::PostgreSQL)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(batches.len(), 3);
        assert_eq!(
            batches[0],
            "INSERT INTO admin (admin_id, active) VALUES\n('a0', false),\n('a1', true);"
        );
        assert_eq!(batches[2], "INSERT INTO admin (admin_id, active) VALUES\n('a4', false);");
    }

    #[test]
    fn test_extra_keys_dropped_missing_keys_null() {
        let cols = columns();
        let mut row = Row::new();
        row.insert("admin_id".to_string(), "x".into());
        row.insert("password".to_string(), "secret".into());
        let batches: Vec<String> = dump_batches(&cols, "admin", vec![row], 0, Dialect::SQLite)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(batches, vec!["INSERT INTO admin (admin_id, active) VALUES\n('x', NULL);".to_string()]);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let cols = columns();
        assert_eq!(dump_batches(&cols, "admin", Vec::new(), 10, Dialect::MySQL).count(), 0);
    }

    #[test]
    fn test_format_error_surfaces() {
        let cols = vec![ColumnDef::new("n", "int", None)];
        let mut row = Row::new();
        row.insert("n".to_string(), "abc".into());
        let mut batches = dump_batches(&cols, "t", vec![row], 10, Dialect::MySQL);
        let err = batches.next().unwrap().unwrap_err();
        assert!(err.message.starts_with("column n:"));
    }

    #[test]
    fn test_error_ends_the_batches() {
        let cols = vec![ColumnDef::new("n", "int", None)];
        let mut rows: Vec<Row> = (0..5)
            .map(|i| {
                let mut row = Row::new();
                row.insert("n".to_string(), SqlValue::Int(i));
                row
            })
            .collect();
        rows[1].insert("n".to_string(), "abc".into());

        let mut batches = dump_batches(&cols, "t", rows, 2, Dialect::MySQL);
        assert!(batches.next().unwrap().is_err());
        assert_eq!(batches.next(), None);
        assert_eq!(batches.next(), None);
    }

    #[test]
    fn test_row_from_json() {
        let row = row_from_json(json!({"admin_id": "a", "active": true, "score": null})).unwrap();
        assert_eq!(row["active"], SqlValue::Bool(true));
        assert_eq!(row["score"], SqlValue::Null);
        assert!(row_from_json(json!([1, 2])).is_err());
        assert!(row_from_json(json!({"nested": {"a": 1}})).is_err());
    }

    #[test]
    fn test_dump_to_writer_streams() {
        let cols = columns();
        let mut out = Vec::new();
        let count = dump_to_writer(
            &cols,
            "admin",
            rows(3),
            &DumpOptions { batch_size: 2 },
            Dialect::MySQL,
            &mut out,
        )
        .unwrap();
        assert_eq!(count, 2);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("INSERT INTO").count(), 2);
    }

    #[test]
    fn test_sqlserver_identity_insert_wrap() {
        let cols = vec![
            ColumnDef::new("id", "int", None).not_null().with_auto_increment(),
            ColumnDef::new("name", "nvarchar", Some(Length::Size(20))),
        ];
        let mut row = Row::new();
        row.insert("id".to_string(), SqlValue::Int(7));
        row.insert("name".to_string(), "N".into());
        let mut seen = Vec::new();
        dump_with(
            &cols,
            "people",
            vec![row],
            &DumpOptions::default(),
            Dialect::SQLServer,
            |batch| -> Result<(), FormatError> {
                seen.push(batch.to_string());
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(
            seen,
            vec!["SET IDENTITY_INSERT people ON;\nINSERT INTO people (id, name) VALUES\n(7, 'N');\nSET IDENTITY_INSERT people OFF;".to_string()]
        );
    }
}

// Main SqlTranspiler

use std::collections::HashMap;

use tracing::debug;

use crate::ast::{Dialect, SchemaTable, Warning};
use crate::dump::{dump_with, DumpOptions};
use crate::emitter::{emitter_for, EmitOptions, SqlEmitter};
use crate::error::TranspileError;
use crate::parser::{self, DdlParser, SqlParser};
use crate::typemap::TypeMapper;

/// Callback invoked once per translation warning
pub type WarningHook = Box<dyn Fn(&Warning) + Send + Sync>;

/// Output of a DDL translation
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub sql: String,
    pub warnings: Vec<Warning>,
}

pub struct SqlTranspiler {
    parsers: HashMap<Dialect, Box<dyn SqlParser>>,
    emitters: HashMap<Dialect, Box<dyn SqlEmitter>>,
    on_warning: Option<WarningHook>,
}

impl Default for SqlTranspiler {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlTranspiler {
    /// A transpiler with a parser and an emitter for every dialect
    pub fn new() -> Self {
        let mut transpiler = Self::empty();
        for dialect in Dialect::ALL {
            transpiler.register_parser(Box::new(DdlParser::new(dialect)));
            transpiler.register_emitter(emitter_for(dialect));
        }
        transpiler
    }

    /// A transpiler with nothing registered
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
            emitters: HashMap::new(),
            on_warning: None,
        }
    }

    pub fn register_parser(&mut self, parser: Box<dyn SqlParser>) {
        self.parsers.insert(parser.dialect(), parser);
    }

    pub fn register_emitter(&mut self, emitter: Box<dyn SqlEmitter>) {
        self.emitters.insert(emitter.dialect(), emitter);
    }

    /// Install a callback for lossy-mapping and capability warnings.
    pub fn on_warning(mut self, hook: impl Fn(&Warning) + Send + Sync + 'static) -> Self {
        self.on_warning = Some(Box::new(hook));
        self
    }

    fn parser(&self, dialect: Dialect) -> Result<&dyn SqlParser, TranspileError> {
        self.parsers
            .get(&dialect)
            .map(|p| p.as_ref())
            .ok_or(TranspileError::UnsupportedDialect(dialect))
    }

    fn emitter(&self, dialect: Dialect) -> Result<&dyn SqlEmitter, TranspileError> {
        self.emitters
            .get(&dialect)
            .map(|e| e.as_ref())
            .ok_or(TranspileError::UnsupportedDialect(dialect))
    }

    fn report(&self, warnings: &[Warning]) {
        if let Some(hook) = &self.on_warning {
            for warning in warnings {
                hook(warning);
            }
        }
    }

    /// Parse the first CREATE TABLE in `sql`
    pub fn parse(&self, sql: &str, from: Dialect) -> Result<SchemaTable, TranspileError> {
        Ok(self.parser(from)?.parse(sql)?)
    }

    /// Rewrite column types of `table` from `from` into `to`.
    pub fn translate_table(
        &self,
        table: &SchemaTable,
        from: Dialect,
        to: Dialect,
    ) -> Result<(SchemaTable, Vec<Warning>), TranspileError> {
        self.emitter(to)?;
        let (translated, warnings) = TypeMapper::new(from, to).translate_table(table);
        self.report(&warnings);
        Ok((translated, warnings))
    }

    /// Emit a table whose types are already expressed in `to`
    pub fn emit(
        &self,
        table: &SchemaTable,
        to: Dialect,
        options: &EmitOptions,
    ) -> Result<String, TranspileError> {
        Ok(self.emitter(to)?.emit_create_table(table, options)?)
    }

    /// Convert one CREATE TABLE statement from one dialect to another
    pub fn convert(
        &self,
        sql: &str,
        from: Dialect,
        to: Dialect,
        options: &EmitOptions,
    ) -> Result<Translation, TranspileError> {
        // 1. Find the right parser and emitter
        let parser = self.parser(from)?;
        let emitter = self.emitter(to)?;

        // 2. Parse source SQL → neutral schema
        let table = parser.parse(sql)?;

        // 3. Map column types into the target vocabulary
        let (translated, warnings) = TypeMapper::new(from, to).translate_table(&table);
        self.report(&warnings);

        // 4. Emit target SQL
        let sql = emitter.emit_create_table(&translated, options)?;
        debug!(table = %translated.name, %from, %to, warnings = warnings.len(), "converted table");

        Ok(Translation { sql, warnings })
    }

    /// Convert every CREATE TABLE in a script; other statements are dropped.
    pub fn convert_script(
        &self,
        sql: &str,
        from: Dialect,
        to: Dialect,
        options: &EmitOptions,
    ) -> Result<Translation, TranspileError> {
        let mut outputs = Vec::new();
        let mut warnings = Vec::new();

        for statement in parser::split_statements(sql, from)? {
            if !parser::contains_create_table(&statement, from)? {
                debug!(statement = %statement, "skipping non-CREATE TABLE statement");
                continue;
            }
            let translation = self.convert(&statement, from, to, options)?;
            outputs.push(translation.sql);
            warnings.extend(translation.warnings);
        }

        Ok(Translation {
            sql: outputs.join("\n\n"),
            warnings,
        })
    }

    /// Re-batch the rows of every INSERT into `table` found in `sql` as
    /// INSERT statements for `to`.
    pub fn convert_inserts(
        &self,
        sql: &str,
        from: Dialect,
        to: Dialect,
        table: &SchemaTable,
        options: &DumpOptions,
    ) -> Result<Vec<String>, TranspileError> {
        self.parser(from)?;
        self.emitter(to)?;

        let mut statements = Vec::new();
        for insert in parser::parse_inserts(sql, from)? {
            if !insert.table.eq_ignore_ascii_case(&table.name) {
                debug!(table = %insert.table, "skipping INSERT into another table");
                continue;
            }
            let records = insert.records(table)?;
            dump_with(
                &table.columns,
                &table.name,
                records,
                options,
                to,
                |batch| -> Result<(), TranspileError> {
                    statements.push(batch.to_string());
                    Ok(())
                },
            )?;
        }
        Ok(statements)
    }
}

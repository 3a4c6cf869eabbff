//! Cross-dialect translation of `CREATE TABLE` statements and table data
//! between MySQL/MariaDB, PostgreSQL, SQLite and SQL Server.
//!
//! ```text
//! DDL text ─► parser ─► SchemaTable ─► TypeMapper ─► emitter ─► DDL text
//! rows ─────────────────────► value formatter ─► dump ─► INSERT batches
//! ```

pub mod ast;
pub mod dump;
pub mod emitter;
pub mod error;
pub mod identifier;
pub mod parser;
pub mod transpiler;
pub mod typemap;
pub mod value;

pub use ast::{
    ColumnDef, Constraint, Dialect, Length, NormalizedType, ReferentialAction, SchemaTable, Warning,
};
pub use dump::{dump_batches, dump_to_writer, dump_with, row_from_json, DumpOptions, Row};
pub use emitter::{emit, EmitOptions, SqlEmitter};
pub use error::{EmitError, FormatError, ParseError, TranspileError};
pub use parser::{parse, parse_insert, split_statements, InsertData, SqlParser};
pub use transpiler::{SqlTranspiler, Translation};
pub use typemap::{map_type, normalize, TypeMapper, TypeMapping};
pub use value::{format_default, format_value, SqlValue};

/// Parse `ddl` written in `from` and emit it for `to` in one step.
pub fn translate_create_table(
    ddl: &str,
    from: Dialect,
    to: Dialect,
    options: &EmitOptions,
) -> Result<Translation, TranspileError> {
    SqlTranspiler::new().convert(ddl, from, to, options)
}

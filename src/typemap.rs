//! Type normalization and cross-dialect type mapping.
//!
//! Every source type token is first classified into a [`NormalizedType`].
//! A target type is then chosen from the class plus a width hint taken from
//! the original token, so `bigint` stays 64-bit and `decimal(10,2)` keeps its
//! precision across dialects.
//!
//! ```text
//! Source token  →  NormalizedType (+ hint)  →  Target token
//!  tinyint(1)   →  Boolean                  →  boolean / bit / integer
//!  bigserial    →  Integer (Big)            →  bigint AUTO_INCREMENT
//! ```
//!
//! Mappings that change the class of a column (for example `json` stored as
//! SQLite `text`) still succeed but come back flagged as lossy.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::ast::{ColumnDef, Dialect, Length, NormalizedType, SchemaTable, Warning};

static TYPE_SPEC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*([a-z_][a-z0-9_]*(?:\s+(?:precision|varying))?)\s*(?:\(\s*([^)]*?)\s*\))?\s*(.*?)\s*$",
    )
    .expect("type spec pattern is valid")
});

/// Split a type string such as `decimal(10,2) unsigned` into its base token,
/// length, and whether it was declared unsigned.
pub fn parse_type_spec(spec: &str) -> Option<(String, Option<Length>, bool)> {
    let caps = TYPE_SPEC_RE.captures(spec)?;
    let base = caps.get(1)?.as_str().to_lowercase();
    let base = base.split_whitespace().collect::<Vec<_>>().join(" ");
    let length = caps.get(2).and_then(|m| parse_length(m.as_str()));
    let unsigned = caps
        .get(3)
        .map(|m| m.as_str().to_lowercase().contains("unsigned"))
        .unwrap_or(false);
    Some((base, length, unsigned))
}

/// Parse the inside of a type's parentheses: `40`, `10,2` or `max`.
pub fn parse_length(args: &str) -> Option<Length> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [one] if one.eq_ignore_ascii_case("max") => Some(Length::Max),
        [one] => one.parse().ok().map(Length::Size),
        [precision, scale] => Some(Length::Precision {
            precision: precision.parse().ok()?,
            scale: scale.parse().ok()?,
        }),
        _ => None,
    }
}

/// Classify a type string that may carry its own length, e.g. `tinyint(1)`.
pub fn normalize_type_string(spec: &str) -> NormalizedType {
    match parse_type_spec(spec) {
        Some((base, length, _)) => normalize(&base, length.as_ref()),
        None => NormalizedType::Unknown,
    }
}

/// Classify a raw type token (case-insensitive, without length).
///
/// `tinyint` with an explicit length of 1 is MySQL's boolean; any other
/// `tinyint` is an integer. This is checked before the length is dropped.
pub fn normalize(raw_type: &str, length: Option<&Length>) -> NormalizedType {
    let lower = raw_type.trim().to_lowercase();
    let base = lower
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or("");

    if base == "tinyint" {
        return if length.and_then(Length::size) == Some(1) {
            NormalizedType::Boolean
        } else {
            NormalizedType::Integer
        };
    }

    match base {
        "int" | "integer" | "smallint" | "mediumint" | "bigint" | "serial" | "bigserial"
        | "smallserial" | "int2" | "int4" | "int8" => NormalizedType::Integer,
        "float" | "double" | "decimal" | "numeric" | "real" | "money" | "smallmoney"
        | "float4" | "float8" | "dec" | "fixed" => NormalizedType::Float,
        "boolean" | "bool" | "bit" => NormalizedType::Boolean,
        "char" | "varchar" | "text" | "tinytext" | "mediumtext" | "longtext" | "nchar"
        | "nvarchar" | "citext" | "character" | "ntext" | "varchar2" | "nvarchar2" | "clob"
        | "string" | "xml" => NormalizedType::String,
        "uuid" | "uniqueidentifier" => NormalizedType::Uuid,
        "json" | "jsonb" => NormalizedType::Json,
        "blob" | "binary" | "varbinary" | "image" | "bytea" | "tinyblob" | "mediumblob"
        | "longblob" => NormalizedType::Binary,
        "date" => NormalizedType::Date,
        "time" | "timetz" => NormalizedType::Time,
        "datetime" | "timestamp" | "year" | "datetime2" | "smalldatetime" | "datetimeoffset"
        | "timestamptz" => NormalizedType::DateTime,
        "enum" | "set" => NormalizedType::Enum,
        "geometry" | "geography" | "point" | "linestring" | "polygon" | "multipoint"
        | "multilinestring" | "multipolygon" | "geometrycollection" => NormalizedType::Geometry,
        _ => NormalizedType::Unknown,
    }
}

/// Storage width of an integer type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    Tiny,
    Small,
    Medium,
    Regular,
    Big,
}

impl IntWidth {
    pub fn of(raw_type: &str) -> Self {
        match base_token(raw_type).as_str() {
            "tinyint" => IntWidth::Tiny,
            "smallint" | "int2" | "smallserial" => IntWidth::Small,
            "mediumint" => IntWidth::Medium,
            "bigint" | "int8" | "bigserial" => IntWidth::Big,
            _ => IntWidth::Regular,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FloatKind {
    Real,
    Double,
    Decimal,
    Money,
    SmallMoney,
}

impl FloatKind {
    fn of(raw_type: &str, length: Option<&Length>) -> Self {
        match base_token(raw_type).as_str() {
            "real" | "float4" => FloatKind::Real,
            "float" if matches!(length, Some(Length::Size(n)) if *n <= 24) => FloatKind::Real,
            "decimal" | "numeric" | "dec" | "fixed" => FloatKind::Decimal,
            "money" => FloatKind::Money,
            "smallmoney" => FloatKind::SmallMoney,
            "" if matches!(length, Some(Length::Precision { .. })) => FloatKind::Decimal,
            _ => FloatKind::Double,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringKind {
    Char,
    Varchar,
    Text,
}

impl StringKind {
    fn of(raw_type: &str, length: Option<&Length>) -> Self {
        match base_token(raw_type).as_str() {
            "char" | "nchar" | "character" if raw_type.contains("varying") => StringKind::Varchar,
            "char" | "nchar" | "character" => StringKind::Char,
            "varchar" | "nvarchar" | "varchar2" | "nvarchar2" => StringKind::Varchar,
            "" if length.is_some() => StringKind::Varchar,
            _ => StringKind::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryKind {
    Fixed,
    Varying,
    Blob,
}

impl BinaryKind {
    fn of(raw_type: &str) -> Self {
        match base_token(raw_type).as_str() {
            "binary" => BinaryKind::Fixed,
            "varbinary" => BinaryKind::Varying,
            _ => BinaryKind::Blob,
        }
    }
}

fn base_token(raw_type: &str) -> String {
    raw_type
        .trim()
        .to_lowercase()
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or("")
        .to_string()
}

fn with_time_zone(raw_type: &str) -> bool {
    let lower = raw_type.to_lowercase();
    matches!(base_token(&lower).as_str(), "timestamptz" | "datetimeoffset")
        || lower.contains("with time zone")
}

/// Result of mapping a type from source to target.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeMapping {
    /// Target type token without length (e.g. "varchar", "double precision").
    pub type_name: String,
    pub length: Option<Length>,
    /// Whether this mapping changes the semantic class of the column.
    pub is_lossy: bool,
    /// Warning message for lossy mappings.
    pub warning: Option<String>,
}

impl TypeMapping {
    /// Create a lossless type mapping.
    pub fn lossless(type_name: impl Into<String>, length: Option<Length>) -> Self {
        Self {
            type_name: type_name.into(),
            length,
            is_lossy: false,
            warning: None,
        }
    }

    /// Create a lossy type mapping with a warning.
    pub fn lossy(
        type_name: impl Into<String>,
        length: Option<Length>,
        warning: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            length,
            is_lossy: true,
            warning: Some(warning.into()),
        }
    }

    /// Target type with length reattached, e.g. `varchar(40)`.
    pub fn target_type(&self) -> String {
        match &self.length {
            Some(length) => format!("{}({})", self.type_name, length),
            None => self.type_name.clone(),
        }
    }
}

/// Maps types for one (source, target) dialect pair.
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper {
    source: Dialect,
    target: Dialect,
}

impl TypeMapper {
    pub fn new(source: Dialect, target: Dialect) -> Self {
        Self { source, target }
    }

    /// Map a normalized type without knowledge of the original token.
    ///
    /// Integers map to the target's regular-width integer; floats map to
    /// `decimal` when a precision/scale is given and to double otherwise.
    pub fn map_type(&self, normalized: NormalizedType, length: Option<&Length>) -> TypeMapping {
        self.map_class(normalized, "", length, false, false)
    }

    /// Map a parsed column. Within one dialect family the source token is
    /// kept verbatim, which preserves e.g. MySQL `timestamp` semantics.
    ///
    /// Unsigned integers widen one step outside MySQL; `bigint unsigned`
    /// has no wider integer and maps lossy.
    pub fn map_column(&self, column: &ColumnDef) -> TypeMapping {
        if self.source.same_family(self.target) {
            return TypeMapping::lossless(column.raw_type.clone(), column.length);
        }
        // suffix words sit after the length, so unknown types carry them inline
        let (hint, length) =
            if column.normalized_type == NormalizedType::Unknown && !column.type_suffix.is_empty() {
                (column.type_with_length(), None)
            } else {
                (column.type_hint(), column.length.as_ref())
            };
        self.map_class(
            column.normalized_type,
            &hint,
            length,
            !column.enum_values.is_empty(),
            column.unsigned,
        )
    }

    /// Produce a new table whose column types are expressed in the target
    /// dialect. The input is left untouched.
    pub fn translate_table(&self, table: &SchemaTable) -> (SchemaTable, Vec<Warning>) {
        let mut warnings = Vec::new();
        let single_key = match table.primary_key.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        };

        let columns = table
            .columns
            .iter()
            .map(|column| {
                let mapping = self.map_column(column);
                if let Some(message) = &mapping.warning {
                    warn!(table = %table.name, column = %column.name, "{}", message);
                    warnings.push(Warning {
                        table: table.name.clone(),
                        column: Some(column.name.clone()),
                        message: message.clone(),
                    });
                }

                let mut mapped = column.clone();
                mapped.raw_type = mapping.type_name.to_lowercase();
                mapped.length = mapping.length;
                if !self.source.same_family(self.target) {
                    mapped.type_suffix.clear();
                }
                if mapped.raw_type != "enum" && mapped.raw_type != "set" {
                    mapped.enum_values.clear();
                }
                if !self.target.is_mysql_family() {
                    mapped.unsigned = false;
                    mapped.on_update_timestamp = false;
                }

                let is_single_key =
                    single_key.is_some_and(|pk| pk.eq_ignore_ascii_case(&column.name));
                if self.target == Dialect::SQLite && column.auto_increment && !is_single_key {
                    let message = "SQLite only supports AUTOINCREMENT on a single-column INTEGER PRIMARY KEY; dropped".to_string();
                    warn!(table = %table.name, column = %column.name, "{}", message);
                    warnings.push(Warning {
                        table: table.name.clone(),
                        column: Some(column.name.clone()),
                        message,
                    });
                    mapped.auto_increment = false;
                }
                mapped
            })
            .collect();

        let translated = SchemaTable::new(
            table.name.clone(),
            columns,
            table.primary_key.clone(),
            table.constraints.clone(),
        );
        (translated, warnings)
    }

    fn map_class(
        &self,
        normalized: NormalizedType,
        raw_type: &str,
        length: Option<&Length>,
        has_enum_values: bool,
        unsigned: bool,
    ) -> TypeMapping {
        match self.target {
            Dialect::MySQL | Dialect::MariaDB => to_mysql(normalized, raw_type, length, has_enum_values),
            Dialect::PostgreSQL => to_postgres(normalized, raw_type, length, unsigned),
            Dialect::SQLite => to_sqlite(normalized, raw_type, length, unsigned),
            Dialect::SQLServer => to_sqlserver(normalized, raw_type, length, unsigned),
        }
    }
}

/// Map a normalized type from `source` to `target`.
pub fn map_type(
    normalized: NormalizedType,
    source: Dialect,
    target: Dialect,
    length: Option<&Length>,
) -> TypeMapping {
    TypeMapper::new(source, target).map_type(normalized, length)
}

fn unmapped(raw_type: &str, length: Option<&Length>, target: &str) -> TypeMapping {
    let name = if raw_type.is_empty() { "text" } else { raw_type };
    TypeMapping::lossy(
        name,
        length.copied(),
        format!("No {} equivalent known for type '{}'; passed through", target, name),
    )
}

/// Unsigned integer one width up; `int` is the target's 4-byte name
fn unsigned_integer(width: IntWidth, tiny: &str, int: &str, target: &str) -> TypeMapping {
    match width {
        IntWidth::Tiny => TypeMapping::lossless(tiny, None),
        IntWidth::Small | IntWidth::Medium => TypeMapping::lossless(int, None),
        IntWidth::Regular => TypeMapping::lossless("bigint", None),
        IntWidth::Big => TypeMapping::lossy(
            "bigint",
            None,
            format!("{} has no unsigned bigint; values above 2^63-1 will not fit", target),
        ),
    }
}

fn sized(length: Option<&Length>) -> Option<Length> {
    match length {
        Some(Length::Size(n)) => Some(Length::Size(*n)),
        _ => None,
    }
}

fn fractional_seconds(length: Option<&Length>) -> Option<Length> {
    match length {
        Some(Length::Size(n)) if *n <= 6 => Some(Length::Size(*n)),
        _ => None,
    }
}

fn to_mysql(
    normalized: NormalizedType,
    raw_type: &str,
    length: Option<&Length>,
    has_enum_values: bool,
) -> TypeMapping {
    match normalized {
        NormalizedType::Integer => {
            let name = match IntWidth::of(raw_type) {
                IntWidth::Tiny => "tinyint",
                IntWidth::Small => "smallint",
                IntWidth::Medium => "mediumint",
                IntWidth::Regular => "int",
                IntWidth::Big => "bigint",
            };
            TypeMapping::lossless(name, None)
        }
        NormalizedType::Float => match FloatKind::of(raw_type, length) {
            FloatKind::Real => TypeMapping::lossless("float", None),
            FloatKind::Double => TypeMapping::lossless("double", None),
            FloatKind::Decimal => TypeMapping::lossless("decimal", length.copied()),
            FloatKind::Money => TypeMapping::lossless("decimal", Some(Length::Precision { precision: 19, scale: 4 })),
            FloatKind::SmallMoney => TypeMapping::lossless("decimal", Some(Length::Precision { precision: 10, scale: 4 })),
        },
        NormalizedType::Boolean => TypeMapping::lossless("tinyint", Some(Length::Size(1))),
        NormalizedType::String => match (StringKind::of(raw_type, length), length) {
            (StringKind::Char, _) => TypeMapping::lossless("char", sized(length)),
            (StringKind::Varchar, Some(Length::Size(n))) => TypeMapping::lossless("varchar", Some(Length::Size(*n))),
            _ => TypeMapping::lossless("longtext", None),
        },
        NormalizedType::Uuid => TypeMapping::lossy(
            "char",
            Some(Length::Size(36)),
            "MySQL has no uuid type; stored as char(36)",
        ),
        NormalizedType::Json => TypeMapping::lossless("json", None),
        NormalizedType::Binary => match (BinaryKind::of(raw_type), length) {
            (BinaryKind::Fixed, _) => TypeMapping::lossless("binary", sized(length)),
            (BinaryKind::Varying, Some(Length::Size(n))) => TypeMapping::lossless("varbinary", Some(Length::Size(*n))),
            _ => TypeMapping::lossless("longblob", None),
        },
        NormalizedType::Date => TypeMapping::lossless("date", None),
        NormalizedType::Time => TypeMapping::lossless("time", fractional_seconds(length)),
        NormalizedType::DateTime => TypeMapping::lossless("datetime", fractional_seconds(length)),
        NormalizedType::Enum if has_enum_values => TypeMapping::lossless("enum", None),
        NormalizedType::Enum => TypeMapping::lossy(
            "varchar",
            Some(Length::Size(255)),
            "enum without member list; stored as varchar(255)",
        ),
        NormalizedType::Geometry => {
            let base = base_token(raw_type);
            if base.is_empty() || base == "geography" {
                TypeMapping::lossless("geometry", None)
            } else {
                TypeMapping::lossless(base, None)
            }
        }
        NormalizedType::Unknown => unmapped(raw_type, length, "MySQL"),
    }
}

fn to_postgres(
    normalized: NormalizedType,
    raw_type: &str,
    length: Option<&Length>,
    unsigned: bool,
) -> TypeMapping {
    match normalized {
        NormalizedType::Integer if unsigned => {
            unsigned_integer(IntWidth::of(raw_type), "smallint", "integer", "PostgreSQL")
        }
        NormalizedType::Integer => {
            let name = match IntWidth::of(raw_type) {
                IntWidth::Tiny | IntWidth::Small => "smallint",
                IntWidth::Medium | IntWidth::Regular => "integer",
                IntWidth::Big => "bigint",
            };
            TypeMapping::lossless(name, None)
        }
        NormalizedType::Float => match FloatKind::of(raw_type, length) {
            FloatKind::Real => TypeMapping::lossless("real", None),
            FloatKind::Double => TypeMapping::lossless("double precision", None),
            FloatKind::Decimal => TypeMapping::lossless("numeric", length.copied()),
            FloatKind::Money => TypeMapping::lossless("money", None),
            FloatKind::SmallMoney => TypeMapping::lossless("numeric", Some(Length::Precision { precision: 10, scale: 4 })),
        },
        NormalizedType::Boolean => TypeMapping::lossless("boolean", None),
        NormalizedType::String => match (StringKind::of(raw_type, length), length) {
            (StringKind::Char, _) => TypeMapping::lossless("char", sized(length)),
            (StringKind::Varchar, Some(Length::Size(n))) => TypeMapping::lossless("varchar", Some(Length::Size(*n))),
            _ => TypeMapping::lossless("text", None),
        },
        NormalizedType::Uuid => TypeMapping::lossless("uuid", None),
        NormalizedType::Json => TypeMapping::lossless("jsonb", None),
        NormalizedType::Binary => TypeMapping::lossless("bytea", None),
        NormalizedType::Date => TypeMapping::lossless("date", None),
        NormalizedType::Time => TypeMapping::lossless("time", fractional_seconds(length)),
        NormalizedType::DateTime if with_time_zone(raw_type) => {
            TypeMapping::lossless("timestamptz", fractional_seconds(length))
        }
        NormalizedType::DateTime => TypeMapping::lossless("timestamp", fractional_seconds(length)),
        NormalizedType::Enum => TypeMapping::lossy(
            "varchar",
            Some(Length::Size(255)),
            "PostgreSQL enum requires CREATE TYPE; stored as varchar(255)",
        ),
        NormalizedType::Geometry => TypeMapping::lossless("geometry", None),
        NormalizedType::Unknown => unmapped(raw_type, length, "PostgreSQL"),
    }
}

fn to_sqlite(
    normalized: NormalizedType,
    raw_type: &str,
    length: Option<&Length>,
    unsigned: bool,
) -> TypeMapping {
    match normalized {
        NormalizedType::Integer if unsigned && IntWidth::of(raw_type) == IntWidth::Big => TypeMapping::lossy(
            "integer",
            None,
            "SQLite integers are signed 64-bit; bigint unsigned values above 2^63-1 will not fit",
        ),
        NormalizedType::Integer => TypeMapping::lossless("integer", None),
        NormalizedType::Float => match FloatKind::of(raw_type, length) {
            FloatKind::Real | FloatKind::Double => TypeMapping::lossless("real", None),
            FloatKind::Decimal => TypeMapping::lossless("numeric", length.copied()),
            FloatKind::Money => TypeMapping::lossless("numeric", Some(Length::Precision { precision: 19, scale: 4 })),
            FloatKind::SmallMoney => TypeMapping::lossless("numeric", Some(Length::Precision { precision: 10, scale: 4 })),
        },
        NormalizedType::Boolean => TypeMapping::lossy(
            "integer",
            None,
            "SQLite has no boolean type; stored as 0/1 integer",
        ),
        NormalizedType::String => match (StringKind::of(raw_type, length), length) {
            (StringKind::Char, Some(Length::Size(n))) => TypeMapping::lossless("char", Some(Length::Size(*n))),
            (StringKind::Varchar, Some(Length::Size(n))) => TypeMapping::lossless("varchar", Some(Length::Size(*n))),
            _ => TypeMapping::lossless("text", None),
        },
        NormalizedType::Uuid => TypeMapping::lossy("text", None, "SQLite has no uuid type; stored as text"),
        NormalizedType::Json => TypeMapping::lossy("text", None, "SQLite has no json type; stored as text"),
        NormalizedType::Binary => TypeMapping::lossless("blob", None),
        NormalizedType::Date => TypeMapping::lossless("date", None),
        NormalizedType::Time => TypeMapping::lossless("time", None),
        NormalizedType::DateTime => TypeMapping::lossless("datetime", None),
        NormalizedType::Enum => TypeMapping::lossy("text", None, "SQLite has no enum type; stored as text"),
        NormalizedType::Geometry => {
            TypeMapping::lossy("blob", None, "SQLite has no geometry type; stored as blob")
        }
        NormalizedType::Unknown => unmapped(raw_type, length, "SQLite"),
    }
}

/// Longest `nvarchar(n)` before SQL Server requires `nvarchar(max)`
const SQLSERVER_MAX_NVARCHAR: u32 = 4000;

fn to_sqlserver(
    normalized: NormalizedType,
    raw_type: &str,
    length: Option<&Length>,
    unsigned: bool,
) -> TypeMapping {
    match normalized {
        NormalizedType::Integer if unsigned => {
            unsigned_integer(IntWidth::of(raw_type), "tinyint", "int", "SQL Server")
        }
        NormalizedType::Integer => {
            // SQL Server tinyint is unsigned, so signed tinyint widens
            let name = match IntWidth::of(raw_type) {
                IntWidth::Tiny | IntWidth::Small => "smallint",
                IntWidth::Medium | IntWidth::Regular => "int",
                IntWidth::Big => "bigint",
            };
            TypeMapping::lossless(name, None)
        }
        NormalizedType::Float => match FloatKind::of(raw_type, length) {
            FloatKind::Real => TypeMapping::lossless("real", None),
            FloatKind::Double => TypeMapping::lossless("float", None),
            FloatKind::Decimal => TypeMapping::lossless("decimal", length.copied()),
            FloatKind::Money => TypeMapping::lossless("money", None),
            FloatKind::SmallMoney => TypeMapping::lossless("smallmoney", None),
        },
        NormalizedType::Boolean => TypeMapping::lossless("bit", None),
        NormalizedType::String => match (StringKind::of(raw_type, length), length) {
            (StringKind::Char, Some(Length::Size(n))) if *n <= SQLSERVER_MAX_NVARCHAR => {
                TypeMapping::lossless("nchar", Some(Length::Size(*n)))
            }
            (StringKind::Varchar | StringKind::Char, Some(Length::Size(n)))
                if *n <= SQLSERVER_MAX_NVARCHAR =>
            {
                TypeMapping::lossless("nvarchar", Some(Length::Size(*n)))
            }
            _ => TypeMapping::lossless("nvarchar", Some(Length::Max)),
        },
        NormalizedType::Uuid => TypeMapping::lossless("uniqueidentifier", None),
        NormalizedType::Json => TypeMapping::lossy(
            "nvarchar",
            Some(Length::Max),
            "SQL Server has no json type; stored as nvarchar(max)",
        ),
        NormalizedType::Binary => match (BinaryKind::of(raw_type), length) {
            (BinaryKind::Fixed, Some(Length::Size(n))) => TypeMapping::lossless("binary", Some(Length::Size(*n))),
            (BinaryKind::Varying, Some(Length::Size(n))) => TypeMapping::lossless("varbinary", Some(Length::Size(*n))),
            _ => TypeMapping::lossless("varbinary", Some(Length::Max)),
        },
        NormalizedType::Date => TypeMapping::lossless("date", None),
        NormalizedType::Time => TypeMapping::lossless("time", fractional_seconds(length)),
        NormalizedType::DateTime if with_time_zone(raw_type) => {
            TypeMapping::lossless("datetimeoffset", fractional_seconds(length))
        }
        NormalizedType::DateTime => TypeMapping::lossless("datetime2", fractional_seconds(length)),
        NormalizedType::Enum => TypeMapping::lossy(
            "nvarchar",
            Some(Length::Size(255)),
            "SQL Server has no enum type; stored as nvarchar(255)",
        ),
        NormalizedType::Geometry => TypeMapping::lossless("geometry", None),
        NormalizedType::Unknown => unmapped(raw_type, length, "SQL Server"),
    }
}

// Dialect-neutral schema model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EmitError, TranspileError};
use crate::typemap;

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    MySQL,
    MariaDB,
    #[serde(alias = "postgres", alias = "pgsql", alias = "pg")]
    PostgreSQL,
    #[serde(alias = "sqlite3")]
    SQLite,
    #[serde(alias = "mssql", alias = "sqlsrv")]
    SQLServer,
}

impl Dialect {
    pub const ALL: [Dialect; 5] = [
        Dialect::MySQL,
        Dialect::MariaDB,
        Dialect::PostgreSQL,
        Dialect::SQLite,
        Dialect::SQLServer,
    ];

    /// MySQL and MariaDB share types, quoting and table options.
    pub fn is_mysql_family(self) -> bool {
        matches!(self, Dialect::MySQL | Dialect::MariaDB)
    }

    /// Two dialects belong to the same family when a type token written for one
    /// is valid, with the same meaning, in the other.
    pub fn same_family(self, other: Dialect) -> bool {
        self == other || (self.is_mysql_family() && other.is_mysql_family())
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::MySQL => write!(f, "MySQL"),
            Dialect::MariaDB => write!(f, "MariaDB"),
            Dialect::PostgreSQL => write!(f, "PostgreSQL"),
            Dialect::SQLite => write!(f, "SQLite"),
            Dialect::SQLServer => write!(f, "SQL Server"),
        }
    }
}

impl FromStr for Dialect {
    type Err = TranspileError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_lowercase().as_str() {
            "mysql" => Ok(Dialect::MySQL),
            "mariadb" => Ok(Dialect::MariaDB),
            "postgresql" | "postgres" | "pgsql" | "pg" => Ok(Dialect::PostgreSQL),
            "sqlite" | "sqlite3" => Ok(Dialect::SQLite),
            "sqlserver" | "mssql" | "sqlsrv" => Ok(Dialect::SQLServer),
            _ => Err(TranspileError::UnknownDialect(name.to_string())),
        }
    }
}

/// Dialect-neutral classification of a column type, used as the pivot
/// between source and target type vocabularies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizedType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Time,
    DateTime,
    Binary,
    Json,
    Uuid,
    Enum,
    Geometry,
    Unknown,
}

impl NormalizedType {
    /// Types whose values are written as bare numeric literals
    pub fn is_numeric(self) -> bool {
        matches!(self, NormalizedType::Integer | NormalizedType::Float)
    }
}

impl fmt::Display for NormalizedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NormalizedType::String => "string",
            NormalizedType::Integer => "integer",
            NormalizedType::Float => "float",
            NormalizedType::Boolean => "boolean",
            NormalizedType::Date => "date",
            NormalizedType::Time => "time",
            NormalizedType::DateTime => "datetime",
            NormalizedType::Binary => "binary",
            NormalizedType::Json => "json",
            NormalizedType::Uuid => "uuid",
            NormalizedType::Enum => "enum",
            NormalizedType::Geometry => "geometry",
            NormalizedType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Length, precision or precision/scale written after a type token.
///
/// `varchar(40)` → `Size(40)`, `decimal(10,2)` → `Precision { 10, 2 }`,
/// `nvarchar(max)` → `Max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Length {
    Size(u32),
    Precision { precision: u32, scale: u32 },
    Max,
}

impl Length {
    /// The single length value, if this is a plain size
    pub fn size(&self) -> Option<u32> {
        match self {
            Length::Size(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Size(n) => write!(f, "{}", n),
            Length::Precision { precision, scale } => write!(f, "{},{}", precision, scale),
            Length::Max => f.write_str("max"),
        }
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    /// Type token as written in the source, lowercased and without length
    pub raw_type: String,
    pub normalized_type: NormalizedType,
    pub length: Option<Length>,
    /// Type words written after the length, e.g. ` with time zone` or `[]`
    pub type_suffix: String,
    /// Members of an `enum(...)` / `set(...)` type
    pub enum_values: Vec<String>,
    pub unsigned: bool,
    pub nullable: bool,
    /// Raw default literal as written in the source DDL, or `NULL`
    pub default_value: Option<String>,
    pub auto_increment: bool,
    pub is_primary_key: bool,
    /// MySQL `ON UPDATE CURRENT_TIMESTAMP`
    pub on_update_timestamp: bool,
    pub comment: Option<String>,
}

impl ColumnDef {
    /// Create a nullable column; the normalized type is derived from `raw_type`.
    pub fn new(name: impl Into<String>, raw_type: impl Into<String>, length: Option<Length>) -> Self {
        let raw_type = raw_type.into().to_lowercase();
        let normalized_type = typemap::normalize(&raw_type, length.as_ref());
        Self {
            name: name.into(),
            raw_type,
            normalized_type,
            length,
            type_suffix: String::new(),
            enum_values: Vec::new(),
            unsigned: false,
            nullable: true,
            default_value: None,
            auto_increment: false,
            is_primary_key: false,
            on_update_timestamp: false,
            comment: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Type token with its length and suffix reattached in source order,
    /// e.g. `varchar(40)`, `timestamp(3) with time zone`, `varchar(20)[]`
    pub fn type_with_length(&self) -> String {
        if !self.enum_values.is_empty() {
            let values: Vec<String> = self
                .enum_values
                .iter()
                .map(|v| format!("'{}'", v.replace('\'', "''")))
                .collect();
            return format!("{}({})", self.raw_type, values.join(", "));
        }
        match &self.length {
            Some(length) => format!("{}({}){}", self.raw_type, length, self.type_suffix),
            None => format!("{}{}", self.raw_type, self.type_suffix),
        }
    }

    /// Raw type plus suffix words, used as a mapping hint
    pub fn type_hint(&self) -> String {
        format!("{}{}", self.raw_type, self.type_suffix)
    }
}

/// Referential actions for foreign keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferentialAction {
    Cascade,
    SetNull,
    SetDefault,
    Restrict,
    NoAction,
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::NoAction => "NO ACTION",
        };
        f.write_str(s)
    }
}

/// Table constraints other than the primary key
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Unique {
        name: Option<String>,
        columns: Vec<String>,
    },
    ForeignKey {
        name: Option<String>,
        columns: Vec<String>,
        ref_table: String,
        ref_columns: Vec<String>,
        on_delete: Option<ReferentialAction>,
        on_update: Option<ReferentialAction>,
    },
    Check {
        name: Option<String>,
        expression: String,
    },
    Index {
        name: String,
        columns: Vec<String>,
    },
}

/// One parsed table
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaTable {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    /// Primary key columns in declaration order; empty when none is declared
    pub primary_key: Vec<String>,
    pub constraints: Vec<Constraint>,
}

impl SchemaTable {
    /// Build a table and mark every column named in `primary_key`.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<ColumnDef>,
        primary_key: Vec<String>,
        constraints: Vec<Constraint>,
    ) -> Self {
        let mut columns = columns;
        for column in &mut columns {
            column.is_primary_key = primary_key
                .iter()
                .any(|pk| pk.eq_ignore_ascii_case(&column.name));
        }
        Self {
            name: name.into(),
            columns,
            primary_key,
            constraints,
        }
    }

    /// Case-insensitive column lookup
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn has_composite_key(&self) -> bool {
        self.primary_key.len() > 1
    }

    /// Check unique column names and that the primary key names real columns.
    pub fn validate(&self) -> Result<(), EmitError> {
        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i]
                .iter()
                .any(|c| c.name.eq_ignore_ascii_case(&column.name))
            {
                return Err(EmitError::new(format!(
                    "Duplicate column '{}' in table '{}'",
                    column.name, self.name
                )));
            }
        }
        for pk in &self.primary_key {
            if self.column(pk).is_none() {
                return Err(EmitError::new(format!(
                    "Primary key column '{}' does not exist in table '{}'",
                    pk, self.name
                )));
            }
        }
        Ok(())
    }

    /// Union of two descriptions of the same table.
    ///
    /// Columns keep `self`'s order, followed by columns only `other` has.
    /// `self`'s primary key wins unless it is empty.
    pub fn merge(&self, other: &SchemaTable) -> SchemaTable {
        let mut columns = self.columns.clone();
        for column in &other.columns {
            if self.column(&column.name).is_none() {
                columns.push(column.clone());
            }
        }

        let primary_key = if self.primary_key.is_empty() {
            other.primary_key.clone()
        } else {
            self.primary_key.clone()
        };

        let mut constraints = self.constraints.clone();
        for constraint in &other.constraints {
            if !constraints.contains(constraint) {
                constraints.push(constraint.clone());
            }
        }

        SchemaTable::new(self.name.clone(), columns, primary_key, constraints)
    }
}

/// Diagnostic raised when a translation is lossy or partially expressible
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub table: String,
    pub column: Option<String>,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.column {
            Some(column) => write!(f, "{}.{}: {}", self.table, column, self.message),
            None => write!(f, "{}: {}", self.table, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> SchemaTable {
        SchemaTable::new(
            "users",
            vec![
                ColumnDef::new("id", "int", None).not_null(),
                ColumnDef::new("email", "varchar", Some(Length::Size(255))),
            ],
            vec!["id".to_string()],
            vec![],
        )
    }

    #[test]
    fn test_dialect_from_str_aliases() {
        assert_eq!("postgres".parse::<Dialect>().unwrap(), Dialect::PostgreSQL);
        assert_eq!("MSSQL".parse::<Dialect>().unwrap(), Dialect::SQLServer);
        assert_eq!("sqlite3".parse::<Dialect>().unwrap(), Dialect::SQLite);
        assert!(matches!(
            "oracle".parse::<Dialect>(),
            Err(TranspileError::UnknownDialect(_))
        ));
    }

    #[test]
    fn test_dialect_deserialize() {
        let d: Dialect = serde_json::from_str("\"pg\"").unwrap();
        assert_eq!(d, Dialect::PostgreSQL);
        let d: Dialect = serde_json::from_str("\"mariadb\"").unwrap();
        assert!(d.is_mysql_family());
    }

    #[test]
    fn test_new_marks_primary_key() {
        let table = users();
        assert!(table.column("ID").unwrap().is_primary_key);
        assert!(!table.column("email").unwrap().is_primary_key);
    }

    #[test]
    fn test_validate_rejects_duplicate_and_dangling_key() {
        let mut table = users();
        table.columns.push(ColumnDef::new("EMAIL", "text", None));
        assert!(table.validate().is_err());

        let table = SchemaTable::new("t", vec![ColumnDef::new("a", "int", None)], vec!["b".into()], vec![]);
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_merge_is_pure_union() {
        let a = users();
        let b = SchemaTable::new(
            "users",
            vec![
                ColumnDef::new("email", "text", None),
                ColumnDef::new("created_at", "datetime", None),
            ],
            vec![],
            vec![Constraint::Unique {
                name: None,
                columns: vec!["email".into()],
            }],
        );

        let merged = a.merge(&b);
        let names: Vec<&str> = merged.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "email", "created_at"]);
        assert_eq!(merged.primary_key, vec!["id".to_string()]);
        assert_eq!(merged.constraints.len(), 1);
        // inputs untouched
        assert_eq!(a.columns.len(), 2);
        assert_eq!(b.columns.len(), 2);
    }

    #[test]
    fn test_type_with_length() {
        let col = ColumnDef::new("price", "DECIMAL", Some(Length::Precision { precision: 10, scale: 2 }));
        assert_eq!(col.type_with_length(), "decimal(10,2)");
        assert_eq!(col.normalized_type, NormalizedType::Float);
    }
}

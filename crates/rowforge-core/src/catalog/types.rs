use serde::{Deserialize, Serialize};
use std::fmt;

/// A schema-qualified table name. Equality is exact (case-sensitive);
/// case-insensitive matching happens in the catalog queries themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: String,
    pub table: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Fully-qualified `schema.table` form, used as the id-cache key.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Normalized PostgreSQL column type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    SmallInt,
    Integer,
    BigInt,
    Float,
    Double,
    Numeric,
    Char,
    VarChar,
    Text,
    Boolean,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Uuid,
    Json,
    Jsonb,
    Binary,
    /// Unrecognized type, kept verbatim so errors can name it.
    Unknown(String),
}

impl DataType {
    /// Parse an `information_schema.columns.data_type` string.
    pub fn from_raw(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "smallint" | "int2" => DataType::SmallInt,
            "integer" | "int" | "int4" => DataType::Integer,
            "bigint" | "int8" => DataType::BigInt,
            "real" | "float4" => DataType::Float,
            "double precision" | "float8" => DataType::Double,
            s if s.starts_with("numeric") || s.starts_with("decimal") => DataType::Numeric,
            s if s.starts_with("character varying") || s.starts_with("varchar") => {
                DataType::VarChar
            }
            s if s.starts_with("character") || s.starts_with("char") || s == "bpchar" => {
                DataType::Char
            }
            "text" | "citext" | "name" => DataType::Text,
            "boolean" | "bool" => DataType::Boolean,
            "date" => DataType::Date,
            "time" | "time without time zone" | "time with time zone" => DataType::Time,
            "timestamp" | "timestamp without time zone" => DataType::Timestamp,
            "timestamp with time zone" | "timestamptz" => DataType::TimestampTz,
            "uuid" => DataType::Uuid,
            "json" => DataType::Json,
            "jsonb" => DataType::Jsonb,
            "bytea" => DataType::Binary,
            other => DataType::Unknown(other.to_string()),
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, DataType::Char | DataType::VarChar | DataType::Text)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::SmallInt => write!(f, "smallint"),
            DataType::Integer => write!(f, "integer"),
            DataType::BigInt => write!(f, "bigint"),
            DataType::Float => write!(f, "real"),
            DataType::Double => write!(f, "double precision"),
            DataType::Numeric => write!(f, "numeric"),
            DataType::Char => write!(f, "char"),
            DataType::VarChar => write!(f, "varchar"),
            DataType::Text => write!(f, "text"),
            DataType::Boolean => write!(f, "boolean"),
            DataType::Date => write!(f, "date"),
            DataType::Time => write!(f, "time"),
            DataType::Timestamp => write!(f, "timestamp"),
            DataType::TimestampTz => write!(f, "timestamptz"),
            DataType::Uuid => write!(f, "uuid"),
            DataType::Json => write!(f, "json"),
            DataType::Jsonb => write!(f, "jsonb"),
            DataType::Binary => write!(f, "bytea"),
            DataType::Unknown(s) => write!(f, "{}", s),
        }
    }
}

/// What the database does with a column when the INSERT omits it.
///
/// Derived from `column_default` and `is_identity`; any of the `Auto*`
/// kinds (and `HasDefault`) mean the column can be left out entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefaultKind {
    AutoIncrement,
    AutoUuid,
    AutoTimestamp,
    HasDefault,
    NoDefault,
}

impl DefaultKind {
    pub fn from_catalog(column_default: Option<&str>, is_identity: bool) -> Self {
        if is_identity {
            return DefaultKind::AutoIncrement;
        }
        let Some(default) = column_default else {
            return DefaultKind::NoDefault;
        };
        let d = default.trim().to_lowercase();
        if d.starts_with("nextval(") {
            DefaultKind::AutoIncrement
        } else if d.starts_with("gen_random_uuid") || d.starts_with("uuid_generate") {
            DefaultKind::AutoUuid
        } else if d.starts_with("now()")
            || d.starts_with("current_timestamp")
            || d.starts_with("clock_timestamp")
            || d.starts_with("statement_timestamp")
        {
            DefaultKind::AutoTimestamp
        } else {
            DefaultKind::HasDefault
        }
    }

    /// True when the database fills the column on its own.
    pub fn is_generated(&self) -> bool {
        !matches!(self, DefaultKind::NoDefault)
    }
}

/// One column as the catalog describes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: DataType,
    pub raw_type: String,
    pub nullable: bool,
    pub default_kind: DefaultKind,
    pub max_length: Option<u32>,
    pub numeric_precision: Option<u32>,
    pub numeric_scale: Option<u32>,
    pub ordinal_position: u32,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, data_type: DataType, raw_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type,
            raw_type: raw_type.into(),
            nullable: true,
            default_kind: DefaultKind::NoDefault,
            max_length: None,
            numeric_precision: None,
            numeric_scale: None,
            ordinal_position: 0,
        }
    }
}

/// One foreign-key constraint, read from the catalog. Immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FkEdge {
    pub constraint: Option<String>,
    pub source: TableRef,
    pub source_column: String,
    pub target: TableRef,
    pub target_column: String,
}

impl FkEdge {
    /// Identity used for cycle suppression: one expansion per
    /// source-table/target-table pair within a single tree build.
    pub fn identity(&self) -> String {
        format!("{}\u{2192}{}", self.source.qualified(), self.target.qualified())
    }
}

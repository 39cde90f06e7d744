//! Schema metadata types for domains, tables and stored procedures.
//!
//! Two layers live here: the catalog-level [`CatalogFieldDescriptor`] that
//! describes a field exactly as the engine stores it, and the resolved
//! definitions ([`DomainDefinition`], [`TableDefinition`],
//! [`ProcedureDefinition`]) that carry a ready-to-emit type expression.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Base storage type of a field, keyed by the `RDB$FIELD_TYPE` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    SmallInt,
    Integer,
    Float,
    Date,
    Time,
    Char,
    BigInt,
    Boolean,
    DecFloat16,
    DecFloat34,
    Int128,
    Double,
    TimeTz,
    TimestampTz,
    Timestamp,
    Varchar,
    Blob,
    /// A code this tool does not know about.
    Unknown(i16),
}

impl FieldType {
    /// Map an `RDB$FIELD_TYPE` code.
    pub fn from_code(code: i16) -> Self {
        match code {
            7 => FieldType::SmallInt,
            8 => FieldType::Integer,
            10 => FieldType::Float,
            12 => FieldType::Date,
            13 => FieldType::Time,
            14 => FieldType::Char,
            16 => FieldType::BigInt,
            23 => FieldType::Boolean,
            24 => FieldType::DecFloat16,
            25 => FieldType::DecFloat34,
            26 => FieldType::Int128,
            27 => FieldType::Double,
            28 => FieldType::TimeTz,
            29 => FieldType::TimestampTz,
            35 => FieldType::Timestamp,
            37 => FieldType::Varchar,
            261 => FieldType::Blob,
            other => FieldType::Unknown(other),
        }
    }

    /// SQL name of the base type.
    pub fn sql_name(&self) -> &'static str {
        match self {
            FieldType::SmallInt => "SMALLINT",
            FieldType::Integer => "INTEGER",
            FieldType::Float => "FLOAT",
            FieldType::Date => "DATE",
            FieldType::Time => "TIME",
            FieldType::Char => "CHAR",
            FieldType::BigInt => "BIGINT",
            FieldType::Boolean => "BOOLEAN",
            FieldType::DecFloat16 => "DECFLOAT(16)",
            FieldType::DecFloat34 => "DECFLOAT(34)",
            FieldType::Int128 => "INT128",
            FieldType::Double => "DOUBLE PRECISION",
            FieldType::TimeTz => "TIME WITH TIME ZONE",
            FieldType::TimestampTz => "TIMESTAMP WITH TIME ZONE",
            FieldType::Timestamp => "TIMESTAMP",
            FieldType::Varchar => "VARCHAR",
            FieldType::Blob => "BLOB",
            FieldType::Unknown(_) => "UNKNOWN",
        }
    }

    /// Integer storage types that the engine also uses for DECIMAL/NUMERIC.
    pub fn is_integer_family(&self) -> bool {
        matches!(
            self,
            FieldType::SmallInt | FieldType::Integer | FieldType::BigInt | FieldType::Int128
        )
    }

    /// Character types that take a length.
    pub fn is_character(&self) -> bool {
        matches!(self, FieldType::Char | FieldType::Varchar)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// A field as described by `RDB$FIELDS`, joined with the referencing row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogFieldDescriptor {
    /// Base storage type.
    pub field_type: FieldType,

    /// `RDB$FIELD_LENGTH`, in bytes.
    pub storage_length: i32,

    /// `RDB$CHARACTER_LENGTH`, in characters (NULL for non-character types).
    pub character_length: Option<i32>,

    /// `RDB$FIELD_SCALE`. Negative for fixed-point decimals.
    pub scale: i32,

    /// `RDB$FIELD_PRECISION`. Zero when the engine did not persist it.
    pub precision: i32,

    /// Whether the field accepts NULL (`RDB$NULL_FLAG` unset).
    pub nullable: bool,

    /// `RDB$SYSTEM_FLAG` of the field source.
    pub is_system_defined: bool,

    /// Name of the field source (domain) when the row references one.
    pub field_source: Option<String>,
}

impl CatalogFieldDescriptor {
    /// Descriptor for a plain base type with no domain reference.
    pub fn base(field_type: FieldType) -> Self {
        Self {
            field_type,
            storage_length: 0,
            character_length: None,
            scale: 0,
            precision: 0,
            nullable: true,
            is_system_defined: false,
            field_source: None,
        }
    }
}

/// A fully-formed SQL type clause, e.g. `VARCHAR(40)` or `DECIMAL(9,2)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedType {
    pub expression: String,
}

impl ResolvedType {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.expression
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

/// Domain metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainDefinition {
    pub name: String,
    pub resolved_type: ResolvedType,
    pub not_null: bool,
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub resolved_type: ResolvedType,

    /// Column-level NOT NULL. Only populated when column nullability export
    /// is enabled; otherwise nullability rides on the domain.
    #[serde(default)]
    pub not_null: bool,
}

/// Table metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,

    /// Columns in `RDB$FIELD_POSITION` order.
    pub columns: Vec<ColumnDefinition>,
}

/// Direction of a procedure parameter (`RDB$PARAMETER_TYPE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterDirection {
    In,
    Out,
}

impl ParameterDirection {
    /// 0 is input, anything else is output.
    pub fn from_flag(flag: i64) -> Self {
        if flag == 0 {
            ParameterDirection::In
        } else {
            ParameterDirection::Out
        }
    }
}

/// Stored procedure parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureParameter {
    pub name: String,
    pub resolved_type: ResolvedType,
    pub direction: ParameterDirection,
}

/// Stored procedure metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureDefinition {
    pub name: String,
    pub inputs: Vec<ProcedureParameter>,
    pub outputs: Vec<ProcedureParameter>,

    /// `RDB$PROCEDURE_SOURCE`, verbatim.
    pub body_source: String,
}

/// Resolved schema of one database, ready for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub domains: Vec<DomainDefinition>,
    pub tables: Vec<TableDefinition>,
    pub procedures: Vec<ProcedureDefinition>,
}

impl SchemaSnapshot {
    pub fn object_count(&self) -> usize {
        self.domains.len() + self.tables.len() + self.procedures.len()
    }
}

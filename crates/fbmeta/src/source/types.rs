//! Raw catalog records, before type resolution.

use serde::{Deserialize, Serialize};

use crate::core::{CatalogFieldDescriptor, ParameterDirection};

/// A user-defined domain from `RDB$FIELDS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDomain {
    pub name: String,
    /// The domain's own field description. `field_source` is always `None`
    /// so that resolution goes to the base type.
    pub field: CatalogFieldDescriptor,
}

/// A column from `RDB$RELATION_FIELDS` joined to its field source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogColumn {
    pub name: String,
    /// `RDB$FIELD_POSITION`.
    pub position: i32,
    pub field: CatalogFieldDescriptor,
    /// Column-level `RDB$NULL_FLAG` (distinct from the domain's).
    pub column_not_null: bool,
}

/// A table from `RDB$RELATIONS` with its columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTable {
    pub name: String,
    /// Columns in position order.
    pub columns: Vec<CatalogColumn>,
}

/// A parameter from `RDB$PROCEDURE_PARAMETERS` joined to its field source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogParameter {
    pub name: String,
    pub direction: ParameterDirection,
    /// `RDB$PARAMETER_NUMBER`, counted separately per direction.
    pub number: i32,
    pub field: CatalogFieldDescriptor,
}

/// A stored procedure from `RDB$PROCEDURES` with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProcedure {
    pub name: String,
    /// `RDB$PROCEDURE_SOURCE`; empty when the engine stored none.
    pub source: String,
    /// Input parameters in parameter-number order.
    pub inputs: Vec<CatalogParameter>,
    /// Output parameters in parameter-number order.
    pub outputs: Vec<CatalogParameter>,
}

/// Everything the reader extracted in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub domains: Vec<CatalogDomain>,
    pub tables: Vec<CatalogTable>,
    pub procedures: Vec<CatalogProcedure>,
}

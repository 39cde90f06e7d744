//! Core abstractions shared by every stage of the pipeline.
//!
//! - [`schema`]: catalog descriptors and resolved schema definitions
//! - [`value`]: query rows and values
//! - [`traits`]: the connection boundary
//! - [`identifier`]: identifier quoting and reserved-name checks

pub mod identifier;
pub mod schema;
pub mod traits;
pub mod value;

pub use schema::{
    CatalogFieldDescriptor, ColumnDefinition, DomainDefinition, FieldType, ParameterDirection,
    ProcedureDefinition, ProcedureParameter, ResolvedType, SchemaSnapshot, TableDefinition,
};
pub use traits::{Connection, ConnectionFactory};
pub use value::{Row, SqlValue};

//! Type resolution from catalog descriptors to SQL type expressions.
//!
//! Resolution order:
//!
//! 1. A field whose source is a user-defined domain resolves to the domain
//!    name.
//! 2. Integer storage with a negative scale is a fixed-point decimal and
//!    resolves to `DECIMAL(p,s)`, with a per-type default precision when the
//!    engine did not store one.
//! 3. `CHAR`/`VARCHAR` take their character length (or the raw storage
//!    length when no character length is recorded).
//! 4. Everything else is the bare base type name.
//!
//! Resolution is pure and never fails. Unknown type codes resolve to
//! `UNKNOWN` so a single odd field cannot abort an export.

use tracing::warn;

use crate::core::identifier::{is_reserved_name, quote_ident};
use crate::core::{
    CatalogFieldDescriptor, ColumnDefinition, DomainDefinition, FieldType, ProcedureDefinition,
    ProcedureParameter, ResolvedType, SchemaSnapshot, TableDefinition,
};
use crate::source::{CatalogParameter, CatalogSnapshot};

/// Precision assumed for a fixed-point decimal whose precision was not stored.
pub fn default_decimal_precision(field_type: FieldType) -> i32 {
    match field_type {
        FieldType::SmallInt => 4,
        FieldType::Integer => 9,
        FieldType::BigInt => 18,
        FieldType::Int128 => 38,
        _ => 18,
    }
}

/// Returns the domain name when the descriptor references a user-defined
/// domain rather than an auto-generated field source.
pub fn user_domain(field: &CatalogFieldDescriptor) -> Option<&str> {
    match field.field_source.as_deref() {
        Some(name) if !name.is_empty() && !is_reserved_name(name) && !field.is_system_defined => {
            Some(name)
        }
        _ => None,
    }
}

/// Resolve a column or parameter type. Domain references take precedence.
pub fn resolve(field: &CatalogFieldDescriptor) -> ResolvedType {
    match user_domain(field) {
        Some(domain) => ResolvedType::new(quote_ident(domain)),
        None => resolve_base(field),
    }
}

/// Resolve from the base storage type only, ignoring any domain reference.
pub fn resolve_base(field: &CatalogFieldDescriptor) -> ResolvedType {
    let ft = field.field_type;

    if ft.is_integer_family() && field.scale < 0 {
        let precision = if field.precision == 0 {
            default_decimal_precision(ft)
        } else {
            field.precision
        };
        return ResolvedType::new(format!("DECIMAL({},{})", precision, -field.scale));
    }

    if ft.is_character() {
        let length = match field.character_length {
            Some(len) if len > 0 => len,
            _ => field.storage_length,
        };
        return ResolvedType::new(format!("{}({})", ft.sql_name(), length));
    }

    ResolvedType::new(ft.sql_name())
}

/// Options for lifting a catalog snapshot into resolved definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Carry column-level NOT NULL into table definitions.
    pub column_not_null: bool,
}

/// Resolve every object of a catalog snapshot.
pub fn resolve_catalog(catalog: &CatalogSnapshot, opts: ResolveOptions) -> SchemaSnapshot {
    let domains = catalog
        .domains
        .iter()
        .map(|d| DomainDefinition {
            name: d.name.clone(),
            resolved_type: checked(&d.name, &d.field, resolve_base(&d.field)),
            not_null: !d.field.nullable,
        })
        .collect();

    let tables = catalog
        .tables
        .iter()
        .map(|t| TableDefinition {
            name: t.name.clone(),
            columns: t
                .columns
                .iter()
                .map(|c| ColumnDefinition {
                    name: c.name.clone(),
                    resolved_type: checked(
                        &format!("{}.{}", t.name, c.name),
                        &c.field,
                        resolve(&c.field),
                    ),
                    not_null: opts.column_not_null && c.column_not_null,
                })
                .collect(),
        })
        .collect();

    let procedures = catalog
        .procedures
        .iter()
        .map(|p| ProcedureDefinition {
            name: p.name.clone(),
            inputs: resolve_parameters(&p.name, &p.inputs),
            outputs: resolve_parameters(&p.name, &p.outputs),
            body_source: p.source.clone(),
        })
        .collect();

    SchemaSnapshot {
        domains,
        tables,
        procedures,
    }
}

fn resolve_parameters(procedure: &str, params: &[CatalogParameter]) -> Vec<ProcedureParameter> {
    params
        .iter()
        .map(|p| ProcedureParameter {
            name: p.name.clone(),
            resolved_type: checked(
                &format!("{}.{}", procedure, p.name),
                &p.field,
                resolve(&p.field),
            ),
            direction: p.direction,
        })
        .collect()
}

/// Log fields that resolved to the UNKNOWN sentinel so they can be fixed by hand.
fn checked(object: &str, field: &CatalogFieldDescriptor, resolved: ResolvedType) -> ResolvedType {
    if let FieldType::Unknown(code) = field.field_type {
        if user_domain(field).is_none() {
            warn!(
                "{}: unrecognized field type code {}, emitting UNKNOWN",
                object, code
            );
        }
    }
    resolved
}

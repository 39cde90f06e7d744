//! Catalog reader: extracts domains, tables and procedures from the
//! Firebird system tables.
//!
//! The reader is read-only and does no type resolution. It turns catalog rows
//! into [`CatalogFieldDescriptor`]s and leaves the rest to
//! [`crate::typemap`]. Any rejected query or malformed row aborts the whole
//! read; a partial snapshot is never returned.

mod queries;
mod types;

pub use types::*;

use tracing::{debug, info};

use crate::core::identifier::is_reserved_name;
use crate::core::{CatalogFieldDescriptor, Connection, FieldType, ParameterDirection, Row};
use crate::error::{MetaError, Result};

/// Reads schema metadata over an open connection.
pub struct CatalogReader<'a> {
    conn: &'a mut dyn Connection,
}

impl<'a> CatalogReader<'a> {
    pub fn new(conn: &'a mut dyn Connection) -> Self {
        Self { conn }
    }

    /// Read domains, tables and procedures.
    pub fn read_all(&mut self) -> Result<CatalogSnapshot> {
        let domains = self.read_domains()?;
        let tables = self.read_tables()?;
        let procedures = self.read_procedures()?;

        info!(
            "Read catalog: {} domains, {} tables, {} procedures",
            domains.len(),
            tables.len(),
            procedures.len()
        );

        Ok(CatalogSnapshot {
            domains,
            tables,
            procedures,
        })
    }

    /// Read user-defined domains.
    pub fn read_domains(&mut self) -> Result<Vec<CatalogDomain>> {
        let context = "listing domains";
        let rows = self.query(queries::DOMAINS, context)?;

        let mut domains = Vec::with_capacity(rows.len());
        for row in &rows {
            let name = required_text(row, 0, context)?;
            let field = parse_field(row, 1, None, context)?;
            if field.is_system_defined || is_reserved_name(&name) {
                continue;
            }
            domains.push(CatalogDomain { name, field });
        }

        debug!("Loaded {} domains", domains.len());
        Ok(domains)
    }

    /// Read user tables with their columns.
    pub fn read_tables(&mut self) -> Result<Vec<CatalogTable>> {
        let rows = self.query(queries::TABLES, "listing tables")?;
        let names = rows
            .iter()
            .map(|row| required_text(row, 0, "listing tables"))
            .collect::<Result<Vec<_>>>()?;

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let columns = self.read_table_columns(&name)?;
            tables.push(CatalogTable { name, columns });
        }
        Ok(tables)
    }

    /// Read the columns of one table in position order.
    pub fn read_table_columns(&mut self, table: &str) -> Result<Vec<CatalogColumn>> {
        let context = format!("reading columns of {}", table);
        let rows = self.query(&queries::table_columns(table), &context)?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let name = required_text(row, 0, &context)?;
            let source = row.text(1);
            let position = row.int(2).unwrap_or(0) as i32;
            let column_not_null = row.int(3).unwrap_or(0) == 1;
            let field = parse_field(row, 4, source, &context)?;
            columns.push(CatalogColumn {
                name,
                position,
                field,
                column_not_null,
            });
        }

        // The query already orders by position; a stable sort keeps that
        // guarantee independent of the driver.
        columns.sort_by_key(|c| c.position);

        debug!("Loaded {} columns for {}", columns.len(), table);
        Ok(columns)
    }

    /// Read standalone stored procedures with their parameters.
    pub fn read_procedures(&mut self) -> Result<Vec<CatalogProcedure>> {
        let context = "listing procedures";
        let rows = self.query(queries::PROCEDURES, context)?;
        let listed = rows
            .iter()
            .map(|row| Ok((required_text(row, 0, context)?, row.raw_text(1).unwrap_or_default())))
            .collect::<Result<Vec<_>>>()?;

        let mut procedures = Vec::with_capacity(listed.len());
        for (name, source) in listed {
            let (inputs, outputs) = self.read_procedure_parameters(&name)?;
            procedures.push(CatalogProcedure {
                name,
                source,
                inputs,
                outputs,
            });
        }
        Ok(procedures)
    }

    /// Read the parameters of one procedure, split by direction.
    pub fn read_procedure_parameters(
        &mut self,
        procedure: &str,
    ) -> Result<(Vec<CatalogParameter>, Vec<CatalogParameter>)> {
        let context = format!("reading parameters of {}", procedure);
        let rows = self.query(&queries::procedure_parameters(procedure), &context)?;

        let mut params = Vec::with_capacity(rows.len());
        for row in &rows {
            let name = required_text(row, 0, &context)?;
            let source = row.text(1);
            let direction = ParameterDirection::from_flag(row.int(2).unwrap_or(0));
            let number = row.int(3).unwrap_or(0) as i32;
            let field = parse_field(row, 4, source, &context)?;
            params.push(CatalogParameter {
                name,
                direction,
                number,
                field,
            });
        }

        Ok(split_parameters(params))
    }

    fn query(&mut self, sql: &str, context: &str) -> Result<Vec<Row>> {
        self.conn
            .query(sql)
            .map_err(|e| MetaError::catalog(context, e))
    }
}

/// Split parameters into inputs and outputs, each in parameter-number order.
pub fn split_parameters(
    params: Vec<CatalogParameter>,
) -> (Vec<CatalogParameter>, Vec<CatalogParameter>) {
    let (mut inputs, mut outputs): (Vec<_>, Vec<_>) = params
        .into_iter()
        .partition(|p| p.direction == ParameterDirection::In);
    inputs.sort_by_key(|p| p.number);
    outputs.sort_by_key(|p| p.number);
    (inputs, outputs)
}

/// Parse the seven-column field descriptor block starting at `offset`.
fn parse_field(
    row: &Row,
    offset: usize,
    field_source: Option<String>,
    context: &str,
) -> Result<CatalogFieldDescriptor> {
    if row.len() < offset + 7 {
        return Err(MetaError::catalog_shape(
            context,
            format!("expected {} columns, got {}", offset + 7, row.len()),
        ));
    }

    let code = row.int(offset).ok_or_else(|| {
        MetaError::catalog_shape(context, format!("RDB$FIELD_TYPE is NULL in column {}", offset))
    })?;
    let field_type = i16::try_from(code)
        .map(FieldType::from_code)
        .unwrap_or(FieldType::Unknown(i16::MAX));

    Ok(CatalogFieldDescriptor {
        field_type,
        character_length: row.int(offset + 1).map(|v| v as i32),
        storage_length: row.int(offset + 2).unwrap_or(0) as i32,
        scale: row.int(offset + 3).unwrap_or(0) as i32,
        precision: row.int(offset + 4).unwrap_or(0) as i32,
        nullable: row.int(offset + 5).unwrap_or(0) != 1,
        is_system_defined: row.int(offset + 6).unwrap_or(0) == 1,
        field_source,
    })
}

fn required_text(row: &Row, idx: usize, context: &str) -> Result<String> {
    row.text(idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| MetaError::catalog_shape(context, format!("missing name in column {}", idx)))
}

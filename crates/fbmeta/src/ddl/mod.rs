//! DDL rendering for resolved schema objects.
//!
//! Every function here is pure and deterministic: identical definitions
//! always render to identical text, so exported scripts diff cleanly under
//! version control.

use crate::core::identifier::quote_ident;
use crate::core::{
    ColumnDefinition, DomainDefinition, ProcedureDefinition, ProcedureParameter, SchemaSnapshot,
    TableDefinition,
};
use crate::scripts::{ScriptArtifact, ScriptCategory};

const INDENT: &str = "    ";

/// `CREATE DOMAIN <name> AS <type>[ NOT NULL];`
pub fn render_domain(domain: &DomainDefinition) -> String {
    format!(
        "CREATE DOMAIN {} AS {}{};",
        quote_ident(&domain.name),
        domain.resolved_type,
        not_null_clause(domain.not_null)
    )
}

/// `CREATE TABLE` with one column per line, in the order given.
pub fn render_table(table: &TableDefinition) -> String {
    let mut sql = format!("CREATE TABLE {} (\n", quote_ident(&table.name));
    for column in &table.columns {
        sql.push_str(INDENT);
        sql.push_str(&render_column(column));
        sql.push_str(",\n");
    }
    let trimmed = sql.trim_end_matches([',', '\r', '\n']);
    format!("{}\n);", trimmed)
}

fn render_column(column: &ColumnDefinition) -> String {
    format!(
        "{} {}{}",
        quote_ident(&column.name),
        column.resolved_type,
        not_null_clause(column.not_null)
    )
}

/// `CREATE OR ALTER PROCEDURE`, with the stored body appended verbatim.
///
/// The input list and the `RETURNS` list are only emitted when non-empty.
pub fn render_procedure(procedure: &ProcedureDefinition) -> String {
    let mut sql = format!("CREATE OR ALTER PROCEDURE {}", quote_ident(&procedure.name));

    if !procedure.inputs.is_empty() {
        sql.push_str(" (\n");
        sql.push_str(&render_parameter_list(&procedure.inputs));
        sql.push_str("\n)");
    }

    if !procedure.outputs.is_empty() {
        sql.push_str("\nRETURNS (\n");
        sql.push_str(&render_parameter_list(&procedure.outputs));
        sql.push_str("\n)");
    }

    sql.push_str("\nAS\n");
    sql.push_str(&procedure.body_source);
    sql.push('\n');
    sql
}

fn render_parameter_list(params: &[ProcedureParameter]) -> String {
    let rendered: Vec<String> = params
        .iter()
        .map(|p| format!("{}{} {}", INDENT, quote_ident(&p.name), p.resolved_type))
        .collect();
    rendered.join(",\n")
}

fn not_null_clause(not_null: bool) -> &'static str {
    if not_null {
        " NOT NULL"
    } else {
        ""
    }
}

/// Render a whole snapshot as script artifacts, domains first, then tables,
/// then procedures.
pub fn render_snapshot(snapshot: &SchemaSnapshot) -> Vec<ScriptArtifact> {
    let domains = snapshot
        .domains
        .iter()
        .map(|d| ScriptArtifact::new(ScriptCategory::Domain, &d.name, render_domain(d)));
    let tables = snapshot
        .tables
        .iter()
        .map(|t| ScriptArtifact::new(ScriptCategory::Table, &t.name, render_table(t)));
    let procedures = snapshot
        .procedures
        .iter()
        .map(|p| ScriptArtifact::new(ScriptCategory::Procedure, &p.name, render_procedure(p)));

    domains.chain(tables).chain(procedures).collect()
}

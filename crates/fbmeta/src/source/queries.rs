//! System catalog queries.
//!
//! Select lists are positional; the row parsers in the parent module depend
//! on the column order below. Every field-descriptor block uses the same seven
//! columns so one parser handles domains, columns and parameters:
//!
//! `FIELD_TYPE, CHARACTER_LENGTH, FIELD_LENGTH, FIELD_SCALE, FIELD_PRECISION,
//! NULL_FLAG, SYSTEM_FLAG`

use crate::core::identifier::quote_literal;

/// User-defined domains.
///
/// 0 name, 1..=7 field descriptor.
pub const DOMAINS: &str = r#"
SELECT
    TRIM(f.RDB$FIELD_NAME),
    f.RDB$FIELD_TYPE,
    f.RDB$CHARACTER_LENGTH,
    f.RDB$FIELD_LENGTH,
    COALESCE(f.RDB$FIELD_SCALE, 0),
    COALESCE(f.RDB$FIELD_PRECISION, 0),
    COALESCE(f.RDB$NULL_FLAG, 0),
    COALESCE(f.RDB$SYSTEM_FLAG, 0)
FROM RDB$FIELDS f
WHERE COALESCE(f.RDB$SYSTEM_FLAG, 0) = 0
  AND f.RDB$FIELD_NAME NOT STARTING WITH 'RDB$'
ORDER BY f.RDB$FIELD_NAME
"#;

/// User tables, excluding views.
pub const TABLES: &str = r#"
SELECT TRIM(r.RDB$RELATION_NAME)
FROM RDB$RELATIONS r
WHERE COALESCE(r.RDB$SYSTEM_FLAG, 0) = 0
  AND r.RDB$VIEW_BLR IS NULL
ORDER BY r.RDB$RELATION_NAME
"#;

/// Standalone stored procedures (packaged ones cannot be recreated on their own).
///
/// 0 name, 1 source.
pub const PROCEDURES: &str = r#"
SELECT TRIM(p.RDB$PROCEDURE_NAME), p.RDB$PROCEDURE_SOURCE
FROM RDB$PROCEDURES p
WHERE COALESCE(p.RDB$SYSTEM_FLAG, 0) = 0
  AND p.RDB$PACKAGE_NAME IS NULL
ORDER BY p.RDB$PROCEDURE_NAME
"#;

/// Columns of one table.
///
/// 0 column name, 1 field source, 2 position, 3 column null flag,
/// 4..=10 field descriptor.
pub fn table_columns(table: &str) -> String {
    format!(
        r#"
SELECT
    TRIM(rf.RDB$FIELD_NAME),
    TRIM(rf.RDB$FIELD_SOURCE),
    rf.RDB$FIELD_POSITION,
    COALESCE(rf.RDB$NULL_FLAG, 0),
    f.RDB$FIELD_TYPE,
    f.RDB$CHARACTER_LENGTH,
    f.RDB$FIELD_LENGTH,
    COALESCE(f.RDB$FIELD_SCALE, 0),
    COALESCE(f.RDB$FIELD_PRECISION, 0),
    COALESCE(f.RDB$NULL_FLAG, 0),
    COALESCE(f.RDB$SYSTEM_FLAG, 0)
FROM RDB$RELATION_FIELDS rf
JOIN RDB$FIELDS f ON rf.RDB$FIELD_SOURCE = f.RDB$FIELD_NAME
WHERE rf.RDB$RELATION_NAME = {}
ORDER BY rf.RDB$FIELD_POSITION
"#,
        quote_literal(table)
    )
}

/// Parameters of one procedure, inputs first.
///
/// 0 parameter name, 1 field source, 2 direction, 3 number,
/// 4..=10 field descriptor.
pub fn procedure_parameters(procedure: &str) -> String {
    format!(
        r#"
SELECT
    TRIM(pp.RDB$PARAMETER_NAME),
    TRIM(pp.RDB$FIELD_SOURCE),
    pp.RDB$PARAMETER_TYPE,
    pp.RDB$PARAMETER_NUMBER,
    f.RDB$FIELD_TYPE,
    f.RDB$CHARACTER_LENGTH,
    f.RDB$FIELD_LENGTH,
    COALESCE(f.RDB$FIELD_SCALE, 0),
    COALESCE(f.RDB$FIELD_PRECISION, 0),
    COALESCE(f.RDB$NULL_FLAG, 0),
    COALESCE(f.RDB$SYSTEM_FLAG, 0)
FROM RDB$PROCEDURE_PARAMETERS pp
JOIN RDB$FIELDS f ON pp.RDB$FIELD_SOURCE = f.RDB$FIELD_NAME
WHERE pp.RDB$PROCEDURE_NAME = {}
  AND pp.RDB$PACKAGE_NAME IS NULL
ORDER BY pp.RDB$PARAMETER_TYPE, pp.RDB$PARAMETER_NUMBER
"#,
        quote_literal(procedure)
    )
}

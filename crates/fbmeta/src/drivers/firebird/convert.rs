//! Conversions between rsfbclient types and the crate's row and error model.

use rsfbclient::{FbError, SqlType};

use crate::core::{Row, SqlValue};
use crate::error::EngineError;

/// Convert one driver value.
///
/// Text blobs (procedure sources) may arrive as raw bytes depending on the
/// connection charset, so binary values are decoded as UTF-8.
pub fn to_value(value: &SqlType) -> SqlValue {
    match value {
        SqlType::Null => SqlValue::Null,
        SqlType::Integer(i) => SqlValue::Int(*i),
        SqlType::Floating(f) => SqlValue::Float(*f),
        SqlType::Boolean(b) => SqlValue::Int(i64::from(*b)),
        SqlType::Text(s) => SqlValue::Text(s.clone()),
        SqlType::Binary(bytes) => SqlValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        #[allow(unreachable_patterns)]
        other => SqlValue::Text(format!("{:?}", other)),
    }
}

/// Convert a driver row.
pub fn to_row(row: &rsfbclient::Row) -> Row {
    Row::new(row.cols.iter().map(|c| to_value(&c.value)).collect())
}

/// Convert a driver error, keeping the SQLCODE when the server sent one.
pub fn to_engine_error(err: FbError) -> EngineError {
    match err {
        FbError::Sql { msg, code } => EngineError::with_code(code, msg),
        other => EngineError::message(other.to_string()),
    }
}

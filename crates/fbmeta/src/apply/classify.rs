//! Classification of engine errors raised while applying a script.

use crate::error::EngineError;

/// SQLCODE for "unsuccessful metadata update" (object already exists, among others).
pub const SQLCODE_METADATA_UPDATE: i32 = -607;
/// SQLCODE for a PRIMARY or UNIQUE KEY violation, raised when a catalog row is duplicated.
pub const SQLCODE_DUPLICATE_KEY: i32 = -803;

/// How an engine error affects the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The object is already present; the script is skipped.
    AlreadyExists,
    /// A genuine failure; the script is recorded as failed.
    Failure,
}

/// Classify an engine error.
///
/// A structured SQLCODE of `-607` or `-803` wins. Otherwise the message is
/// matched case-insensitively against `patterns`.
pub fn classify(err: &EngineError, patterns: &[String]) -> ErrorClass {
    if matches!(
        err.code,
        Some(SQLCODE_METADATA_UPDATE) | Some(SQLCODE_DUPLICATE_KEY)
    ) {
        return ErrorClass::AlreadyExists;
    }

    let message = err.message.to_lowercase();
    let matched = patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .any(|p| message.contains(&p.to_lowercase()));

    if matched {
        ErrorClass::AlreadyExists
    } else {
        ErrorClass::Failure
    }
}

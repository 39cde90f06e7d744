//! Error types for schema export and script application.

use std::fmt;

use thiserror::Error;

/// Exit code for usage and configuration errors.
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code when the database cannot be reached or created.
pub const EXIT_CONNECTION_ERROR: u8 = 3;
/// Exit code when the system catalog cannot be read.
pub const EXIT_CATALOG_ERROR: u8 = 4;
/// Exit code when at least one script failed and the caller asked to fail on it.
pub const EXIT_SCRIPTS_FAILED: u8 = 5;
/// Exit code for filesystem errors.
pub const EXIT_IO_ERROR: u8 = 7;
/// Exit code for serialization errors.
pub const EXIT_SERIALIZATION_ERROR: u8 = 8;

/// An error reported by the database engine.
///
/// `code` is the engine's SQLCODE when the driver exposes one (for example
/// `-607` for "unsuccessful metadata update"). Drivers that only have a
/// message leave it as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    pub code: Option<i32>,
    pub message: String,
}

impl EngineError {
    /// Create an engine error with a SQLCODE.
    pub fn with_code(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    /// Create an engine error that carries only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (SQLCODE {})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for EngineError {}

/// Main error type for fbmeta operations.
#[derive(Error, Debug)]
pub enum MetaError {
    /// Configuration error (invalid YAML, bad connection string, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Could not open or create a database.
    #[error("Connection error while {context}")]
    Connection {
        context: String,
        #[source]
        source: EngineError,
    },

    /// A system catalog query was rejected.
    #[error("Catalog read failed while {context}")]
    CatalogRead {
        context: String,
        #[source]
        source: EngineError,
    },

    /// A catalog row did not have the expected shape.
    #[error("Unexpected catalog row while {context}: {message}")]
    CatalogShape { context: String, message: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MetaError {
    /// Create a Connection error with context about where it occurred
    pub fn connection(context: impl Into<String>, source: EngineError) -> Self {
        MetaError::Connection {
            context: context.into(),
            source,
        }
    }

    /// Create a CatalogRead error
    pub fn catalog(context: impl Into<String>, source: EngineError) -> Self {
        MetaError::CatalogRead {
            context: context.into(),
            source,
        }
    }

    /// Create a CatalogShape error
    pub fn catalog_shape(context: impl Into<String>, message: impl Into<String>) -> Self {
        MetaError::CatalogShape {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            MetaError::Config(_) | MetaError::Yaml(_) => EXIT_CONFIG_ERROR,
            MetaError::Connection { .. } => EXIT_CONNECTION_ERROR,
            MetaError::CatalogRead { .. } | MetaError::CatalogShape { .. } => EXIT_CATALOG_ERROR,
            MetaError::Io(_) => EXIT_IO_ERROR,
            MetaError::Json(_) => EXIT_SERIALIZATION_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for fbmeta operations.
pub type Result<T> = std::result::Result<T, MetaError>;

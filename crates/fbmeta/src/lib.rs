//! # fbmeta
//!
//! Firebird schema export and script application.
//!
//! This library keeps a Firebird database schema in version control as plain
//! SQL scripts, one file per object:
//!
//! - **Export** domains, tables and stored procedures from the system catalog
//! - **Build** a fresh database from a scripts tree
//! - **Update** an existing database, skipping objects that already exist
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use fbmeta::{Config, FirebirdFactory, Orchestrator};
//!
//! fn main() -> fbmeta::Result<()> {
//!     let orchestrator = Orchestrator::new(Config::default(), FirebirdFactory::new());
//!     let summary = orchestrator.export_scripts(
//!         "Database=/data/app.fdb;User=SYSDBA;Password=masterkey",
//!         Path::new("scripts"),
//!     )?;
//!     println!("Exported {} objects", summary.total());
//!     Ok(())
//! }
//! ```

pub mod apply;
pub mod config;
pub mod core;
pub mod ddl;
pub mod drivers;
pub mod error;
pub mod orchestrator;
pub mod scripts;
pub mod source;
pub mod typemap;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenient access
pub use apply::{ExecutionOutcome, ExecutionReport, ScriptApplier, ScriptResult};
pub use config::{Config, ConnectionParams};
pub use crate::core::{Connection, ConnectionFactory, Row, SchemaSnapshot, SqlValue};
pub use error::{EngineError, MetaError, Result};
pub use orchestrator::{apply_with, export_with, ExportSummary, Orchestrator};
pub use scripts::{ScriptArtifact, ScriptCategory, ScriptRepository};
pub use typemap::ResolveOptions;

#[cfg(feature = "firebird")]
pub use drivers::{FirebirdConnection, FirebirdFactory};

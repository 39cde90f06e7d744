//! Connection abstractions.
//!
//! The core never talks to a driver directly. Everything it needs from a
//! database is captured by two traits:
//!
//! - [`Connection`]: run a statement, or run a query and collect its rows
//! - [`ConnectionFactory`]: open a connection, or create a fresh database
//!
//! The Firebird implementation lives in `drivers::firebird`. Tests use an
//! in-memory fake.

use crate::config::ConnectionParams;
use crate::error::{EngineError, Result};

use super::value::Row;

/// An open database connection.
///
/// Each call runs in its own transaction that is committed on success and
/// rolled back on failure. The connection is closed when dropped.
pub trait Connection {
    /// Execute a statement that returns no rows (DDL).
    fn execute(&mut self, sql: &str) -> std::result::Result<(), EngineError>;

    /// Execute a query and collect all rows.
    fn query(&mut self, sql: &str) -> std::result::Result<Vec<Row>, EngineError>;
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn execute(&mut self, sql: &str) -> std::result::Result<(), EngineError> {
        (**self).execute(sql)
    }

    fn query(&mut self, sql: &str) -> std::result::Result<Vec<Row>, EngineError> {
        (**self).query(sql)
    }
}

/// Opens connections and creates databases.
pub trait ConnectionFactory {
    /// Open a connection to an existing database.
    fn connect(&self, params: &ConnectionParams) -> Result<Box<dyn Connection>>;

    /// Create a new, empty database and open a connection to it.
    fn create_database(&self, params: &ConnectionParams) -> Result<Box<dyn Connection>>;
}

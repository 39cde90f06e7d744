//! Firebird driver.
//!
//! This module provides the Firebird implementations of the connection
//! traits, on top of rsfbclient's pure-Rust wire protocol client:
//!
//! - [`FirebirdConnection`]: one attached database
//! - [`FirebirdFactory`]: attaches to or creates databases

mod convert;

pub use convert::{to_engine_error, to_row, to_value};

use rsfbclient::charset::{self, Charset};
use rsfbclient::prelude::*;
use rsfbclient_core::FirebirdClient;
use tracing::{debug, warn};

use crate::config::ConnectionParams;
use crate::core::{Connection, ConnectionFactory, Row};
use crate::error::{EngineError, MetaError, Result};

/// An attached Firebird database.
///
/// Every statement and query runs in its own transaction, committed on
/// success and rolled back on error. Dropping the connection detaches.
pub struct FirebirdConnection<C: FirebirdClient> {
    inner: rsfbclient::Connection<C>,
}

impl<C: FirebirdClient> FirebirdConnection<C> {
    pub fn new(inner: rsfbclient::Connection<C>) -> Self {
        Self { inner }
    }
}

impl<C: FirebirdClient> Connection for FirebirdConnection<C> {
    fn execute(&mut self, sql: &str) -> std::result::Result<(), EngineError> {
        self.inner
            .with_transaction(|tr| tr.execute(sql, ()).map(|_| ()))
            .map_err(to_engine_error)
    }

    fn query(&mut self, sql: &str) -> std::result::Result<Vec<Row>, EngineError> {
        let rows: Vec<rsfbclient::Row> = self
            .inner
            .with_transaction(|tr| tr.query(sql, ()))
            .map_err(to_engine_error)?;
        Ok(rows.iter().map(to_row).collect())
    }
}

/// Opens Firebird connections over the network protocol.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirebirdFactory;

impl FirebirdFactory {
    pub fn new() -> Self {
        Self
    }
}

/// A pure-Rust connection builder configured from `ConnectionParams`.
macro_rules! builder_for {
    ($params:expr) => {{
        let params: &ConnectionParams = $params;
        warn_unsupported(params);
        let mut builder = rsfbclient::builder_pure_rust();
        builder
            .host(params.host.as_str())
            .port(params.port)
            .db_name(params.database.as_str())
            .user(params.user.as_str())
            .pass(params.password.as_str())
            .charset(charset_for(&params.charset).unwrap_or(charset::UTF_8));
        builder
    }};
}

/// The client charset for a Firebird character set name, if supported.
fn charset_for(name: &str) -> Option<Charset> {
    match name.trim().to_ascii_uppercase().as_str() {
        "UTF8" | "UTF-8" => Some(charset::UTF_8),
        "ISO8859_1" | "ISO-8859-1" | "LATIN1" => Some(charset::ISO_8859_1),
        "ISO8859_2" | "ISO-8859-2" | "LATIN2" => Some(charset::ISO_8859_2),
        "WIN1250" => Some(charset::WIN_1250),
        "WIN1251" => Some(charset::WIN_1251),
        "WIN1252" => Some(charset::WIN_1252),
        _ => None,
    }
}

fn warn_unsupported(params: &ConnectionParams) {
    if charset_for(&params.charset).is_none() {
        warn!("Charset {} is not supported by the client, attaching with UTF8", params.charset);
    }
    if let Some(role) = &params.role {
        warn!("Role {} requested; the driver does not support roles, ignoring", role);
    }
}

impl ConnectionFactory for FirebirdFactory {
    fn connect(&self, params: &ConnectionParams) -> Result<Box<dyn Connection>> {
        debug!("Attaching to {}", params.location());
        let conn = builder_for!(params).connect().map_err(|e| {
            MetaError::connection(
                format!("connecting to {}", params.location()),
                to_engine_error(e),
            )
        })?;
        Ok(Box::new(FirebirdConnection::new(conn)))
    }

    fn create_database(&self, params: &ConnectionParams) -> Result<Box<dyn Connection>> {
        debug!("Creating database {}", params.location());
        let conn = builder_for!(params).create_database().map_err(|e| {
            MetaError::connection(
                format!("creating {}", params.location()),
                to_engine_error(e),
            )
        })?;
        Ok(Box::new(FirebirdConnection::new(conn)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_names() {
        let name = |s: &str| charset_for(s).map(|c| c.on_firebird);
        assert_eq!(name("UTF8"), Some("UTF8"));
        assert_eq!(name("utf-8"), Some("UTF8"));
        assert_eq!(name("WIN1252"), Some("WIN1252"));
        assert_eq!(name("iso8859_1"), Some("ISO8859_1"));
        assert_eq!(name("KOI8R"), None);
    }
}

//! Connection parameters and connection-string parsing.
//!
//! Connection strings use the ADO.NET-provider shape that Firebird tooling
//! commonly passes around:
//!
//! ```text
//! User=SYSDBA;Password=masterkey;Database=/data/app.fdb;DataSource=localhost;Port=3050;Dialect=3;Charset=UTF8
//! ```

use std::path::Path;

use super::types::{default_port, ServerConfig};
use crate::error::{MetaError, Result};

/// Everything needed to open (or create) one database.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    /// Database path or alias as seen by the server.
    pub database: String,
    pub user: String,
    pub password: String,
    pub charset: String,
    pub role: Option<String>,
}

impl ConnectionParams {
    /// Parameters for a database on the configured server.
    pub fn for_server(server: &ServerConfig, database: impl Into<String>) -> Self {
        Self {
            host: server.host.clone(),
            port: server.port,
            database: database.into(),
            user: server.user.clone(),
            password: server.password.clone(),
            charset: server.charset.clone(),
            role: None,
        }
    }

    /// Parameters for a database file on the configured server.
    pub fn for_file(server: &ServerConfig, path: &Path) -> Self {
        Self::for_server(server, path.to_string_lossy().into_owned())
    }

    /// Parse a `Key=Value;` connection string.
    ///
    /// Keys are case-insensitive and ignore inner spaces (`Data Source` and
    /// `DataSource` are the same key). Unknown keys are rejected so typos do
    /// not silently fall back to defaults.
    pub fn parse(conn_str: &str) -> Result<Self> {
        let mut params = Self {
            host: "localhost".to_string(),
            port: default_port(),
            database: String::new(),
            user: "SYSDBA".to_string(),
            password: String::new(),
            charset: "UTF8".to_string(),
            role: None,
        };

        for part in conn_str.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (key, value) = part.split_once('=').ok_or_else(|| {
                MetaError::Config(format!(
                    "connection string entry '{}' is not of the form Key=Value",
                    part
                ))
            })?;
            let key: String = key
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_ascii_lowercase();
            let value = value.trim().to_string();

            match key.as_str() {
                "user" | "userid" | "username" => params.user = value,
                "password" => params.password = value,
                "database" | "initialcatalog" => params.database = value,
                "datasource" | "server" | "host" => params.host = value,
                "port" => {
                    params.port = value.parse().map_err(|_| {
                        MetaError::Config(format!("invalid port in connection string: '{}'", value))
                    })?
                }
                "charset" | "characterset" => params.charset = value,
                "role" | "rolename" => params.role = Some(value),
                "dialect" => {
                    if value != "3" {
                        return Err(MetaError::Config(format!(
                            "only SQL dialect 3 is supported, got '{}'",
                            value
                        )));
                    }
                }
                "servertype" | "pooling" | "connectiontimeout" => {
                    // Provider-specific switches with no meaning for this tool.
                }
                other => {
                    return Err(MetaError::Config(format!(
                        "unknown connection string key '{}'",
                        other
                    )))
                }
            }
        }

        if params.database.is_empty() {
            return Err(MetaError::Config(
                "connection string must specify Database".into(),
            ));
        }
        if params.host.is_empty() {
            return Err(MetaError::Config(
                "connection string must not have an empty DataSource".into(),
            ));
        }

        Ok(params)
    }

    /// Human-readable location, without credentials.
    pub fn location(&self) -> String {
        format!("{}/{}:{}", self.host, self.port, self.database)
    }
}

impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("charset", &self.charset)
            .field("role", &self.role)
            .finish()
    }
}

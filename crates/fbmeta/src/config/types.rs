//! Configuration type definitions.

use serde::{Deserialize, Serialize};

/// Root configuration structure. Every section is optional in the YAML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Server used by `build-db` to create the new database.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database creation behavior.
    #[serde(default)]
    pub build: BuildConfig,

    /// Export behavior.
    #[serde(default)]
    pub export: ExportConfig,

    /// Script application behavior.
    #[serde(default)]
    pub apply: ApplyConfig,
}

/// Firebird server connection settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host (default: localhost).
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port (default: 3050).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Username (default: SYSDBA).
    #[serde(default = "default_user")]
    pub user: String,

    /// Password (default: masterkey).
    #[serde(default = "default_password")]
    pub password: String,

    /// Connection character set (default: UTF8).
    #[serde(default = "default_charset")]
    pub charset: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: default_password(),
            charset: default_charset(),
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("charset", &self.charset)
            .finish()
    }
}

/// Settings for `build-db`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// File name of the database created inside `--db-dir`.
    #[serde(default = "default_database_file")]
    pub database_file: String,

    /// Delete an existing database file before creating (default: true).
    /// When false, an existing file is an error.
    #[serde(default = "default_true")]
    pub overwrite: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            database_file: default_database_file(),
            overwrite: true,
        }
    }
}

/// Settings for `export-scripts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Emit column-level NOT NULL from `RDB$RELATION_FIELDS.RDB$NULL_FLAG`
    /// (default: false, nullability rides on domains only).
    #[serde(default)]
    pub column_not_null: bool,
}

/// Settings for script application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyConfig {
    /// Case-insensitive message fragments that mark an engine error as
    /// "object already exists".
    #[serde(default = "default_idempotent_patterns")]
    pub idempotent_patterns: Vec<String>,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            idempotent_patterns: default_idempotent_patterns(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

pub(crate) fn default_port() -> u16 {
    3050
}

fn default_user() -> String {
    "SYSDBA".to_string()
}

fn default_password() -> String {
    "masterkey".to_string()
}

fn default_charset() -> String {
    "UTF8".to_string()
}

fn default_database_file() -> String {
    "NewDbFromScripts.fdb".to_string()
}

fn default_true() -> bool {
    true
}

pub fn default_idempotent_patterns() -> Vec<String> {
    vec![
        "violation of PRIMARY or UNIQUE KEY constraint".to_string(),
        "unsuccessful metadata update".to_string(),
        "already exists".to_string(),
    ]
}

//! In-memory test doubles for the connection boundary.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::config::ConnectionParams;
use crate::core::{Connection, ConnectionFactory, Row};
use crate::error::{EngineError, MetaError, Result};

#[derive(Default)]
struct FakeState {
    rows: Vec<(String, std::result::Result<Vec<Row>, EngineError>)>,
    execute_errors: Vec<(String, EngineError)>,
    objects: BTreeSet<String>,
    executed: Vec<String>,
    created: Vec<String>,
    connected: Vec<String>,
}

/// Fake connection with canned query results and DDL bookkeeping.
///
/// Queries are answered by the first registered pattern contained in the SQL
/// text; unmatched queries return no rows. `CREATE DOMAIN/TABLE/PROCEDURE`
/// statements register the object and fail with the engine's "already
/// exists" error on a second attempt. `CREATE OR ALTER` always succeeds.
/// Clones share state, so a test can keep a handle while the code under test
/// owns a boxed copy.
#[derive(Clone, Default)]
pub struct FakeConnection {
    state: Rc<RefCell<FakeState>>,
}

impl FakeConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, pattern: &str, rows: Vec<Row>) -> Self {
        self.state
            .borrow_mut()
            .rows
            .push((pattern.to_string(), Ok(rows)));
        self
    }

    pub fn with_query_error(self, pattern: &str, err: EngineError) -> Self {
        self.state
            .borrow_mut()
            .rows
            .push((pattern.to_string(), Err(err)));
        self
    }

    pub fn with_execute_error(self, pattern: &str, err: EngineError) -> Self {
        self.state
            .borrow_mut()
            .execute_errors
            .push((pattern.to_string(), err));
        self
    }

    /// Statements passed to `execute`, in order.
    pub fn executed(&self) -> Vec<String> {
        self.state.borrow().executed.clone()
    }

    /// Databases created through [`FakeFactory`].
    pub fn created_databases(&self) -> Vec<String> {
        self.state.borrow().created.clone()
    }

    /// Databases opened through [`FakeFactory`].
    pub fn connected_databases(&self) -> Vec<String> {
        self.state.borrow().connected.clone()
    }
}

/// Object key for a plain `CREATE DOMAIN|TABLE|PROCEDURE <name>` statement.
fn created_object(sql: &str) -> Option<String> {
    let words: Vec<&str> = sql.split_whitespace().take(3).collect();
    if words.len() < 3 || !words[0].eq_ignore_ascii_case("CREATE") {
        return None;
    }
    let kind = words[1].to_ascii_uppercase();
    if !matches!(kind.as_str(), "DOMAIN" | "TABLE" | "PROCEDURE") {
        return None;
    }
    let name = words[2]
        .split(|c: char| c == '(' || c == ';')
        .next()
        .unwrap_or_default();
    Some(format!("{} {}", kind, name))
}

impl Connection for FakeConnection {
    fn execute(&mut self, sql: &str) -> std::result::Result<(), EngineError> {
        let mut state = self.state.borrow_mut();
        state.executed.push(sql.to_string());

        if let Some((_, err)) = state
            .execute_errors
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
        {
            return Err(err.clone());
        }

        if let Some(key) = created_object(sql) {
            if !state.objects.insert(key.clone()) {
                return Err(EngineError::with_code(
                    -607,
                    format!(
                        "unsuccessful metadata update\n{} failed\n{} already exists",
                        key, key
                    ),
                ));
            }
        }
        Ok(())
    }

    fn query(&mut self, sql: &str) -> std::result::Result<Vec<Row>, EngineError> {
        let state = self.state.borrow();
        match state
            .rows
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
        {
            Some((_, result)) => result.clone(),
            None => Ok(Vec::new()),
        }
    }
}

/// Factory handing out clones of one [`FakeConnection`].
pub struct FakeFactory {
    pub conn: FakeConnection,
    pub refuse: bool,
}

impl FakeFactory {
    pub fn new(conn: FakeConnection) -> Self {
        Self {
            conn,
            refuse: false,
        }
    }
}

impl ConnectionFactory for FakeFactory {
    fn connect(&self, params: &ConnectionParams) -> Result<Box<dyn Connection>> {
        if self.refuse {
            return Err(MetaError::connection(
                format!("connecting to {}", params.location()),
                EngineError::with_code(-902, "Unable to complete network request"),
            ));
        }
        self.conn
            .state
            .borrow_mut()
            .connected
            .push(params.database.clone());
        Ok(Box::new(self.conn.clone()))
    }

    fn create_database(&self, params: &ConnectionParams) -> Result<Box<dyn Connection>> {
        if self.refuse {
            return Err(MetaError::connection(
                format!("creating {}", params.location()),
                EngineError::with_code(-902, "Unable to complete network request"),
            ));
        }
        self.conn
            .state
            .borrow_mut()
            .created
            .push(params.database.clone());
        Ok(Box::new(self.conn.clone()))
    }
}

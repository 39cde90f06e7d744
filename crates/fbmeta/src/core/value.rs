//! Row and value types returned by catalog queries.
//!
//! Catalog queries only ever return names, small integers and text blobs, so
//! the value model is deliberately narrow. Drivers convert their native row
//! representation into [`Row`].

/// A single column value from a query result.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    /// Returns true if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v as i64)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// One result row. Columns are addressed by position, matching the select list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<SqlValue>,
}

impl Row {
    pub fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&SqlValue> {
        self.values.get(idx)
    }

    /// Read a text column. CHAR catalog columns come back blank-padded, so the
    /// value is right-trimmed. Returns `None` for NULL.
    pub fn text(&self, idx: usize) -> Option<String> {
        match self.values.get(idx)? {
            SqlValue::Text(s) => Some(s.trim_end().to_string()),
            SqlValue::Int(v) => Some(v.to_string()),
            SqlValue::Float(v) => Some(v.to_string()),
            SqlValue::Null => None,
        }
    }

    /// Read a text column without trimming (procedure bodies).
    pub fn raw_text(&self, idx: usize) -> Option<String> {
        match self.values.get(idx)? {
            SqlValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Read an integer column. Returns `None` for NULL or non-numeric values.
    pub fn int(&self, idx: usize) -> Option<i64> {
        match self.values.get(idx)? {
            SqlValue::Int(v) => Some(*v),
            SqlValue::Float(v) => Some(*v as i64),
            SqlValue::Text(s) => s.trim().parse().ok(),
            SqlValue::Null => None,
        }
    }
}

impl From<Vec<SqlValue>> for Row {
    fn from(values: Vec<SqlValue>) -> Self {
        Self::new(values)
    }
}

/// Build a [`Row`] from heterogeneous values.
///
/// ```rust
/// use fbmeta::row;
/// let r = row!["ID_TYPE", 8, Option::<i64>::None];
/// assert_eq!(r.len(), 3);
/// ```
#[macro_export]
macro_rules! row {
    ($($v:expr),* $(,)?) => {
        $crate::core::Row::new(vec![$($crate::core::SqlValue::from($v)),*])
    };
}

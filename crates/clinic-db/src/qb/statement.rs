//! The output of the statement builders.

use crate::value::Value;
use tokio_postgres::types::ToSql;

/// Parameterized SQL text plus its positional arguments.
///
/// `params[i]` binds to placeholder `$<i + 1>`. Values never appear in `sql`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// A statement without parameters.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    /// Get parameters as references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
    }
}

/// Placeholder numbers (`$n`) found in a SQL string, in order of appearance.
///
/// Used by tests to check that numbering is contiguous and unique.
pub fn placeholders(sql: &str) -> Vec<usize> {
    let bytes = sql.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end > start {
                if let Ok(n) = sql[start..end].parse() {
                    out.push(n);
                }
            }
            i = end.max(start);
        } else {
            i += 1;
        }
    }
    out
}

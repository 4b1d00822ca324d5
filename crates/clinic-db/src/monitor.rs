//! SQL statement logging through `tracing`.
//!
//! [`LoggedClient`] wraps any [`GenericClient`] and emits one event per
//! statement on the `clinic_db.sql` target before it runs, plus a warning
//! when a statement takes longer than the configured threshold.
//!
//! ```ignore
//! let client = LoggedClient::new(pool.get().await?, SqlLogConfig::default());
//! client.query_tagged("patients.list", "SELECT * FROM patients", &[]).await?;
//! ```
//!
//! Enable with `RUST_LOG=clinic_db.sql=debug`.

use crate::client::GenericClient;
use crate::error::OrmResult;
use std::time::{Duration, Instant};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Truncate a string to at most `max_bytes` without splitting a UTF-8 character.
fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// The type of SQL operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

impl QueryType {
    /// Detect query type from the leading keyword.
    pub fn from_sql(sql: &str) -> Self {
        fn starts_with_keyword(s: &str, keyword: &str) -> bool {
            match s.get(0..keyword.len()) {
                Some(prefix) => prefix.eq_ignore_ascii_case(keyword),
                None => false,
            }
        }

        let trimmed = sql.trim_start().trim_start_matches('(');
        if starts_with_keyword(trimmed, "SELECT") || starts_with_keyword(trimmed, "WITH") {
            QueryType::Select
        } else if starts_with_keyword(trimmed, "INSERT") {
            QueryType::Insert
        } else if starts_with_keyword(trimmed, "UPDATE") {
            QueryType::Update
        } else if starts_with_keyword(trimmed, "DELETE") {
            QueryType::Delete
        } else {
            QueryType::Other
        }
    }
}

/// Settings for [`LoggedClient`].
#[derive(Debug, Clone)]
pub struct SqlLogConfig {
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Statements slower than this are logged at WARN.
    pub slow_threshold: Option<Duration>,
}

impl Default for SqlLogConfig {
    fn default() -> Self {
        Self {
            max_sql_length: Some(200),
            slow_threshold: Some(Duration::from_millis(500)),
        }
    }
}

impl SqlLogConfig {
    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

/// A client wrapper that logs every statement it runs.
#[derive(Debug)]
pub struct LoggedClient<C> {
    inner: C,
    config: SqlLogConfig,
}

impl<C: GenericClient> LoggedClient<C> {
    pub fn new(inner: C, config: SqlLogConfig) -> Self {
        Self { inner, config }
    }

    fn before(&self, tag: &str, sql: &str, param_count: usize) -> Instant {
        tracing::debug!(
            target: "clinic_db.sql",
            query_type = ?QueryType::from_sql(sql),
            tag,
            param_count,
            sql = %self.config.truncate_sql(sql),
        );
        Instant::now()
    }

    fn after(&self, tag: &str, started: Instant, ok: bool) {
        let elapsed = started.elapsed();
        if !ok {
            tracing::debug!(target: "clinic_db.sql", tag, ?elapsed, "statement failed");
            return;
        }
        match self.config.slow_threshold {
            Some(threshold) if elapsed > threshold => {
                tracing::warn!(target: "clinic_db.sql", tag, ?elapsed, "slow statement");
            }
            _ => tracing::trace!(target: "clinic_db.sql", tag, ?elapsed, "statement done"),
        }
    }
}

impl<C: GenericClient> GenericClient for LoggedClient<C> {
    async fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> OrmResult<Vec<Row>> {
        let started = self.before(tag, sql, params.len());
        let result = self.inner.query_tagged(tag, sql, params).await;
        self.after(tag, started, result.is_ok());
        result
    }

    async fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> OrmResult<u64> {
        let started = self.before(tag, sql, params.len());
        let result = self.inner.execute_tagged(tag, sql, params).await;
        self.after(tag, started, result.is_ok());
        result
    }
}

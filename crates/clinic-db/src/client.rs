//! The connection seam between stores and the driver.

use crate::error::{OrmError, OrmResult};
use crate::qb::Statement;
use crate::row::FromRow;
use std::future::Future;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Something that can run SQL: a driver client, a pooled client, or a wrapper
/// such as [`LoggedClient`](crate::LoggedClient).
///
/// `tag` names the store operation for logs. Plain clients ignore it.
pub trait GenericClient: Send + Sync {
    fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = OrmResult<Vec<Row>>> + Send;

    /// Run a statement and return the number of affected rows.
    fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = OrmResult<u64>> + Send;
}

/// Run built [`Statement`]s and decode their rows.
pub trait StatementExt: GenericClient {
    fn fetch_all<T: FromRow + Send>(
        &self,
        tag: &str,
        stmt: &Statement,
    ) -> impl Future<Output = OrmResult<Vec<T>>> + Send {
        async move {
            let params = stmt.params_ref();
            let rows = self.query_tagged(tag, &stmt.sql, &params).await?;
            rows.iter().map(T::from_row).collect()
        }
    }

    /// First row, if any. Used for `... WHERE id = $n RETURNING *`.
    fn fetch_opt<T: FromRow + Send>(
        &self,
        tag: &str,
        stmt: &Statement,
    ) -> impl Future<Output = OrmResult<Option<T>>> + Send {
        async move {
            let params = stmt.params_ref();
            let rows = self.query_tagged(tag, &stmt.sql, &params).await?;
            rows.first().map(T::from_row).transpose()
        }
    }

    /// Exactly the first row; an empty result is [`OrmError::NotFound`].
    fn fetch_one<T: FromRow + Send>(
        &self,
        tag: &str,
        stmt: &Statement,
    ) -> impl Future<Output = OrmResult<T>> + Send {
        async move {
            self.fetch_opt(tag, stmt)
                .await?
                .ok_or_else(|| OrmError::not_found(format!("{tag}: statement returned no rows")))
        }
    }
}

impl<C: GenericClient + ?Sized> StatementExt for C {}

impl GenericClient for tokio_postgres::Client {
    async fn query_tagged(
        &self,
        _tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> OrmResult<Vec<Row>> {
        self.query(sql, params).await.map_err(OrmError::from_db_error)
    }

    async fn execute_tagged(
        &self,
        _tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> OrmResult<u64> {
        self.execute(sql, params).await.map_err(OrmError::from_db_error)
    }
}

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Client {
    async fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> OrmResult<Vec<Row>> {
        // ClientWrapper derefs to tokio_postgres::Client.
        let client: &tokio_postgres::Client = self;
        client.query_tagged(tag, sql, params).await
    }

    async fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> OrmResult<u64> {
        let client: &tokio_postgres::Client = self;
        client.execute_tagged(tag, sql, params).await
    }
}

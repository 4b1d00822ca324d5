//! SQL migrations via [`refinery`].
//!
//! The clinic schema lives in `migrations/` and is embedded into the binary.
//!
//! ```ignore
//! let pool = clinic_db::create_pool(&database_url)?;
//! let report = clinic_db::migrate::run_pool(&pool).await?;
//! ```

use crate::error::OrmResult;
use deadpool_postgres::Pool;

pub use refinery::Report;

mod embedded {
    refinery::embed_migrations!("./migrations");
}

/// Build a runner over the embedded clinic migrations.
pub fn runner() -> refinery::Runner {
    embedded::migrations::runner()
}

/// Run all pending migrations on a single client.
pub async fn run(client: &mut tokio_postgres::Client) -> OrmResult<Report> {
    let report = runner().run_async(client).await?;
    for migration in report.applied_migrations() {
        tracing::info!(
            target: "clinic_db.migrate",
            version = migration.version(),
            name = migration.name(),
            "applied migration"
        );
    }
    Ok(report)
}

/// Pool variant of [`run`].
pub async fn run_pool(pool: &Pool) -> OrmResult<Report> {
    let mut client = pool.get().await?;
    run(&mut client).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_migrations_are_ordered() {
        let migrations = runner().get_migrations().clone();
        assert!(!migrations.is_empty());
        let versions: Vec<_> = migrations.iter().map(|m| m.version()).collect();
        let mut sorted = versions.clone();
        sorted.sort_unstable();
        assert_eq!(versions, sorted);
        assert_eq!(migrations[0].name(), "clinic_schema");
    }
}

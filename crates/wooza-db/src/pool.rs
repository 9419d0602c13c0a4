use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use tracing::info;

use crate::config::DbConfig;

/// Migrations embedded at compile time from `crates/wooza-db/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Create a connection pool for the configured database.
pub async fn create_pool(config: &DbConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(&config.database_url)
        .await
        .with_context(|| format!("failed to connect to database at {}", config.database_url))
}

/// Apply pending embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to run database migrations")?;
    info!(count = MIGRATOR.iter().count(), "migrations up to date");
    Ok(())
}

/// `CREATE DATABASE` takes no bind parameters, so names are restricted to
/// plain identifiers before being spliced into the statement.
fn checked_name(db_name: &str) -> Result<&str> {
    let plain = !db_name.is_empty()
        && db_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !plain {
        anyhow::bail!("database name {db_name:?} contains invalid characters");
    }
    Ok(db_name)
}

async fn maintenance_pool(config: &DbConfig) -> Result<PgPool> {
    let maint = DbConfig {
        database_url: config.maintenance_url(),
        max_connections: 1,
    };
    create_pool(&maint)
        .await
        .context("failed to reach the maintenance database")
}

/// Create database `db_name` on the server `config` points at.
pub async fn create_database(config: &DbConfig, db_name: &str) -> Result<()> {
    let db_name = checked_name(db_name)?;
    let maint = maintenance_pool(config).await?;
    let result = maint
        .execute(format!("CREATE DATABASE {db_name}").as_str())
        .await
        .with_context(|| format!("failed to create database {db_name}"));
    maint.close().await;
    result?;
    info!(db = db_name, "database created");
    Ok(())
}

/// Drop database `db_name`, disconnecting any remaining sessions.
pub async fn drop_database(config: &DbConfig, db_name: &str) -> Result<()> {
    let db_name = checked_name(db_name)?;
    let maint = maintenance_pool(config).await?;
    let result = maint
        .execute(format!("DROP DATABASE IF EXISTS {db_name} WITH (FORCE)").as_str())
        .await
        .with_context(|| format!("failed to drop database {db_name}"));
    maint.close().await;
    result?;
    Ok(())
}

/// Create the configured database unless it already exists.
pub async fn ensure_database_exists(config: &DbConfig) -> Result<()> {
    let db_name = config
        .database_name()
        .context("could not determine database name from URL")?;

    let maint = maintenance_pool(config).await?;
    let exists: Result<bool> =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(db_name)
            .fetch_one(&maint)
            .await
            .context("failed to query pg_database");
    maint.close().await;

    if exists? {
        info!(db = db_name, "database already exists");
        return Ok(());
    }
    create_database(config, db_name).await
}

/// Number of rows in the `plans` table. Printed by `wooza db-init`.
pub async fn plan_count(pool: &PgPool) -> Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM plans")
        .fetch_one(pool)
        .await
        .context("failed to count plans")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_name_accepts_identifiers() {
        assert_eq!(checked_name("wooza_test_01").unwrap(), "wooza_test_01");
    }

    #[test]
    fn checked_name_rejects_injection() {
        assert!(checked_name("wooza; DROP TABLE plans").is_err());
        assert!(checked_name("").is_err());
        assert!(checked_name("wooza-dev").is_err());
    }
}

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use tracing::info;

use crate::config::DbConfig;

/// Migrations embedded at compile time from `crates/pathwise-db/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Open the pool used by the CLI. One command runs at a time, so a few
/// connections are enough for concurrent progress writes.
pub async fn create_pool(config: &DbConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(CONNECT_TIMEOUT)
        .connect(&config.database_url)
        .await
        .with_context(|| format!("failed to connect to database at {}", config.redacted_url()))
}

/// Apply pending migrations. Already-applied migrations are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to run database migrations")?;

    info!(known = MIGRATOR.iter().count(), "migrations applied");
    Ok(())
}

/// What [`ensure_database_exists`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    Created,
    AlreadyExisted,
}

/// Create the configured database through the maintenance database unless
/// it already exists.
pub async fn ensure_database_exists(config: &DbConfig) -> Result<Bootstrap> {
    let db_name = config
        .database_name()
        .context("could not determine database name from URL")?;
    check_database_name(db_name)?;

    let maint_pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(CONNECT_TIMEOUT)
        .connect(&config.maintenance_url())
        .await
        .with_context(|| {
            format!(
                "failed to connect to maintenance database for {}",
                config.redacted_url()
            )
        })?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(db_name)
            .fetch_one(&maint_pool)
            .await
            .context("failed to query pg_database")?;

    let outcome = if exists {
        Bootstrap::AlreadyExisted
    } else {
        // CREATE DATABASE takes no bind parameters; the name was checked above.
        maint_pool
            .execute(format!("CREATE DATABASE {db_name}").as_str())
            .await
            .with_context(|| format!("failed to create database {db_name}"))?;
        Bootstrap::Created
    };
    info!(db = db_name, ?outcome, "database ready");

    maint_pool.close().await;
    Ok(outcome)
}

fn check_database_name(name: &str) -> Result<()> {
    let starts_ok = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_ok || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        bail!("database name {name:?} contains invalid characters");
    }
    Ok(())
}

/// Row totals reported by `pathwise db-init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaReport {
    pub migrations: i64,
    pub roadmaps: i64,
    /// One record per (roadmap, user) pair that has touched any step.
    pub progress_records: i64,
    pub completed_steps: i64,
}

impl fmt::Display for SchemaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} migrations, {} roadmaps, {} progress records ({} steps completed)",
            self.migrations, self.roadmaps, self.progress_records, self.completed_steps
        )
    }
}

/// Summarize a migrated database.
pub async fn schema_report(pool: &PgPool) -> Result<SchemaReport> {
    let (migrations, roadmaps, progress_records, completed_steps): (i64, i64, i64, i64) =
        sqlx::query_as(
            "SELECT \
               (SELECT COUNT(*) FROM _sqlx_migrations WHERE success), \
               (SELECT COUNT(*) FROM roadmaps), \
               (SELECT COUNT(*) FROM roadmap_progress), \
               (SELECT COUNT(*) FROM roadmap_progress p, jsonb_each(p.progress) AS step \
                WHERE step.value = 'true'::jsonb)",
        )
        .fetch_one(pool)
        .await
        .context("failed to summarize the roadmap tables (did migrations run?)")?;

    Ok(SchemaReport {
        migrations,
        roadmaps,
        progress_records,
        completed_steps,
    })
}

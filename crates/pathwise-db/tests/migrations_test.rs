//! Integration tests for embedded migrations and database bootstrap.

use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use pathwise_db::config::DbConfig;
use pathwise_db::pool::{self, Bootstrap};
use pathwise_db::queries::{progress, roadmaps};
use pathwise_test_utils::{TestDb, sample_roadmap, server_url};

/// Tables created by the migrations, excluding sqlx bookkeeping.
const EXPECTED_TABLES: &[&str] = &["roadmap_progress", "roadmaps"];

#[tokio::test]
async fn migrations_create_all_tables() {
    let db = TestDb::new().await;

    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT tablename::text FROM pg_tables \
         WHERE schemaname = 'public' AND tablename NOT LIKE '\\_sqlx%' \
         ORDER BY tablename",
    )
    .fetch_all(&db.pool)
    .await
    .expect("should list tables");

    let table_names: Vec<&str> = rows.iter().map(|(name,)| name.as_str()).collect();
    assert_eq!(table_names, EXPECTED_TABLES);

    db.teardown().await;
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = TestDb::new().await;

    pool::run_migrations(&db.pool)
        .await
        .expect("second migration run should be a no-op");

    let report = pool::schema_report(&db.pool).await.unwrap();
    assert_eq!(report.migrations, pool::MIGRATOR.iter().count() as i64);
    assert_eq!(report.roadmaps, 0);
    assert_eq!(report.progress_records, 0);
    assert_eq!(report.completed_steps, 0);

    db.teardown().await;
}

#[tokio::test]
async fn schema_report_counts_roadmaps_and_completed_steps() {
    let db = TestDb::new().await;

    let first = roadmaps::insert_roadmap(&db.pool, &sample_roadmap("owner", 3))
        .await
        .unwrap();
    roadmaps::insert_roadmap(&db.pool, &sample_roadmap("owner", 2))
        .await
        .unwrap();
    progress::set_step(&db.pool, first, "learner", 0, true).await.unwrap();
    progress::set_step(&db.pool, first, "learner", 2, true).await.unwrap();
    progress::set_step(&db.pool, first, "learner", 1, false).await.unwrap();
    progress::set_step(&db.pool, first, "other", 1, true).await.unwrap();

    let report = pool::schema_report(&db.pool).await.unwrap();
    assert_eq!(report.roadmaps, 2);
    assert_eq!(report.progress_records, 2);
    assert_eq!(report.completed_steps, 3);

    db.teardown().await;
}

#[tokio::test]
async fn ensure_database_exists_creates_once() {
    let name = format!("pathwise_bootstrap_{}", Uuid::new_v4().simple());
    let config = DbConfig::new(format!("{}/{name}", server_url().await));

    let first = pool::ensure_database_exists(&config).await.unwrap();
    assert_eq!(first, Bootstrap::Created);
    let second = pool::ensure_database_exists(&config)
        .await
        .expect("existing database is left alone");
    assert_eq!(second, Bootstrap::AlreadyExisted);

    let db_pool = pool::create_pool(&config).await.unwrap();
    pool::run_migrations(&db_pool).await.unwrap();
    db_pool.close().await;

    let maint = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.maintenance_url())
        .await
        .unwrap();
    let _ = maint
        .execute(format!("DROP DATABASE IF EXISTS {name}").as_str())
        .await;
    maint.close().await;
}

#[tokio::test]
async fn ensure_database_exists_keeps_query_options() {
    let name = format!("pathwise_bootstrap_{}", Uuid::new_v4().simple());
    let config = DbConfig::new(format!(
        "{}/{name}?application_name=pathwise_db_init",
        server_url().await
    ));
    assert_eq!(config.database_name(), Some(name.as_str()));

    pool::ensure_database_exists(&config).await.unwrap();

    let maint = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.maintenance_url())
        .await
        .unwrap();
    let _ = maint
        .execute(format!("DROP DATABASE IF EXISTS {name}").as_str())
        .await;
    maint.close().await;
}

#[tokio::test]
async fn ensure_database_exists_rejects_unsafe_names() {
    let config = DbConfig::new(format!("{}/bad-name;drop", server_url().await));
    let err = pool::ensure_database_exists(&config).await.unwrap_err();
    assert!(err.to_string().contains("invalid characters"), "unexpected error: {err}");
}

//! Shared fixtures for pathwise integration tests.
//!
//! Provides one PostgreSQL server per test binary and a fresh, migrated
//! database per test, plus builders for sample roadmaps.
//!
//! Server selection:
//! - **`PATHWISE_TEST_PG_URL`** set: use that server directly (CI service
//!   container or a local instance). The URL must not include a database.
//! - **Unset**: start a `postgres` container via testcontainers, shared per
//!   binary through a `OnceCell`.

use std::time::Duration;

use chrono::{SubsecRound, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use testcontainers::ContainerAsync;
use testcontainers::ImageExt;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use pathwise_db::models::{Roadmap, RoadmapContent, Step};
use pathwise_db::pool;

struct SharedPg {
    base_url: String,
    /// Keeps the container alive. `None` for an external server.
    _container: Option<ContainerAsync<Postgres>>,
}

static SHARED_PG: OnceCell<SharedPg> = OnceCell::const_new();

async fn init_shared_pg() -> SharedPg {
    if let Ok(url) = std::env::var("PATHWISE_TEST_PG_URL") {
        return SharedPg {
            base_url: url.trim_end_matches('/').to_owned(),
            _container: None,
        };
    }

    let container = Postgres::default()
        .with_tag("16")
        .start()
        .await
        .expect("failed to start PostgreSQL container");

    let host = container.get_host().await.expect("failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("failed to get mapped port");

    SharedPg {
        base_url: format!("postgresql://postgres:postgres@{host}:{port}"),
        _container: Some(container),
    }
}

/// Base URL of the shared server, without a database path.
pub async fn server_url() -> String {
    SHARED_PG.get_or_init(init_shared_pg).await.base_url.clone()
}

async fn maintenance_pool() -> PgPool {
    let shared = SHARED_PG.get_or_init(init_shared_pg).await;
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&format!("{}/postgres", shared.base_url))
        .await
        .expect("failed to connect to maintenance database")
}

/// A migrated database that exists for the duration of one test.
pub struct TestDb {
    pub pool: PgPool,
    name: String,
}

impl TestDb {
    /// Create a uniquely-named database and apply all migrations.
    pub async fn new() -> Self {
        let maint = maintenance_pool().await;
        let name = format!("pathwise_test_{}", Uuid::new_v4().simple());
        maint
            .execute(format!("CREATE DATABASE {name}").as_str())
            .await
            .unwrap_or_else(|e| panic!("failed to create test database {name}: {e}"));
        maint.close().await;

        let shared = SHARED_PG.get().expect("shared postgres initialized");
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&format!("{}/{name}", shared.base_url))
            .await
            .unwrap_or_else(|e| panic!("failed to connect to test database {name}: {e}"));

        pool::run_migrations(&pool)
            .await
            .expect("migrations should succeed");

        Self { pool, name }
    }

    /// Close the pool and drop the database. Safe to call after a failed
    /// test has already left connections open.
    pub async fn teardown(self) {
        self.pool.close().await;

        let maint = maintenance_pool().await;
        let terminate = format!(
            "SELECT pg_terminate_backend(pid) \
             FROM pg_stat_activity \
             WHERE datname = '{}' AND pid <> pg_backend_pid()",
            self.name
        );
        let _ = maint.execute(terminate.as_str()).await;
        let _ = maint
            .execute(format!("DROP DATABASE IF EXISTS {}", self.name).as_str())
            .await;
        maint.close().await;
    }
}

/// Build `count` numbered steps, each with one URL resource.
pub fn sample_steps(count: usize) -> Vec<Step> {
    (1..=count)
        .map(|n| Step {
            title: format!("Step {n}"),
            description: format!("Work through part {n}."),
            resources: vec![format!("https://example.com/part-{n}")],
        })
        .collect()
}

/// Build an unsaved roadmap owned by `owner_id` with `step_count` steps.
///
/// `created_at` is truncated to microseconds to match PostgreSQL precision,
/// so a fetched row compares equal to the value inserted.
pub fn sample_roadmap(owner_id: &str, step_count: usize) -> Roadmap {
    Roadmap {
        id: Uuid::new_v4(),
        owner_id: owner_id.to_owned(),
        title: "Learn Go".to_owned(),
        description: "From syntax to services.".to_owned(),
        content: RoadmapContent {
            steps: sample_steps(step_count),
        },
        created_at: Utc::now().trunc_subsecs(6),
    }
}

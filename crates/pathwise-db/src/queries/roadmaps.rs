//! Database query functions for the `roadmaps` table.
//!
//! The table is insert-only: there is no update path, and a trigger rejects
//! any `UPDATE` that reaches the database.

use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::models::{Roadmap, RoadmapSummary};

/// Insert a new roadmap row. The id is assigned by the caller.
///
/// Never overwrites: an existing id yields [`PersistenceError::Conflict`].
pub async fn insert_roadmap(pool: &PgPool, roadmap: &Roadmap) -> Result<Uuid, PersistenceError> {
    let step_count = i32::try_from(roadmap.content.steps.len()).unwrap_or(i32::MAX);

    sqlx::query(
        "INSERT INTO roadmaps (id, owner_id, title, description, content, step_count, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(roadmap.id)
    .bind(&roadmap.owner_id)
    .bind(&roadmap.title)
    .bind(&roadmap.description)
    .bind(Json(&roadmap.content))
    .bind(step_count)
    .bind(roadmap.created_at)
    .execute(pool)
    .await
    .map_err(|e| PersistenceError::from_insert(e, roadmap.id))?;

    tracing::debug!(roadmap_id = %roadmap.id, step_count, "roadmap inserted");
    Ok(roadmap.id)
}

/// Fetch a roadmap by its ID.
pub async fn get_roadmap(pool: &PgPool, id: Uuid) -> Result<Option<Roadmap>, PersistenceError> {
    let roadmap = sqlx::query_as::<_, Roadmap>("SELECT * FROM roadmaps WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(roadmap)
}

/// List an owner's roadmaps, most recent first.
pub async fn list_roadmaps_for_owner(
    pool: &PgPool,
    owner_id: &str,
) -> Result<Vec<RoadmapSummary>, PersistenceError> {
    let roadmaps = sqlx::query_as::<_, RoadmapSummary>(
        "SELECT id, title, description, step_count, created_at \
         FROM roadmaps \
         WHERE owner_id = $1 \
         ORDER BY created_at DESC, id DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(roadmaps)
}

/// Number of steps in a roadmap, or `None` if it does not exist.
pub async fn get_step_count(pool: &PgPool, id: Uuid) -> Result<Option<i32>, PersistenceError> {
    let count: Option<i32> = sqlx::query_scalar("SELECT step_count FROM roadmaps WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(count)
}

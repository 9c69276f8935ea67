//! Database query functions for the `roadmap_progress` table.
//!
//! Writes are single-statement upserts that merge one key into the stored
//! JSONB object (`progress || jsonb_build_object(...)`). The conflicting row
//! is locked for the duration of the statement, so concurrent writes to the
//! same `(roadmap_id, user_id)` serialize and writes to different step
//! indices never overwrite each other.

use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::models::{ProgressMap, ProgressRecord};
use crate::queries::roadmaps;

/// Fetch the progress record for a `(roadmap, user)` pair.
pub async fn get_progress(
    pool: &PgPool,
    roadmap_id: Uuid,
    user_id: &str,
) -> Result<Option<ProgressRecord>, PersistenceError> {
    let record = sqlx::query_as::<_, ProgressRecord>(
        "SELECT * FROM roadmap_progress WHERE roadmap_id = $1 AND user_id = $2",
    )
    .bind(roadmap_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Flip the completion flag for one step and return the resulting map.
///
/// An absent flag counts as `false`, so the first toggle marks the step
/// completed. Creates the record on first write.
pub async fn toggle_step(
    pool: &PgPool,
    roadmap_id: Uuid,
    user_id: &str,
    index: u32,
) -> Result<ProgressMap, PersistenceError> {
    let Ok(index_i32) = i32::try_from(index) else {
        return Err(missing_target(pool, roadmap_id, index).await);
    };

    let row: Option<(Json<ProgressMap>,)> = sqlx::query_as(
        "WITH target AS ( \
             SELECT id FROM roadmaps WHERE id = $1 AND $3 < step_count \
         ) \
         INSERT INTO roadmap_progress (roadmap_id, user_id, progress) \
         SELECT id, $2, jsonb_build_object($4::text, true) FROM target \
         ON CONFLICT (roadmap_id, user_id) DO UPDATE \
         SET progress = roadmap_progress.progress || jsonb_build_object( \
                 $4::text, \
                 NOT COALESCE((roadmap_progress.progress ->> $4::text)::boolean, false) \
             ), \
             updated_at = now() \
         RETURNING progress",
    )
    .bind(roadmap_id)
    .bind(user_id)
    .bind(index_i32)
    .bind(index.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some((Json(progress),)) => Ok(progress),
        None => Err(missing_target(pool, roadmap_id, index).await),
    }
}

/// Set the completion flag for one step to an explicit value.
pub async fn set_step(
    pool: &PgPool,
    roadmap_id: Uuid,
    user_id: &str,
    index: u32,
    completed: bool,
) -> Result<ProgressMap, PersistenceError> {
    let Ok(index_i32) = i32::try_from(index) else {
        return Err(missing_target(pool, roadmap_id, index).await);
    };

    let row: Option<(Json<ProgressMap>,)> = sqlx::query_as(
        "WITH target AS ( \
             SELECT id FROM roadmaps WHERE id = $1 AND $3 < step_count \
         ) \
         INSERT INTO roadmap_progress (roadmap_id, user_id, progress) \
         SELECT id, $2, jsonb_build_object($4::text, $5::boolean) FROM target \
         ON CONFLICT (roadmap_id, user_id) DO UPDATE \
         SET progress = roadmap_progress.progress || jsonb_build_object($4::text, $5::boolean), \
             updated_at = now() \
         RETURNING progress",
    )
    .bind(roadmap_id)
    .bind(user_id)
    .bind(index_i32)
    .bind(index.to_string())
    .bind(completed)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((Json(progress),)) => Ok(progress),
        None => Err(missing_target(pool, roadmap_id, index).await),
    }
}

/// Explain why an upsert matched no roadmap: unknown id or index out of range.
async fn missing_target(pool: &PgPool, roadmap_id: Uuid, index: u32) -> PersistenceError {
    match roadmaps::get_step_count(pool, roadmap_id).await {
        Ok(None) => PersistenceError::NotFound(roadmap_id),
        Ok(Some(step_count)) => PersistenceError::StepOutOfRange {
            roadmap_id,
            index,
            step_count,
        },
        Err(e) => e,
    }
}

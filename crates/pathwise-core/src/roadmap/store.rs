//! Create-only storage of generated roadmaps.

use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use pathwise_db::PersistenceError;
use pathwise_db::models::{Roadmap, RoadmapSummary};
use pathwise_db::queries::roadmaps as roadmap_queries;

/// Roadmap persistence over a PostgreSQL pool.
///
/// There is no update path: a roadmap is written once and read many times.
#[derive(Debug, Clone)]
pub struct RoadmapStore {
    pool: PgPool,
}

impl RoadmapStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert a new roadmap. The id must already be assigned; an existing id
    /// yields [`PersistenceError::Conflict`] and the stored row is untouched.
    pub async fn create(&self, roadmap: &Roadmap) -> Result<Uuid, PersistenceError> {
        let id = roadmap_queries::insert_roadmap(&self.pool, roadmap).await?;
        info!(
            roadmap_id = %id,
            owner_id = %roadmap.owner_id,
            steps = roadmap.steps().len(),
            "roadmap stored"
        );
        Ok(id)
    }

    /// Fetch a roadmap, or [`PersistenceError::NotFound`].
    pub async fn get(&self, id: Uuid) -> Result<Roadmap, PersistenceError> {
        roadmap_queries::get_roadmap(&self.pool, id)
            .await?
            .ok_or(PersistenceError::NotFound(id))
    }

    /// Summaries of everything `owner_id` has generated, newest first.
    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<RoadmapSummary>, PersistenceError> {
        let roadmaps = roadmap_queries::list_roadmaps_for_owner(&self.pool, owner_id).await?;
        debug!(owner_id, count = roadmaps.len(), "listed roadmaps");
        Ok(roadmaps)
    }
}

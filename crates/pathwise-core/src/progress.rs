//! Per-user completion tracking for a roadmap's steps.
//!
//! Step indices are zero-based here and at the storage layer. A missing
//! index means "not completed". Every write is a single atomic merge of one
//! key, so toggles from concurrent sessions never clobber each other.

use std::fmt;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use pathwise_db::PersistenceError;
use pathwise_db::models::ProgressMap;
use pathwise_db::queries::progress as progress_queries;

/// Reads and writes `(roadmap, user)` completion maps.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    pool: PgPool,
}

impl ProgressTracker {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Current map for the pair; empty when nothing has been recorded yet.
    pub async fn get(&self, roadmap_id: Uuid, user_id: &str) -> Result<ProgressMap, PersistenceError> {
        let record = progress_queries::get_progress(&self.pool, roadmap_id, user_id).await?;
        Ok(record.map(|r| r.progress).unwrap_or_default())
    }

    /// Flip one step and return the full map after the write.
    pub async fn toggle(
        &self,
        roadmap_id: Uuid,
        user_id: &str,
        step_index: u32,
    ) -> Result<ProgressMap, PersistenceError> {
        let progress =
            progress_queries::toggle_step(&self.pool, roadmap_id, user_id, step_index).await?;
        info!(
            roadmap_id = %roadmap_id,
            user_id,
            step_index,
            completed = progress.get(&step_index).copied().unwrap_or(false),
            "step toggled"
        );
        Ok(progress)
    }

    /// Write an explicit value for one step. Repeating the call is a no-op.
    pub async fn set(
        &self,
        roadmap_id: Uuid,
        user_id: &str,
        step_index: u32,
        completed: bool,
    ) -> Result<ProgressMap, PersistenceError> {
        let progress =
            progress_queries::set_step(&self.pool, roadmap_id, user_id, step_index, completed)
                .await?;
        info!(roadmap_id = %roadmap_id, user_id, step_index, completed, "step set");
        Ok(progress)
    }
}

/// Completed-versus-total count for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSummary {
    pub completed: usize,
    pub total: usize,
}

impl ProgressSummary {
    /// Whole-number percentage, rounded down. Zero for an empty roadmap.
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.completed * 100 / self.total
        }
    }

    pub fn is_finished(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

impl fmt::Display for ProgressSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({}%)", self.completed, self.total, self.percent())
    }
}

/// Count completed steps. Keys outside `0..step_count` are ignored.
pub fn summarize(step_count: usize, progress: &ProgressMap) -> ProgressSummary {
    let completed = progress
        .iter()
        .filter(|&(&index, &done)| done && (index as usize) < step_count)
        .count();
    ProgressSummary {
        completed,
        total: step_count,
    }
}

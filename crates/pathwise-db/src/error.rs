//! Errors surfaced by the persistence boundary.

use thiserror::Error;
use uuid::Uuid;

/// Failure reading or writing roadmap and progress records.
///
/// Callers report these to the user; nothing in this crate retries.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// A roadmap with this id already exists. Roadmaps are insert-only.
    #[error("roadmap {0} already exists")]
    Conflict(Uuid),

    #[error("roadmap {0} not found")]
    NotFound(Uuid),

    #[error("step {index} is out of range for roadmap {roadmap_id} ({step_count} steps)")]
    StepOutOfRange {
        roadmap_id: Uuid,
        index: u32,
        step_count: i32,
    },

    /// Storage unavailable or the statement failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl PersistenceError {
    /// Whether the error came from a unique-key violation on insert.
    pub(crate) fn from_insert(err: sqlx::Error, id: Uuid) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict(id),
            _ => Self::Database(err),
        }
    }
}

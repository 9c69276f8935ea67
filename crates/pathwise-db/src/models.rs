use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-user completion flags keyed by zero-based step index.
///
/// An index that is absent means "not completed". Stored as a JSONB object
/// whose keys are the decimal step indices.
pub type ProgressMap = BTreeMap<u32, bool>;

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// One unit of a roadmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub title: String,
    pub description: String,
    /// Each entry is either a fully-qualified URL or a descriptive label.
    #[serde(default)]
    pub resources: Vec<String>,
}

/// The JSONB `content` column of a roadmap row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapContent {
    pub steps: Vec<Step>,
}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A persisted roadmap. Immutable once inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Roadmap {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    #[sqlx(json)]
    pub content: RoadmapContent,
    pub created_at: DateTime<Utc>,
}

impl Roadmap {
    pub fn steps(&self) -> &[Step] {
        &self.content.steps
    }
}

/// Lightweight listing row for a user's dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RoadmapSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub step_count: i32,
    pub created_at: DateTime<Utc>,
}

/// One `(roadmap, user)` completion record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProgressRecord {
    pub roadmap_id: Uuid,
    pub user_id: String,
    #[sqlx(json)]
    pub progress: ProgressMap,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! `pathwise toggle`, `complete`, `uncomplete`: per-step progress updates.
//!
//! Steps are numbered from 1 on the command line and from 0 in storage.

use anyhow::{Result, bail};
use sqlx::PgPool;

use pathwise_core::identity::{Identity, require_user};
use pathwise_core::progress::{ProgressTracker, summarize};
use pathwise_core::roadmap::RoadmapStore;

use crate::roadmap_cmds::parse_roadmap_id;

/// What to do to the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    Toggle,
    Set(bool),
}

/// Convert a 1-based step number to a storage index.
pub fn step_index(step_number: u32) -> Result<u32> {
    if step_number == 0 {
        bail!("step numbers start at 1");
    }
    Ok(step_number - 1)
}

/// Run a progress update and print the new state of the step.
pub async fn run_step_update(
    pool: &PgPool,
    identity: &dyn Identity,
    id_str: &str,
    step_number: u32,
    action: StepAction,
) -> Result<()> {
    let user_id = require_user(identity)?;
    let roadmap_id = parse_roadmap_id(id_str)?;
    let index = step_index(step_number)?;

    let tracker = ProgressTracker::new(pool.clone());
    let progress = match action {
        StepAction::Toggle => tracker.toggle(roadmap_id, &user_id, index).await?,
        StepAction::Set(completed) => tracker.set(roadmap_id, &user_id, index, completed).await?,
    };

    let roadmap = RoadmapStore::new(pool.clone()).get(roadmap_id).await?;
    let done = progress.get(&index).copied().unwrap_or(false);
    let title = roadmap
        .steps()
        .get(index as usize)
        .map(|s| s.title.as_str())
        .unwrap_or_default();

    println!(
        "Step {step_number} ({title}) marked {}.",
        if done { "complete" } else { "incomplete" }
    );
    println!("Progress: {}", summarize(roadmap.steps().len(), &progress));
    Ok(())
}

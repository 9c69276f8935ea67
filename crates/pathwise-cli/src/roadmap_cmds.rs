//! `pathwise list` and `pathwise show`: read-only views of stored roadmaps.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use pathwise_core::identity::{Identity, require_user};
use pathwise_core::progress::{ProgressTracker, summarize};
use pathwise_core::roadmap::RoadmapStore;
use pathwise_db::models::{ProgressMap, Roadmap};

/// Parse a roadmap id argument.
pub fn parse_roadmap_id(id_str: &str) -> Result<Uuid> {
    Uuid::parse_str(id_str.trim()).with_context(|| format!("invalid roadmap ID: {id_str}"))
}

/// List the current user's roadmaps, newest first.
pub async fn run_list(pool: &PgPool, identity: &dyn Identity) -> Result<()> {
    let user_id = require_user(identity)?;
    let store = RoadmapStore::new(pool.clone());
    let tracker = ProgressTracker::new(pool.clone());

    let roadmaps = store.list_by_owner(&user_id).await?;
    if roadmaps.is_empty() {
        println!("No roadmaps yet. Create one with `pathwise generate`.");
        return Ok(());
    }

    println!(
        "{:<38} {:<40} {:>12} {:<17}",
        "ID", "TITLE", "PROGRESS", "CREATED"
    );
    println!("{}", "-".repeat(110));

    for roadmap in &roadmaps {
        let progress = tracker.get(roadmap.id, &user_id).await?;
        let total = usize::try_from(roadmap.step_count).unwrap_or(0);
        let summary = summarize(total, &progress);
        println!(
            "{:<38} {:<40} {:>12} {:<17}",
            roadmap.id,
            truncate(&roadmap.title, 38),
            format!("{}/{}", summary.completed, summary.total),
            roadmap.created_at.format("%Y-%m-%d %H:%M"),
        );
    }

    Ok(())
}

/// Show one roadmap with its steps. Completion marks appear when a user is
/// known.
pub async fn run_show(pool: &PgPool, identity: &dyn Identity, id_str: &str) -> Result<()> {
    let id = parse_roadmap_id(id_str)?;
    let store = RoadmapStore::new(pool.clone());
    let roadmap = store.get(id).await?;

    let progress = match identity.current_user_id() {
        Some(user_id) => Some(ProgressTracker::new(pool.clone()).get(id, &user_id).await?),
        None => None,
    };

    print!("{}", render_roadmap(&roadmap, progress.as_ref()));
    Ok(())
}

/// Plain-text rendering of a roadmap. Steps are numbered from 1.
pub fn render_roadmap(roadmap: &Roadmap, progress: Option<&ProgressMap>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} ({})\n", roadmap.title, roadmap.id));
    out.push_str(&format!(
        "Created: {}\n",
        roadmap.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(progress) = progress {
        out.push_str(&format!(
            "Progress: {}\n",
            summarize(roadmap.steps().len(), progress)
        ));
    }
    out.push('\n');
    out.push_str(&roadmap.description);
    out.push_str("\n\n");

    for (index, step) in roadmap.steps().iter().enumerate() {
        let mark = match progress {
            Some(p) if p.get(&(index as u32)).copied().unwrap_or(false) => "[x] ",
            Some(_) => "[ ] ",
            None => "",
        };
        out.push_str(&format!("{mark}{}. {}\n", index + 1, step.title));
        out.push_str(&format!("     {}\n", step.description));
        for resource in &step.resources {
            out.push_str(&format!("     - {resource}\n"));
        }
    }

    out
}

/// Shorten to at most `max` characters, marking the cut with `...`.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

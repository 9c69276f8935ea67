//! One roadmap generation, end to end.

use chrono::{SubsecRound, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use pathwise_db::models::{Roadmap, RoadmapContent};

use crate::error::RoadmapError;
use crate::generation::GenerationClient;
use crate::request::RoadmapRequest;
use crate::roadmap::{self, RoadmapStore};

/// Generate, validate, sanitize and store a roadmap for `owner_id`.
///
/// The model call races `cancel`. Once the token fires, any response is
/// discarded and nothing is written. The call is made exactly once; a
/// failure at any stage is returned without retrying.
pub async fn generate_roadmap(
    client: &dyn GenerationClient,
    store: &RoadmapStore,
    owner_id: &str,
    request: &RoadmapRequest,
    cancel: &CancellationToken,
) -> Result<Roadmap, RoadmapError> {
    if owner_id.trim().is_empty() {
        return Err(RoadmapError::Unauthenticated);
    }

    let prompt = roadmap::build_prompt(request);
    info!(
        client = client.name(),
        owner_id,
        skill_level = %request.skill_level,
        "requesting roadmap"
    );

    let raw = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            info!(owner_id, "roadmap generation cancelled while waiting for the model");
            return Err(RoadmapError::Cancelled);
        }
        result = client.generate(&prompt) => result?,
    };

    // A response that lands in the same instant as cancellation is dropped.
    if cancel.is_cancelled() {
        info!(owner_id, "discarding model response received after cancellation");
        return Err(RoadmapError::Cancelled);
    }

    let value = roadmap::parse_response(&raw).inspect_err(|err| {
        warn!(error = %err, "model response is not JSON");
        debug!(raw = %err.raw, "raw model response");
    })?;

    let draft = roadmap::validate_roadmap(&value).inspect_err(|err| {
        warn!(path = %err.path, problem = %err.problem, "model response failed validation");
        debug!(raw = %raw, "raw model response");
    })?;

    let draft = roadmap::sanitize_draft(draft);

    let roadmap = Roadmap {
        id: Uuid::new_v4(),
        owner_id: owner_id.to_string(),
        title: draft.title,
        description: draft.description,
        content: RoadmapContent { steps: draft.steps },
        // Postgres stores microseconds; keep the returned value identical to the row.
        created_at: Utc::now().trunc_subsecs(6),
    };

    store.create(&roadmap).await?;
    Ok(roadmap)
}

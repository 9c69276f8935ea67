//! A generation running in the background, tied to the lifetime of its view.
//!
//! The caller starts a [`GenerationSession`], watches its
//! [`GenerationStatus`], and drops the session when the view goes away.
//! Dropping cancels the model call, and a cancelled session never persists
//! anything.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use pathwise_db::models::Roadmap;

use crate::error::RoadmapError;
use crate::generation::GenerationClient;
use crate::pipeline::generate_roadmap;
use crate::request::RoadmapRequest;
use crate::roadmap::RoadmapStore;

/// Observable state of a [`GenerationSession`].
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationStatus {
    InFlight,
    Succeeded(Roadmap),
    /// Carries the user-facing message.
    Failed(String),
    Cancelled,
}

impl GenerationStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }
}

/// Handle to one in-flight generation.
pub struct GenerationSession {
    cancel: CancellationToken,
    status: watch::Receiver<GenerationStatus>,
    task: JoinHandle<()>,
}

impl GenerationSession {
    /// Spawn the pipeline on the current runtime.
    pub fn start(
        client: Arc<dyn GenerationClient>,
        store: RoadmapStore,
        owner_id: String,
        request: RoadmapRequest,
    ) -> Self {
        let cancel = CancellationToken::new();
        let (tx, status) = watch::channel(GenerationStatus::InFlight);

        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            let result =
                generate_roadmap(client.as_ref(), &store, &owner_id, &request, &task_cancel).await;
            let final_status = match result {
                Ok(roadmap) => {
                    info!(roadmap_id = %roadmap.id, "generation session succeeded");
                    GenerationStatus::Succeeded(roadmap)
                }
                Err(RoadmapError::Cancelled) => GenerationStatus::Cancelled,
                Err(err) => {
                    warn!(error = %err, "generation session failed");
                    GenerationStatus::Failed(err.user_message())
                }
            };
            tx.send_replace(final_status);
        });

        Self {
            cancel,
            status,
            task,
        }
    }

    /// Snapshot of the current status.
    pub fn status(&self) -> GenerationStatus {
        self.status.borrow().clone()
    }

    /// A receiver that observes every status change.
    pub fn subscribe(&self) -> watch::Receiver<GenerationStatus> {
        self.status.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait until the session leaves [`GenerationStatus::InFlight`].
    pub async fn wait(&self) -> GenerationStatus {
        let mut rx = self.status.clone();
        match rx.wait_for(|s| !s.is_in_flight()).await {
            Ok(status) => status.clone(),
            Err(_) => GenerationStatus::Failed("Roadmap generation stopped unexpectedly.".into()),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for GenerationSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

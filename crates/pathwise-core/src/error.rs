//! The error taxonomy of the roadmap pipeline.

use thiserror::Error;

use crate::generation::GenerationError;
use crate::request::ValidationError;
use crate::roadmap::{ParseError, SchemaError};
use pathwise_db::PersistenceError;

/// Every way a pipeline or progress operation can fail.
///
/// All variants are per-request failures. The `Display` text is meant for
/// logs; use [`RoadmapError::user_message`] for anything shown to a user.
#[derive(Debug, Error)]
pub enum RoadmapError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("model response has the wrong shape: {0}")]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("generation was cancelled")]
    Cancelled,

    #[error("no authenticated user")]
    Unauthenticated,
}

impl RoadmapError {
    /// Text that is safe to show the requesting user.
    ///
    /// Malformed model output is reported generically; the raw text and the
    /// offending path stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => {
                let mut message = err.to_string();
                if let Some(first) = message.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                format!("{message}.")
            }
            Self::Generation(GenerationError::Timeout(_)) => {
                "The roadmap service took too long to respond. Please try again.".into()
            }
            Self::Generation(_) => {
                "The roadmap service is unavailable right now. Please try again later.".into()
            }
            Self::Parse(_) | Self::Schema(_) => {
                "Failed to generate a roadmap. Please try again.".into()
            }
            Self::Persistence(PersistenceError::NotFound(_)) => "Roadmap not found.".into(),
            Self::Persistence(PersistenceError::StepOutOfRange { .. }) => {
                "That step does not exist in this roadmap.".into()
            }
            Self::Persistence(_) => "Could not save your changes. Please try again.".into(),
            Self::Cancelled => "Roadmap generation was cancelled.".into(),
            Self::Unauthenticated => "You must be signed in to do that.".into(),
        }
    }
}

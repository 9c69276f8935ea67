//! Learning-roadmap generation and progress tracking.
//!
//! The generation path is a straight pipeline:
//!
//! ```text
//! RoadmapRequest -> prompt -> GenerationClient -> parse -> validate -> sanitize -> RoadmapStore
//! ```
//!
//! [`session::GenerationSession`] runs it in the background with
//! cancellation. [`progress::ProgressTracker`] records which steps each user
//! has completed.

pub mod error;
pub mod generation;
pub mod identity;
pub mod pipeline;
pub mod progress;
pub mod request;
pub mod roadmap;
pub mod session;

pub use error::RoadmapError;
pub use identity::{Identity, StaticIdentity, require_user};
pub use pipeline::generate_roadmap;
pub use progress::{ProgressSummary, ProgressTracker, summarize};
pub use request::{LearningStyle, RoadmapRequest, SkillLevel, TimeCommitment, ValidationError};
pub use session::{GenerationSession, GenerationStatus};

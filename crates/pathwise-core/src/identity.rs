//! The identity boundary.
//!
//! Authentication lives outside this crate. The core only asks one
//! question: who is the current user, if anyone?

use crate::error::RoadmapError;

/// Source of the current authenticated user id.
pub trait Identity: Send + Sync {
    fn current_user_id(&self) -> Option<String>;
}

/// An identity with a fixed answer, e.g. resolved once from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity(Option<String>);

impl StaticIdentity {
    /// A blank or whitespace-only id counts as signed out.
    pub fn new(user_id: Option<String>) -> Self {
        Self(user_id.map(|id| id.trim().to_string()).filter(|id| !id.is_empty()))
    }

    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self::new(Some(user_id.into()))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl Identity for StaticIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.0.clone()
    }
}

/// The current user id, or [`RoadmapError::Unauthenticated`].
pub fn require_user(identity: &dyn Identity) -> Result<String, RoadmapError> {
    identity
        .current_user_id()
        .ok_or(RoadmapError::Unauthenticated)
}

//! The `GenerationClient` trait -- the seam to the hosted text model.
//!
//! The pipeline only ever needs "prompt in, text out". Keeping that behind a
//! trait lets the production HTTP client and test fakes share one call site.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Failures talking to the hosted model. None of them are retried.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation client is misconfigured: {0}")]
    Configuration(String),

    #[error("generation request timed out after {0:?}")]
    Timeout(Duration),

    #[error("generation request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("generation service returned HTTP {status}: {body}")]
    Service { status: u16, body: String },

    #[error("generation service returned an unreadable envelope: {0}")]
    MalformedEnvelope(String),

    #[error("generation service returned no text")]
    EmptyResponse,
}

/// One-shot text generation.
///
/// Object-safe so callers can hold an `Arc<dyn GenerationClient>`.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Short identifier used in logs (e.g. "gemini").
    fn name(&self) -> &str;

    /// Send `prompt` and return the model's raw text.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

// Compile-time assertion: GenerationClient must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn GenerationClient) {}
};

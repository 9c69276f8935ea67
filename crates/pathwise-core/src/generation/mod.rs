//! Outbound calls to the hosted text-generation model.

pub mod client;
pub mod config;
pub mod gemini;

pub use client::{GenerationClient, GenerationError};
pub use config::{GenerationConfig, SAMPLING};
pub use gemini::GeminiClient;

//! Configuration for the hosted-model client.

use std::time::Duration;

use secrecy::SecretString;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Sampling parameters sent with every request. Not user-controlled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: &'static str,
}

pub const SAMPLING: Sampling = Sampling {
    temperature: 1.0,
    top_p: 0.95,
    top_k: 64,
    max_output_tokens: 8192,
    response_mime_type: "text/plain",
};

/// Connection settings for [`super::GeminiClient`].
///
/// The API key is a [`SecretString`], so `Debug` output never shows it.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: SecretString,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GenerationConfig {
    /// Defaults for everything except the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn new_uses_defaults() {
        let config = GenerationConfig::new("k");
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.api_key.expose_secret(), "k");
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = GenerationConfig::new("super-secret-key");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-key"));
        assert!(debug.contains("gemini-1.5-flash"));
    }

    #[test]
    fn builders_override_fields() {
        let config = GenerationConfig::new("k")
            .with_model("gemini-2.0-flash")
            .with_base_url("http://127.0.0.1:9000")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}

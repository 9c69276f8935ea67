//! HTTP client for the Gemini `generateContent` endpoint.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::client::{GenerationClient, GenerationError};
use super::config::{GenerationConfig, SAMPLING};

/// Single-attempt client for a hosted Gemini model.
pub struct GeminiClient {
    http: Client,
    config: GenerationConfig,
}

impl GeminiClient {
    pub fn new(config: GenerationConfig) -> Result<Self, GenerationError> {
        if config.api_key.expose_secret().trim().is_empty() {
            return Err(GenerationError::Configuration(
                "an API key is required".into(),
            ));
        }
        if config.model.trim().is_empty() {
            return Err(GenerationError::Configuration(
                "a model name is required".into(),
            ));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Configuration(e.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
        )
    }

    fn build_request(prompt: &str) -> GeminiRequest<'_> {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiRequestPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: SAMPLING.temperature,
                top_p: SAMPLING.top_p,
                top_k: SAMPLING.top_k,
                max_output_tokens: SAMPLING.max_output_tokens,
                response_mime_type: SAMPLING.response_mime_type,
            },
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout(self.config.timeout)
        } else {
            GenerationError::Transport(err)
        }
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!(model = %self.config.model, prompt_len = prompt.len(), "sending generation request");

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", self.config.api_key.expose_secret())
            .json(&Self::build_request(prompt))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "generation service rejected request");
            return Err(GenerationError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let envelope: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::MalformedEnvelope(e.to_string()))?;

        let text = envelope.into_text();
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        debug!(response_len = text.len(), "generation response received");
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiRequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiRequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f64,
    top_p: f64,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

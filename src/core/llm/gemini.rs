//! Gemini HTTP client.
//!
//! Thin client over the Generative Language API. Each call to
//! [`TextGenerator::generate`] performs exactly one network attempt and
//! classifies the result; retrying and fallback live in the sequencer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::config::GeminiConfig;

use super::types::{GenerateRequest, GenerationOutcome, ModelDescriptor};

/// A backend capable of one-shot text generation.
///
/// Implementations must not retry or sleep internally; they report what
/// happened and let the caller decide.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> GenerationOutcome;
}

/// Failure modes of the model discovery call.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("discovery request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("discovery returned status {status}: {body}")]
    Api { status: u16, body: String },
}

/// A backend that can report which models are currently available.
#[async_trait]
pub trait ModelDiscovery: Send + Sync {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, DiscoveryError>;
}

/// API-key-based client for Google's Generative Language API.
pub struct GeminiClient {
    api_key: String,
    config: GeminiConfig,
    http: Client,
}

impl GeminiClient {
    pub fn new(api_key: String, config: GeminiConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        // Trim the key at construction so header values stay well-formed
        Self {
            api_key: api_key.trim().to_string(),
            config,
            http,
        }
    }

    /// Classify one HTTP response into a [`GenerationOutcome`].
    fn classify(status: StatusCode, body: &str) -> GenerationOutcome {
        match status {
            StatusCode::TOO_MANY_REQUESTS => GenerationOutcome::RateLimited,
            StatusCode::NOT_FOUND => GenerationOutcome::NotFound,
            s if s.is_success() => match serde_json::from_str::<serde_json::Value>(body) {
                Ok(json) => match extract_candidate_text(&json) {
                    Some(text) => GenerationOutcome::Success(text),
                    None => GenerationOutcome::Blocked,
                },
                Err(_) => GenerationOutcome::Blocked,
            },
            s => GenerationOutcome::Fatal(format!("Gemini error ({}): {}", s.as_u16(), body)),
        }
    }
}

#[async_trait]
impl ModelDiscovery for GeminiClient {
    /// Ask the API which models exist right now. Returns every advertised
    /// model with its `generateContent` capability flag; filtering and
    /// fallback are the catalog's concern.
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, DiscoveryError> {
        let url = format!("{}/v1beta/models", self.config.base_url);

        let resp = self
            .http
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(Duration::from_secs(self.config.discovery_timeout_secs))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DiscoveryError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = resp.json().await?;
        Ok(parse_model_list(&json))
    }
}

/// Pull the generated text out of a `generateContent` response body.
/// Returns `None` when the payload carries no usable text (safety-filtered
/// or otherwise empty).
fn extract_candidate_text(json: &serde_json::Value) -> Option<String> {
    let text = json["candidates"]
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(|c| c["content"]["parts"].as_array())
        .and_then(|parts| parts.first())
        .and_then(|p| p["text"].as_str())?;

    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Parse a `GET /v1beta/models` response into descriptors.
fn parse_model_list(json: &serde_json::Value) -> Vec<ModelDescriptor> {
    json["models"]
        .as_array()
        .map(|models| {
            models
                .iter()
                .filter_map(|m| {
                    let name = m["name"].as_str()?;
                    let supports_generation = m["supportedGenerationMethods"]
                        .as_array()
                        .map(|methods| {
                            methods
                                .iter()
                                .any(|v| v.as_str() == Some("generateContent"))
                        })
                        .unwrap_or(false);
                    Some(ModelDescriptor {
                        name: name.to_string(),
                        supports_generation,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> GenerationOutcome {
        let url = format!(
            "{}/v1beta/{}:generateContent",
            self.config.base_url,
            request.model.resource_path()
        );

        let body = serde_json::json!({
            "contents": [{
                "parts": [{ "text": request.prompt }]
            }]
        });

        let resp = match self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => return GenerationOutcome::Fatal(format!("connection failed: {e}")),
        };

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let outcome = Self::classify(status, &body);
        if outcome.is_success() {
            tracing::debug!(
                model = %request.model,
                status = status.as_u16(),
                "generation attempt succeeded"
            );
        } else {
            // Keep the raw backend diagnostic with the candidate id, even
            // for outcomes that the sequencer recovers from.
            tracing::warn!(
                model = %request.model,
                outcome = outcome.label(),
                status = status.as_u16(),
                body = %body,
                "generation attempt failed"
            );
        }
        outcome
    }
}

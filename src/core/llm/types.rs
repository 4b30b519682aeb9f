//! Value types shared across the generation pipeline.

use serde::{Deserialize, Serialize};

/// A generation backend known to the API, identified by its resource name
/// (e.g. `models/gemini-1.5-flash-001`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    /// Whether the backend advertises the `generateContent` method.
    pub supports_generation: bool,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supports_generation: true,
        }
    }

    /// Resource path used in generation URLs. Discovery returns names that
    /// already carry the `models/` prefix; hand-curated config entries may
    /// omit it.
    pub fn resource_path(&self) -> String {
        if self.name.starts_with("models/") {
            self.name.clone()
        } else {
            format!("models/{}", self.name)
        }
    }
}

impl std::fmt::Display for ModelDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// One generation attempt: a chosen model plus the finished prompt.
/// Immutable once built; the prompt is truncated upstream.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: ModelDescriptor,
    pub prompt: String,
}

impl GenerateRequest {
    pub fn new(model: ModelDescriptor, prompt: impl Into<String>) -> Self {
        Self {
            model,
            prompt: prompt.into(),
        }
    }
}

/// Classified result of a single generation attempt.
///
/// The sequencer branches on this instead of on raised errors, so every
/// recovery path is an explicit, testable match arm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The backend produced usable text.
    Success(String),
    /// Quota or rate limit hit; worth retrying the same model after a delay.
    RateLimited,
    /// The model identifier is unknown to the backend (retired or mistyped).
    NotFound,
    /// The call succeeded but no text came back (typically safety-filtered).
    Blocked,
    /// Malformed request, bad credentials, transport failure — anything that
    /// would fail identically on every candidate. Carries the raw diagnostic.
    Fatal(String),
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success(_))
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            GenerationOutcome::Success(_) => "success",
            GenerationOutcome::RateLimited => "rate_limited",
            GenerationOutcome::NotFound => "not_found",
            GenerationOutcome::Blocked => "blocked",
            GenerationOutcome::Fatal(_) => "fatal",
        }
    }
}

//! Fallback/retry sequencing.
//!
//! Drives the generation backend across the candidate list and across time
//! until one attempt succeeds or every option is spent. Rate limiting is
//! retried on the same model with exponential backoff (clamped, and bounded
//! by a per-invocation wall-clock budget); unknown models and blocked
//! responses advance to the next candidate immediately; fatal errors abort
//! the whole invocation, because a bad prompt or bad credentials will fail
//! identically on every model.
//!
//! All state here lives on the stack of one invocation. Backoff waits are
//! `tokio::time::sleep`, so a waiting invocation never blocks its neighbors.

use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use crate::config::RetryConfig;

use super::gemini::TextGenerator;
use super::types::{GenerateRequest, GenerationOutcome, ModelDescriptor};

/// Retry tuning for one invocation.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts per candidate before advancing (rate-limit path).
    pub max_attempts_per_candidate: u32,
    /// Delay after the first rate-limited attempt.
    pub base_delay: Duration,
    /// Clamp for a single backoff delay.
    pub max_delay: Duration,
    /// Wall-clock ceiling for the whole invocation.
    pub total_budget: Duration,
    /// Retry blocked/empty responses on the same model instead of advancing.
    pub retry_blocked: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts_per_candidate: config.max_attempts_per_candidate.max(1),
            base_delay: config.base_delay(),
            max_delay: config.max_delay(),
            total_budget: config.total_budget(),
            retry_blocked: config.retry_blocked,
        }
    }
}

impl RetryPolicy {
    /// Backoff before attempt `attempt + 1`, given `attempt` completed
    /// attempts. Doubles per attempt, clamped to `max_delay`, so the series
    /// is monotonically non-decreasing.
    fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self.base_delay.saturating_mul(2u32.saturating_pow(exponent));
        delay.min(self.max_delay)
    }
}

/// Terminal failure of one invocation.
#[derive(Debug, Error)]
pub enum SequencerError {
    /// A non-retryable backend failure; carries the raw diagnostic.
    #[error("generation failed: {0}")]
    Fatal(String),
    /// Every candidate failed through a recoverable path.
    #[error("all candidate models exhausted: {last_error}")]
    Exhausted { last_error: String },
}

/// Try candidates in order until one generation attempt succeeds.
///
/// Guarantees: at most one success is accepted; per-candidate attempt
/// counters reset when advancing; total elapsed time is bounded by
/// `policy.total_budget` plus one in-flight request.
pub async fn run(
    generator: &dyn TextGenerator,
    candidates: &[ModelDescriptor],
    prompt: &str,
    policy: &RetryPolicy,
) -> Result<String, SequencerError> {
    if candidates.is_empty() {
        return Err(SequencerError::Exhausted {
            last_error: "no candidate models available".to_string(),
        });
    }

    let deadline = Instant::now() + policy.total_budget;
    let mut last_error = "no attempts made".to_string();

    'candidates: for candidate in candidates {
        if Instant::now() >= deadline {
            tracing::warn!(model = %candidate, "invocation budget spent; skipping remaining candidates");
            last_error = format!("{last_error} (invocation time budget exhausted)");
            break;
        }

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let request = GenerateRequest::new(candidate.clone(), prompt);

            match generator.generate(&request).await {
                GenerationOutcome::Success(text) => {
                    tracing::info!(model = %candidate, attempt, "generation succeeded");
                    return Ok(text);
                }
                GenerationOutcome::RateLimited => {
                    tracing::warn!(model = %candidate, attempt, "rate limited");
                    last_error = format!("{candidate}: rate limited");
                    if attempt >= policy.max_attempts_per_candidate {
                        continue 'candidates;
                    }
                    let delay = policy.delay_for(attempt);
                    if Instant::now() + delay >= deadline {
                        tracing::warn!(
                            model = %candidate,
                            "backoff would exceed invocation budget; advancing"
                        );
                        continue 'candidates;
                    }
                    tokio::time::sleep(delay).await;
                }
                GenerationOutcome::NotFound => {
                    tracing::warn!(model = %candidate, "model not known to backend; advancing");
                    last_error = format!("{candidate}: model not found");
                    continue 'candidates;
                }
                GenerationOutcome::Blocked => {
                    tracing::warn!(model = %candidate, attempt, "empty or blocked response");
                    last_error = format!("{candidate}: empty or blocked response");
                    if policy.retry_blocked && attempt < policy.max_attempts_per_candidate {
                        // Same model, straight away: content filters are not
                        // a load problem, no point waiting.
                        continue;
                    }
                    continue 'candidates;
                }
                GenerationOutcome::Fatal(message) => {
                    tracing::error!(model = %candidate, error = %message, "fatal backend error");
                    return Err(SequencerError::Fatal(message));
                }
            }
        }
    }

    Err(SequencerError::Exhausted { last_error })
}

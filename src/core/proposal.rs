//! Proposal generation service.
//!
//! Wires the pipeline together for one request: resolve candidates, build
//! the prompt, run the fallback sequencer, render the winning text to PDF.
//! Rate limiting and unknown-model failures are recovered inside the
//! sequencer and never reach the caller unless every candidate is spent.

use std::sync::Arc;

use thiserror::Error;

use crate::config::AppConfig;
use crate::core::llm::sequencer::{self, RetryPolicy, SequencerError};
use crate::core::llm::{resolve_candidates, GeminiClient, ModelDiscovery, TextGenerator};
use crate::core::pdf::{render_proposal, PdfError};
use crate::core::prompt::build_prompt;

/// Caller-visible failure classes.
#[derive(Debug, Error)]
pub enum ProposalError {
    /// No usable report content was supplied.
    #[error("{0}")]
    Input(String),
    /// Every candidate model failed through a recoverable path.
    #[error("generation backends exhausted: {0}")]
    Exhausted(String),
    /// Non-retryable backend failure (bad request, bad credentials).
    /// Carries the backend diagnostic verbatim.
    #[error("fatal backend error: {0}")]
    FatalBackend(String),
    /// The winning text could not be rendered to a document.
    #[error("PDF rendering failed: {0}")]
    Render(#[from] PdfError),
}

impl ProposalError {
    /// Stable machine-checkable class string for API responses.
    pub fn class(&self) -> &'static str {
        match self {
            ProposalError::Input(_) => "input_error",
            ProposalError::Exhausted(_) => "exhaustion_error",
            ProposalError::FatalBackend(_) => "fatal_backend_error",
            ProposalError::Render(_) => "render_error",
        }
    }
}

impl From<SequencerError> for ProposalError {
    fn from(e: SequencerError) -> Self {
        match e {
            SequencerError::Fatal(message) => ProposalError::FatalBackend(message),
            SequencerError::Exhausted { last_error } => ProposalError::Exhausted(last_error),
        }
    }
}

/// One service instance handles independent invocations; nothing here is
/// mutated after construction.
pub struct ProposalService {
    generator: Arc<dyn TextGenerator>,
    discovery: Arc<dyn ModelDiscovery>,
    config: AppConfig,
}

impl ProposalService {
    pub fn new(client: Arc<GeminiClient>, config: AppConfig) -> Self {
        Self {
            generator: client.clone(),
            discovery: client,
            config,
        }
    }

    /// Swap in alternative backends (used by tests).
    pub fn with_backends(
        generator: Arc<dyn TextGenerator>,
        discovery: Arc<dyn ModelDiscovery>,
        config: AppConfig,
    ) -> Self {
        Self {
            generator,
            discovery,
            config,
        }
    }

    /// Turn a feasibility report into a funding-proposal PDF.
    ///
    /// Candidates are resolved fresh on every call, so backend availability
    /// changes are picked up without a restart.
    pub async fn generate(&self, report_text: &str) -> Result<Vec<u8>, ProposalError> {
        let report = report_text.trim();
        if report.is_empty() {
            return Err(ProposalError::Input(
                "report text is empty".to_string(),
            ));
        }

        let candidates = resolve_candidates(self.discovery.as_ref(), &self.config.gemini).await;
        if let Some(preferred) = candidates.first() {
            tracing::info!(
                candidates = candidates.len(),
                preferred = %preferred,
                "starting proposal generation"
            );
        }

        let prompt = build_prompt(report);
        let policy = RetryPolicy::from(&self.config.retry);
        let text =
            sequencer::run(self.generator.as_ref(), &candidates, &prompt, &policy).await?;

        let pdf = render_proposal(&text)?;
        tracing::info!(bytes = pdf.len(), "proposal rendered");
        Ok(pdf)
    }
}

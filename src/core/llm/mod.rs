//! Generation orchestration.
//!
//! Provides resilient access to Google's Generative Language API:
//! - `catalog`: discovers which models are currently usable
//! - `selector`: ranks candidates by capability tier
//! - `gemini`: the HTTP client making exactly one generation attempt
//! - `sequencer`: drives attempts across candidates with retry and backoff

pub mod catalog;
pub mod gemini;
pub mod selector;
pub mod sequencer;
pub mod types;

pub use catalog::resolve_candidates;
pub use gemini::{DiscoveryError, GeminiClient, ModelDiscovery, TextGenerator};
pub use selector::rank_candidates;
pub use sequencer::{RetryPolicy, SequencerError};
pub use types::{GenerateRequest, GenerationOutcome, ModelDescriptor};

//! Candidate model resolution.
//!
//! Produces the ordered list of models a single invocation may try.
//! Discovery is an optimization, not a dependency: when the discovery call
//! fails or yields nothing usable, a known-good default keeps the request
//! alive. A statically configured list bypasses discovery entirely.

use crate::config::GeminiConfig;

use super::gemini::ModelDiscovery;
use super::selector::rank_candidates;
use super::types::ModelDescriptor;

/// Resolve the candidate list for one invocation, most preferred first.
/// Never returns an empty list.
pub async fn resolve_candidates(
    client: &dyn ModelDiscovery,
    config: &GeminiConfig,
) -> Vec<ModelDescriptor> {
    if !config.candidate_models.is_empty() {
        // Hand-curated list: caller already ordered it most capable first.
        return config
            .candidate_models
            .iter()
            .map(ModelDescriptor::new)
            .collect();
    }

    let usable = match client.list_models().await {
        Ok(models) => {
            let usable: Vec<ModelDescriptor> = models
                .into_iter()
                .filter(|m| m.supports_generation)
                .collect();
            tracing::info!("Discovery found {} usable models", usable.len());
            usable
        }
        Err(e) => {
            tracing::warn!("Model discovery failed: {e}");
            Vec::new()
        }
    };

    if usable.is_empty() {
        tracing::warn!(
            "Falling back to default model {}",
            config.default_model
        );
        return vec![ModelDescriptor::new(&config.default_model)];
    }

    rank_candidates(usable)
}

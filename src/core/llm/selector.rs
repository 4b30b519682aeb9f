//! Candidate ranking.
//!
//! Imposes the fixed preference order on discovered models: flash-tier
//! models first (fast, generous quota), then the 1.5-pro tier, then any
//! other pro-tier model, then everything else in discovery order.

use super::types::ModelDescriptor;

/// Preference tier for a model name. Lower is better. Case-sensitive
/// substring match; ties within a tier keep discovery order.
fn tier(name: &str) -> u8 {
    if name.contains("flash") {
        0
    } else if name.contains("1.5-pro") {
        1
    } else if name.contains("pro") {
        2
    } else {
        3
    }
}

/// Order candidates most-preferred first. Stable and idempotent: the output
/// is a deterministic function of input order and content, and re-ranking a
/// ranked list is a no-op.
pub fn rank_candidates(mut candidates: Vec<ModelDescriptor>) -> Vec<ModelDescriptor> {
    candidates.sort_by_key(|m| tier(&m.name));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptors(names: &[&str]) -> Vec<ModelDescriptor> {
        names.iter().map(|n| ModelDescriptor::new(*n)).collect()
    }

    fn names(models: &[ModelDescriptor]) -> Vec<&str> {
        models.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn flash_outranks_pro() {
        let ranked = rank_candidates(descriptors(&[
            "models/gemini-1.5-pro",
            "models/gemini-1.5-flash",
        ]));
        assert_eq!(
            names(&ranked),
            vec!["models/gemini-1.5-flash", "models/gemini-1.5-pro"]
        );
    }

    #[test]
    fn full_tier_order() {
        let ranked = rank_candidates(descriptors(&[
            "models/text-bison",
            "models/gemini-pro",
            "models/gemini-1.5-pro-002",
            "models/gemini-2.0-flash",
        ]));
        assert_eq!(
            names(&ranked),
            vec![
                "models/gemini-2.0-flash",
                "models/gemini-1.5-pro-002",
                "models/gemini-pro",
                "models/text-bison",
            ]
        );
    }

    #[test]
    fn ties_keep_discovery_order() {
        let ranked = rank_candidates(descriptors(&[
            "models/gemini-1.5-flash-001",
            "models/gemini-2.0-flash",
            "models/gemini-1.5-flash-8b",
        ]));
        assert_eq!(
            names(&ranked),
            vec![
                "models/gemini-1.5-flash-001",
                "models/gemini-2.0-flash",
                "models/gemini-1.5-flash-8b",
            ]
        );
    }

    #[test]
    fn ranking_is_idempotent() {
        let input = descriptors(&[
            "models/text-bison",
            "models/gemini-1.5-flash",
            "models/gemini-pro",
            "models/gemini-1.5-pro",
        ]);
        let once = rank_candidates(input);
        let twice = rank_candidates(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_names_fall_to_the_back_unharmed() {
        let ranked = rank_candidates(descriptors(&["models/aqa", "models/embedding-001"]));
        assert_eq!(ranked.len(), 2);
        assert_eq!(names(&ranked), vec!["models/aqa", "models/embedding-001"]);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(rank_candidates(Vec::new()).is_empty());
    }
}

//! Lexical overlap boost.

use super::BoostStrategy;
use crate::index::ChunkMetadata;

/// Boosts chunks whose lowercased text contains any lowercased,
/// whitespace-delimited query term as a substring.
#[derive(Debug, Clone)]
pub struct ExactMatchBoost {
    factor: f32,
}

impl ExactMatchBoost {
    pub fn new(factor: f32) -> Self {
        Self { factor }
    }
}

impl Default for ExactMatchBoost {
    fn default() -> Self {
        Self::new(1.1)
    }
}

impl BoostStrategy for ExactMatchBoost {
    fn name(&self) -> &'static str {
        "exact_match"
    }

    fn score_adjust(&self, candidate: &str, query: &str, _metadata: Option<&ChunkMetadata>) -> f32 {
        let query = query.to_lowercase();
        let candidate = candidate.to_lowercase();
        if query
            .split_whitespace()
            .any(|term| candidate.contains(term))
        {
            self.factor
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_case_insensitively() {
        let boost = ExactMatchBoost::default();
        assert_eq!(boost.score_adjust("Cats are GREAT", "great", None), 1.1);
        assert_eq!(boost.score_adjust("cats are great", "CATS", None), 1.1);
    }

    #[test]
    fn test_substring_match_counts() {
        // "do" is a substring of "dogs"
        let boost = ExactMatchBoost::default();
        assert_eq!(boost.score_adjust("dogs are loyal", "what do cats do?", None), 1.1);
    }

    #[test]
    fn test_no_overlap_is_neutral() {
        let boost = ExactMatchBoost::default();
        assert_eq!(boost.score_adjust("parrots can talk", "What do cats do?", None), 1.0);
        assert_eq!(boost.score_adjust("anything", "   ", None), 1.0);
    }
}

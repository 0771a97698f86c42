//! Post-retrieval re-ranking.
//!
//! Candidates come back from the index ordered by cosine similarity. The
//! [`Reranker`] runs an ordered list of [`BoostStrategy`] implementations over
//! them; each returns a multiplier and the multipliers compose. Candidates are
//! then stably sorted by boosted score.
//!
//! This is a heuristic layer, not a learned model. A learned re-ranker would
//! slot in as another strategy.

mod exact_match;
mod recency;

pub use exact_match::ExactMatchBoost;
pub use recency::RecencyBoost;

use crate::config::BoostConfig;
use crate::index::ChunkMetadata;

/// A score adjustment applied to each retrieved candidate.
pub trait BoostStrategy: Send + Sync {
    /// Strategy name for logging.
    fn name(&self) -> &'static str;

    /// Multiplier for `candidate` (1.0 leaves the score unchanged).
    fn score_adjust(&self, candidate: &str, query: &str, metadata: Option<&ChunkMetadata>) -> f32;
}

/// Apply `multiplier` so that a multiplier above 1.0 always raises the score,
/// including negative similarities.
fn apply_multiplier(score: f32, multiplier: f32) -> f32 {
    if multiplier == 1.0 || multiplier <= 0.0 {
        score
    } else if score >= 0.0 {
        score * multiplier
    } else {
        score / multiplier
    }
}

/// Ordered set of boost strategies.
#[derive(Default)]
pub struct Reranker {
    strategies: Vec<Box<dyn BoostStrategy>>,
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("Reranker").field("strategies", &names).finish()
    }
}

impl Reranker {
    /// Reranker with no strategies (keeps similarity order).
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy; strategies run in insertion order.
    pub fn with_strategy(mut self, strategy: impl BoostStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Build the exact-match and recency boosts enabled in config.
    ///
    /// Fails when the recency window is negative or too large to represent.
    pub fn from_config(config: &BoostConfig) -> Result<Self, String> {
        let mut reranker = Self::new();
        if config.exact_match {
            reranker = reranker.with_strategy(ExactMatchBoost::new(config.exact_match_factor));
        }
        if config.recency {
            let window = chrono::Duration::try_days(config.recency_window_days)
                .filter(|window| *window >= chrono::Duration::zero())
                .ok_or_else(|| {
                    format!(
                        "recency_window_days ({}) is out of range",
                        config.recency_window_days
                    )
                })?;
            reranker = reranker.with_strategy(RecencyBoost::new(config.recency_factor, window));
        }
        Ok(reranker)
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Boosted score for each chunk, aligned with `chunks`.
    ///
    /// A chunk without a raw score ranks last.
    pub fn boosted_scores(
        &self,
        chunks: &[String],
        scores: &[f32],
        query: &str,
        metadata: Option<&[Option<ChunkMetadata>]>,
    ) -> Vec<f32> {
        chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| {
                let raw = scores.get(i).copied().unwrap_or(f32::NEG_INFINITY);
                let meta = metadata.and_then(|m| m.get(i)).and_then(Option::as_ref);
                self.strategies.iter().fold(raw, |score, strategy| {
                    apply_multiplier(score, strategy.score_adjust(chunk, query, meta))
                })
            })
            .collect()
    }

    /// Indices into `chunks` in boosted order, each with its boosted score.
    ///
    /// Ties keep their incoming order.
    pub fn rank(
        &self,
        chunks: &[String],
        scores: &[f32],
        query: &str,
        metadata: Option<&[Option<ChunkMetadata>]>,
    ) -> Vec<(usize, f32)> {
        let boosted = self.boosted_scores(chunks, scores, query, metadata);

        let mut order: Vec<usize> = (0..chunks.len()).collect();
        order.sort_by(|&a, &b| boosted[b].total_cmp(&boosted[a]));

        tracing::trace!(target: "rerank", "boosted order {order:?} scores {boosted:?}");

        order.into_iter().map(|i| (i, boosted[i])).collect()
    }

    /// Reorder `chunks` by boosted score, highest first.
    ///
    /// `scores` are the raw similarities aligned with `chunks`. Without
    /// `metadata`, metadata-driven strategies (recency) are silently inactive.
    pub fn boost(
        &self,
        chunks: Vec<String>,
        scores: &[f32],
        query: &str,
        metadata: Option<&[Option<ChunkMetadata>]>,
    ) -> Vec<String> {
        let order = self.rank(&chunks, scores, query, metadata);

        let mut slots: Vec<Option<String>> = chunks.into_iter().map(Some).collect();
        order
            .into_iter()
            .filter_map(|(i, _)| slots[i].take())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_strategies_keeps_similarity_order() {
        let chunks = texts(&["b", "a", "c"]);
        let ranked = Reranker::new().boost(chunks, &[0.5, 0.9, 0.1], "", None);
        assert_eq!(ranked, texts(&["a", "b", "c"]));
    }

    #[test]
    fn test_exact_match_lifts_close_candidate() {
        let reranker = Reranker::from_config(&BoostConfig::default()).unwrap();
        let chunks = texts(&["parrots can talk", "cats are great"]);
        let ranked = reranker.boost(chunks, &[0.80, 0.78], "What do cats do?", None);
        assert_eq!(ranked[0], "cats are great");
    }

    #[test]
    fn test_boosts_compose_multiplicatively() {
        let reranker = Reranker::new()
            .with_strategy(ExactMatchBoost::new(1.1))
            .with_strategy(RecencyBoost::new(1.2, Duration::days(7)));
        let meta = ChunkMetadata {
            source: "a.pdf".into(),
            upload_time: Utc::now() - Duration::hours(1),
        };
        let scores = reranker.boosted_scores(
            &texts(&["cats nap"]),
            &[0.5],
            "cats",
            Some(&[Some(meta)][..]),
        );
        assert!((scores[0] - 0.5 * 1.1 * 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_recency_inactive_without_metadata() {
        let reranker = Reranker::new().with_strategy(RecencyBoost::new(1.2, Duration::days(7)));
        let scores = reranker.boosted_scores(&texts(&["x"]), &[0.5], "", None);
        assert_eq!(scores, vec![0.5]);
    }

    #[test]
    fn test_negative_scores_still_move_up() {
        let reranker = Reranker::new().with_strategy(ExactMatchBoost::new(1.1));
        let chunks = texts(&["unrelated", "cats"]);
        let ranked = reranker.boost(chunks, &[-0.10, -0.105], "cats", None);
        assert_eq!(ranked[0], "cats");
    }

    #[test]
    fn test_boost_never_lowers_rank_of_matching_chunk() {
        let chunks = texts(&["alpha", "beta cats", "gamma", "delta"]);
        let scores = [0.9, 0.33, 0.35, -0.2];

        let plain = Reranker::new().boost(chunks.clone(), &scores, "cats", None);
        let boosted = Reranker::new()
            .with_strategy(ExactMatchBoost::new(1.1))
            .boost(chunks, &scores, "cats", None);

        let rank = |list: &[String]| list.iter().position(|c| c == "beta cats").unwrap();
        assert!(rank(&boosted) <= rank(&plain));
        assert_eq!(rank(&boosted), 1);
    }

    #[test]
    fn test_ties_keep_incoming_order() {
        let chunks = texts(&["first", "second", "third"]);
        let ranked = Reranker::new().boost(chunks, &[0.5, 0.5, 0.5], "", None);
        assert_eq!(ranked, texts(&["first", "second", "third"]));
    }

    #[test]
    fn test_missing_scores_rank_last() {
        let chunks = texts(&["scored", "unscored"]);
        let ranked = Reranker::new().boost(chunks, &[-0.9], "", None);
        assert_eq!(ranked, texts(&["scored", "unscored"]));
    }

    #[test]
    fn test_rank_reports_boosted_scores() {
        let reranker = Reranker::new().with_strategy(ExactMatchBoost::new(2.0));
        let ranked = reranker.rank(&texts(&["dogs", "cats"]), &[0.4, 0.3], "cats", None);
        assert_eq!(ranked[0].0, 1);
        assert!((ranked[0].1 - 0.6).abs() < 1e-6);
        assert_eq!(ranked[1], (0, 0.4));
    }

    #[test]
    fn test_from_config_respects_flags() {
        let config = BoostConfig {
            recency: false,
            ..BoostConfig::default()
        };
        assert_eq!(
            Reranker::from_config(&config).unwrap().strategy_names(),
            vec!["exact_match"]
        );
        assert_eq!(
            Reranker::from_config(&BoostConfig::default())
                .unwrap()
                .strategy_names(),
            vec!["exact_match", "recency"]
        );
    }

    #[test]
    fn test_from_config_rejects_bad_recency_window() {
        for days in [i64::MAX, i64::MIN, -1] {
            let config = BoostConfig {
                recency_window_days: days,
                ..BoostConfig::default()
            };
            let err = Reranker::from_config(&config).unwrap_err();
            assert!(err.contains("recency_window_days"), "{err}");
        }

        // Unused when recency is off
        let config = BoostConfig {
            recency: false,
            recency_window_days: i64::MAX,
            ..BoostConfig::default()
        };
        assert!(Reranker::from_config(&config).is_ok());
    }
}

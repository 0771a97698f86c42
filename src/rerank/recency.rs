//! Upload-recency boost.

use chrono::{DateTime, Duration, Utc};

use super::BoostStrategy;
use crate::index::ChunkMetadata;

/// Boosts chunks uploaded within `window` of now (UTC).
///
/// Chunks without metadata are left alone rather than reported. That makes the
/// boost a silent no-op whenever the caller omits metadata.
#[derive(Debug, Clone)]
pub struct RecencyBoost {
    factor: f32,
    window: Duration,
    /// Fixed "now"; the wall clock is read per call when unset
    reference_time: Option<DateTime<Utc>>,
}

impl RecencyBoost {
    pub fn new(factor: f32, window: Duration) -> Self {
        Self {
            factor,
            window,
            reference_time: None,
        }
    }

    /// Pin the clock, for reproducible ranking.
    pub fn at(mut self, reference_time: DateTime<Utc>) -> Self {
        self.reference_time = Some(reference_time);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }
}

impl BoostStrategy for RecencyBoost {
    fn name(&self) -> &'static str {
        "recency"
    }

    fn score_adjust(&self, _candidate: &str, _query: &str, metadata: Option<&ChunkMetadata>) -> f32 {
        match metadata {
            Some(meta) if self.now() - meta.upload_time < self.window => self.factor,
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(upload_time: DateTime<Utc>) -> ChunkMetadata {
        ChunkMetadata {
            source: "notes.pdf".into(),
            upload_time,
        }
    }

    #[test]
    fn test_window_boundary() {
        let now = Utc::now();
        let boost = RecencyBoost::new(1.2, Duration::days(7)).at(now);

        let fresh = meta(now - Duration::days(6));
        let edge = meta(now - Duration::days(7));
        let stale = meta(now - Duration::days(30));

        assert_eq!(boost.score_adjust("", "", Some(&fresh)), 1.2);
        assert_eq!(boost.score_adjust("", "", Some(&edge)), 1.0);
        assert_eq!(boost.score_adjust("", "", Some(&stale)), 1.0);
    }

    #[test]
    fn test_missing_metadata_is_neutral() {
        let boost = RecencyBoost::new(1.2, Duration::days(7));
        assert_eq!(boost.score_adjust("text", "query", None), 1.0);
    }
}

//! In-memory vector index over chunk embeddings.
//!
//! Entries are append-only and addressed by their insertion position. The
//! vector, text and metadata stores always have the same length; an insert
//! either lands in all of them or in none.
//!
//! Not persisted: the index lives as long as the process. Removing a document
//! elsewhere does not retract its vectors, so stale chunks stay retrievable.

mod flat;

pub use flat::VectorIndex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Position reported for result slots that hold no entry.
pub const SENTINEL: i64 = -1;

/// Errors from index mutation.
///
/// These signal a caller bug. The index rejects the call before touching any
/// store, so the position invariant holds even when they surface.
#[derive(Error, Debug, PartialEq)]
pub enum IndexError {
    #[error("Got {vectors} vectors but {texts} texts")]
    LengthMismatch { vectors: usize, texts: usize },

    #[error("Got {expected} entries but {actual} metadata records")]
    MetadataMismatch { expected: usize, actual: usize },

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

pub type IndexResult<T> = Result<T, IndexError>;

/// Per-chunk metadata recorded at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// File name the chunk came from.
    pub source: String,
    /// When the parent document was uploaded.
    pub upload_time: DateTime<Utc>,
}

/// One result slot of a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Inner product with the query (cosine similarity).
    pub score: f32,
    /// Entry position, or [`SENTINEL`] for an unfilled slot.
    pub position: i64,
}

impl Neighbor {
    fn empty() -> Self {
        Self {
            score: f32::NEG_INFINITY,
            position: SENTINEL,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.position == SENTINEL
    }
}

/// The `k` slots of a search, best first.
///
/// Only filled slots are stored. Slots past the number of stored entries
/// carry [`SENTINEL`] and are produced on demand by [`SearchResults::slots`],
/// so a huge `k` costs nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    hits: Vec<Neighbor>,
    requested: usize,
}

impl SearchResults {
    pub(crate) fn new(mut hits: Vec<Neighbor>, requested: usize) -> Self {
        hits.truncate(requested);
        Self { hits, requested }
    }

    /// Filled slots only.
    pub fn hits(&self) -> impl Iterator<Item = &Neighbor> + '_ {
        self.hits.iter()
    }

    /// All `k` slots, filled ones first, then sentinels.
    pub fn slots(&self) -> impl Iterator<Item = Neighbor> + '_ {
        let padding = self.requested.saturating_sub(self.hits.len());
        self.hits
            .iter()
            .copied()
            .chain(std::iter::repeat_n(Neighbor::empty(), padding))
    }

    /// The `k` the search was asked for.
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Number of filled slots.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Scale `vector` to unit L2 norm in place. Zero vectors are left untouched.
pub fn normalize_l2(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
}

/// Inner product of two equal-length vectors.
pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

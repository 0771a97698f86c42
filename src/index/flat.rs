//! Exact (brute-force) inner-product index.

use parking_lot::RwLock;

use super::{
    ChunkMetadata, IndexError, IndexResult, Neighbor, SearchResults, inner_product, normalize_l2,
};

/// Stores guarded together so readers never see a partial insert.
#[derive(Debug, Default)]
struct Stores {
    /// Row-major, `dimension` floats per entry
    vectors: Vec<f32>,
    texts: Vec<String>,
    metadata: Vec<Option<ChunkMetadata>>,
}

impl Stores {
    fn len(&self) -> usize {
        self.texts.len()
    }
}

/// Flat cosine-similarity index with a parallel chunk-text store.
///
/// Shared across request tasks behind an `Arc`. One write lock covers a whole
/// insert call.
#[derive(Debug)]
pub struct VectorIndex {
    dimension: usize,
    stores: RwLock<Stores>,
}

impl VectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            stores: RwLock::new(Stores::default()),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.stores.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append vectors and their chunk texts without metadata.
    pub fn insert(&self, vectors: Vec<Vec<f32>>, texts: Vec<String>) -> IndexResult<()> {
        let metadata = vec![None; texts.len()];
        self.append(vectors, texts, metadata)
    }

    /// Append vectors, texts and per-chunk metadata.
    pub fn insert_with_metadata(
        &self,
        vectors: Vec<Vec<f32>>,
        texts: Vec<String>,
        metadata: Vec<ChunkMetadata>,
    ) -> IndexResult<()> {
        if metadata.len() != texts.len() {
            return Err(IndexError::MetadataMismatch {
                expected: texts.len(),
                actual: metadata.len(),
            });
        }
        self.append(vectors, texts, metadata.into_iter().map(Some).collect())
    }

    fn append(
        &self,
        vectors: Vec<Vec<f32>>,
        texts: Vec<String>,
        metadata: Vec<Option<ChunkMetadata>>,
    ) -> IndexResult<()> {
        if vectors.len() != texts.len() {
            return Err(IndexError::LengthMismatch {
                vectors: vectors.len(),
                texts: texts.len(),
            });
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimension) {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: bad.len(),
            });
        }

        let mut stores = self.stores.write();
        let first = stores.len();
        stores.vectors.reserve(vectors.len() * self.dimension);
        for mut vector in vectors {
            normalize_l2(&mut vector);
            stores.vectors.extend_from_slice(&vector);
        }
        stores.texts.extend(texts);
        stores.metadata.extend(metadata);
        debug_assert_eq!(stores.vectors.len(), stores.len() * self.dimension);
        debug_assert_eq!(stores.metadata.len(), stores.len());

        tracing::debug!(
            target: "index",
            "appended entries {first}..{} (dimension {})",
            stores.len(),
            self.dimension
        );
        Ok(())
    }

    /// Return the `k` entries with the highest cosine similarity to `query`.
    ///
    /// Holds at most `min(k, len)` hits; the remaining slots are sentinels.
    /// A query of the wrong width matches nothing.
    pub fn search(&self, query: &[f32], k: usize) -> SearchResults {
        if k == 0 || self.dimension == 0 {
            return SearchResults::new(Vec::new(), k);
        }
        if query.len() != self.dimension {
            tracing::warn!(
                target: "index",
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dimension
            );
            return SearchResults::new(Vec::new(), k);
        }

        let mut query = query.to_vec();
        normalize_l2(&mut query);

        let stores = self.stores.read();
        let mut scored: Vec<Neighbor> = stores
            .vectors
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, vector)| Neighbor {
                score: inner_product(&query, vector),
                position: position as i64,
            })
            .collect();
        drop(stores);

        // Stable: ties keep insertion order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        SearchResults::new(scored, k)
    }

    /// Chunk text at `position`, or an empty string for any position outside
    /// `[0, len)`.
    pub fn get_text(&self, position: i64) -> String {
        let stores = self.stores.read();
        usize::try_from(position)
            .ok()
            .and_then(|p| stores.texts.get(p))
            .cloned()
            .unwrap_or_default()
    }

    /// Metadata at `position`, if any was recorded. Same lenient policy as
    /// [`VectorIndex::get_text`].
    pub fn metadata(&self, position: i64) -> Option<ChunkMetadata> {
        let stores = self.stores.read();
        usize::try_from(position)
            .ok()
            .and_then(|p| stores.metadata.get(p))
            .cloned()
            .flatten()
    }

    /// Copy of the stored (normalized) vector at `position`.
    pub fn vector(&self, position: i64) -> Option<Vec<f32>> {
        let stores = self.stores.read();
        let p = usize::try_from(position).ok().filter(|p| *p < stores.len())?;
        let start = p * self.dimension;
        Some(stores.vectors[start..start + self.dimension].to_vec())
    }

    /// Counts of the vector and text stores.
    pub fn store_counts(&self) -> (usize, usize) {
        let stores = self.stores.read();
        (stores.vectors.len() / self.dimension.max(1), stores.texts.len())
    }
}

//! Text embedding for chunks and queries.
//!
//! The [`Embedder`] trait is the seam between the pipeline and the model.
//! [`FastEmbedder`] is the production implementation on top of fastembed.

mod model;

pub use model::{FastEmbedder, parse_model};

// Re-export key types
pub use fastembed::EmbeddingModel;

/// Error type for embedding operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Failed to initialize embedding model: {0}")]
    ModelInit(String),

    #[error("Unknown embedding model '{0}'")]
    UnknownModel(String),

    #[error("Failed to generate embedding: {0}")]
    Generation(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Model returned {actual} embeddings for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },
}

pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Turns text into fixed-width dense vectors.
///
/// Implementations must be deterministic for a given model and return one
/// vector of width [`Embedder::dimension`] per input, in input order.
pub trait Embedder: Send + Sync {
    /// Embed all texts in a single batch.
    fn embed(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>>;

    /// Width of every produced vector.
    fn dimension(&self) -> usize;
}

/// Embed a single query string.
pub fn embed_one(embedder: &dyn Embedder, text: &str) -> EmbeddingResult<Vec<f32>> {
    let mut vectors = embedder.embed(&[text.to_string()])?;
    if vectors.len() != 1 {
        return Err(EmbeddingError::CountMismatch {
            expected: 1,
            actual: vectors.len(),
        });
    }
    Ok(vectors.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEmbedder(Vec<Vec<f32>>);

    impl Embedder for FixedEmbedder {
        fn embed(&self, _texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
            Ok(self.0.clone())
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    #[test]
    fn test_embed_one_returns_single_vector() {
        let embedder = FixedEmbedder(vec![vec![0.5, 0.5]]);
        assert_eq!(embed_one(&embedder, "hello").unwrap(), vec![0.5, 0.5]);
    }

    #[test]
    fn test_embed_one_rejects_wrong_count() {
        let embedder = FixedEmbedder(vec![]);
        let err = embed_one(&embedder, "hello").unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::CountMismatch {
                expected: 1,
                actual: 0
            }
        ));
    }
}

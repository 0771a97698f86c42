//! Pipeline error type.

use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::index::IndexError;
use crate::llm::CompletionError;

/// Failure of one pipeline run. Sub-step errors pass through unchanged.
///
/// Searching an empty index is not an error; it yields zero chunks.
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Completion failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("Background task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

pub type RagResult<T> = Result<T, RagError>;

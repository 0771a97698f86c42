//! Ingestion: extract, chunk, embed and index uploaded documents.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use super::chunker::TextChunker;
use super::pdf::{extract_pdf_text, is_pdf_file_name};
use super::{IngestError, IngestResult};
use crate::embedding::Embedder;
use crate::index::{ChunkMetadata, VectorIndex};

/// Outcome of ingesting one document.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IngestReport {
    /// File name or other label the chunks came from
    pub source: String,
    /// Chunks in document order
    pub chunks: Vec<String>,
    /// Whether the chunks were embedded and added to the index
    pub stored: bool,
}

/// Feeds documents into a shared [`VectorIndex`].
pub struct Ingestor {
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
    chunker: TextChunker,
}

impl std::fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("chunker", &self.chunker)
            .field("indexed_chunks", &self.index.len())
            .finish()
    }
}

impl Ingestor {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<VectorIndex>, chunker: TextChunker) -> Self {
        Self {
            embedder,
            index,
            chunker,
        }
    }

    pub fn chunker(&self) -> &TextChunker {
        &self.chunker
    }

    /// Ingest an uploaded PDF.
    ///
    /// Only `.pdf` file names are accepted. Extraction runs on the blocking
    /// pool. With `do_not_store` the chunks are returned but never indexed.
    pub async fn ingest_pdf(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        do_not_store: bool,
    ) -> IngestResult<IngestReport> {
        if !is_pdf_file_name(file_name) {
            return Err(IngestError::UnsupportedFileType(file_name.to_string()));
        }

        let text = tokio::task::spawn_blocking(move || extract_pdf_text(&bytes)).await??;
        if text.trim().is_empty() {
            tracing::warn!(target: "documents", "'{file_name}' has no extractable text");
        }

        self.ingest_text(file_name, &text, do_not_store).await
    }

    /// Chunk `text` and, unless `do_not_store`, embed and index the chunks.
    pub async fn ingest_text(
        &self,
        source: &str,
        text: &str,
        do_not_store: bool,
    ) -> IngestResult<IngestReport> {
        let chunks = self.chunker.split(text);
        let stored = !do_not_store && !chunks.is_empty();

        if stored {
            let embedder = Arc::clone(&self.embedder);
            let batch = chunks.clone();
            let vectors = tokio::task::spawn_blocking(move || embedder.embed(&batch)).await??;

            let upload_time = Utc::now();
            let metadata = vec![
                ChunkMetadata {
                    source: source.to_string(),
                    upload_time,
                };
                chunks.len()
            ];
            self.index
                .insert_with_metadata(vectors, chunks.clone(), metadata)?;
        }

        tracing::info!(
            target: "documents",
            "ingested '{source}': {} chunks, stored: {stored}",
            chunks.len()
        );

        Ok(IngestReport {
            source: source.to_string(),
            chunks,
            stored,
        })
    }
}

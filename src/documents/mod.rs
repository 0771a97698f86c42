//! Document ingestion for retrieval.
//!
//! This module provides:
//! - PDF text extraction
//! - Separator-based chunking with overlap
//! - Embedding and indexing of chunks with source metadata

pub mod chunker;
pub mod config;
pub mod ingest;
pub mod pdf;

pub use chunker::TextChunker;
pub use config::ChunkingConfig;
pub use ingest::{IngestReport, Ingestor};
pub use pdf::{extract_pdf_text, is_pdf_file_name};

use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::index::IndexError;

/// Errors raised while turning an uploaded document into indexed chunks.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Only PDF files are supported, got '{0}'")]
    UnsupportedFileType(String),

    #[error("Uploaded file is empty")]
    EmptyFile,

    #[error("Failed to extract PDF text: {0}")]
    PdfExtraction(String),

    #[error("Invalid chunking configuration: {0}")]
    InvalidChunking(String),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Background task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

impl IngestError {
    /// Whether the error was caused by the uploaded input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFileType(_) | Self::EmptyFile | Self::PdfExtraction(_)
        )
    }
}

pub type IngestResult<T> = Result<T, IngestError>;

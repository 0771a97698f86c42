//! Component wiring shared by the CLI and the HTTP server.

use std::sync::Arc;

use thiserror::Error;

use crate::config::Settings;
use crate::documents::{IngestError, Ingestor, TextChunker};
use crate::embedding::{Embedder, EmbeddingError, FastEmbedder};
use crate::index::VectorIndex;
use crate::llm::{CompletionError, CompletionService, OpenRouterClient};
use crate::rag::RagPipeline;
use crate::rerank::Reranker;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Embedding model unavailable: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Completion service unavailable: {0}")]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Invalid retrieval.boost settings: {0}")]
    InvalidBoost(String),

    #[error(
        "Embedding model produces {model}-dimension vectors but index.dimension is {configured}"
    )]
    DimensionMismatch { configured: usize, model: usize },
}

/// One index plus the pipeline and ingestor that share it.
#[derive(Debug, Clone)]
pub struct App {
    index: Arc<VectorIndex>,
    pipeline: Arc<RagPipeline>,
    ingestor: Arc<Ingestor>,
}

impl App {
    /// Load the embedding model and LLM client named in `settings`.
    ///
    /// Blocks while the model is downloaded or loaded.
    pub fn from_settings(settings: &Settings) -> Result<Self, StartupError> {
        let embedder = Arc::new(FastEmbedder::from_config(&settings.embedding)?);
        let completion = Arc::new(OpenRouterClient::from_config(&settings.llm)?);
        Self::with_services(settings, embedder, completion)
    }

    /// Wire an empty index around the given embedder and completion service.
    pub fn with_services(
        settings: &Settings,
        embedder: Arc<dyn Embedder>,
        completion: Arc<dyn CompletionService>,
    ) -> Result<Self, StartupError> {
        if embedder.dimension() != settings.index.dimension {
            return Err(StartupError::DimensionMismatch {
                configured: settings.index.dimension,
                model: embedder.dimension(),
            });
        }

        let index = Arc::new(VectorIndex::new(settings.index.dimension));
        let chunker = TextChunker::new(settings.chunking.clone())?;
        let reranker =
            Reranker::from_config(&settings.retrieval.boost).map_err(StartupError::InvalidBoost)?;

        crate::debug_event!(
            "app",
            "wired",
            "dimension {}, boosts {:?}, top_k {}",
            settings.index.dimension,
            reranker.strategy_names(),
            settings.retrieval.top_k
        );

        let ingestor = Arc::new(Ingestor::new(
            Arc::clone(&embedder),
            Arc::clone(&index),
            chunker,
        ));
        let pipeline = Arc::new(
            RagPipeline::new(embedder, Arc::clone(&index), reranker, completion)
                .with_default_top_k(settings.retrieval.top_k),
        );

        Ok(Self {
            index,
            pipeline,
            ingestor,
        })
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    pub fn pipeline(&self) -> &Arc<RagPipeline> {
        &self.pipeline
    }

    pub fn ingestor(&self) -> &Arc<Ingestor> {
        &self.ingestor
    }
}

//! fastembed-backed embedder.

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;

use super::{Embedder, EmbeddingError, EmbeddingResult};
use crate::config::EmbeddingConfig;

/// Map a configured model name to a fastembed model.
///
/// Only 384-dimension sentence models are accepted so the index width stays fixed.
pub fn parse_model(name: &str) -> EmbeddingResult<EmbeddingModel> {
    match name {
        "AllMiniLML6V2" | "all-MiniLM-L6-v2" | "sentence-transformers/all-MiniLM-L6-v2" => {
            Ok(EmbeddingModel::AllMiniLML6V2)
        }
        "AllMiniLML12V2" | "all-MiniLM-L12-v2" => Ok(EmbeddingModel::AllMiniLML12V2),
        "BGESmallENV15" | "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        other => Err(EmbeddingError::UnknownModel(other.to_string())),
    }
}

/// Sentence embedder running a local ONNX model.
pub struct FastEmbedder {
    /// fastembed needs `&mut` to embed
    model: Mutex<TextEmbedding>,
    dimensions: usize,
    batch_size: Option<usize>,
    model_name: String,
}

impl FastEmbedder {
    /// Load the model named in config, downloading it on first use.
    pub fn from_config(config: &EmbeddingConfig) -> EmbeddingResult<Self> {
        let model = parse_model(&config.model)?;
        let cache_dir = config.effective_cache_dir();

        tracing::info!(
            target: "embedding",
            "loading embedding model {} (cache: {})",
            config.model,
            cache_dir.display()
        );

        let mut text_model = TextEmbedding::try_new(
            InitOptions::new(model)
                .with_cache_dir(cache_dir)
                .with_show_download_progress(config.show_download_progress),
        )
        .map_err(|e| EmbeddingError::ModelInit(e.to_string()))?;

        // Probe the output width once
        let probe = text_model
            .embed(vec!["test"], None)
            .map_err(|e| EmbeddingError::Generation(e.to_string()))?;
        let dimensions = probe
            .into_iter()
            .next()
            .map(|v| v.len())
            .ok_or_else(|| EmbeddingError::ModelInit("model produced no probe embedding".into()))?;

        tracing::info!(target: "embedding", "embedding model ready: {dimensions} dimensions");

        Ok(Self {
            model: Mutex::new(text_model),
            dimensions,
            batch_size: config.batch_size,
            model_name: config.model.clone(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl Embedder for FastEmbedder {
    fn embed(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self
            .model
            .lock()
            .embed(texts, self.batch_size)
            .map_err(|e| EmbeddingError::Generation(e.to_string()))?;

        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: embeddings.len(),
            });
        }
        if let Some(bad) = embeddings.iter().find(|v| v.len() != self.dimensions) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimensions,
                actual: bad.len(),
            });
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimensions
    }
}

//! Question answering over uploaded PDF documents.
//!
//! Documents are chunked and embedded into an in-memory vector index. A query
//! is embedded with the same model, its nearest chunks are re-ranked and
//! formatted into a numbered context, and an LLM answers from that context.

pub mod app;
pub mod cli;
pub mod config;
pub mod documents;
pub mod embedding;
pub mod index;
pub mod llm;
pub mod logging;
pub mod rag;
pub mod rerank;
pub mod server;
pub mod sessions;

pub use app::{App, StartupError};
pub use config::Settings;
pub use documents::{IngestError, IngestReport, Ingestor, TextChunker};
pub use embedding::{Embedder, EmbeddingError, FastEmbedder};
pub use index::{ChunkMetadata, IndexError, SENTINEL, SearchResults, VectorIndex};
pub use llm::{CompletionError, CompletionService, OpenRouterClient};
pub use rag::{RagError, RagPipeline, RankedChunk, build_prompt, format_context};
pub use rerank::{BoostStrategy, Reranker};
pub use sessions::{InMemorySessionStore, SessionStore};

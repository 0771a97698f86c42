//! Retrieval-augmented generation over the vector index.

pub mod context;
mod error;
mod pipeline;

pub use context::{build_prompt, format_context};
pub use error::{RagError, RagResult};
pub use pipeline::{DEFAULT_TOP_K, MAX_TOP_K, RagPipeline, RankedChunk};

//! Text completion collaborator.
//!
//! The pipeline only needs `prompt -> text`. [`OpenRouterClient`] speaks the
//! OpenAI-compatible chat completions protocol; tests plug in stubs.

mod openrouter;

pub use openrouter::OpenRouterClient;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a completion call. None are retried.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("API key not set (expected in ${0})")]
    MissingApiKey(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Completion service rejected credentials ({status})")]
    Unauthorized { status: u16 },

    #[error("Completion service rate limit hit")]
    RateLimited,

    #[error("Completion service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),
}

pub type CompletionResult<T> = Result<T, CompletionError>;

/// Opaque remote text completion.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Complete `prompt`, returning the model's text verbatim.
    async fn complete(&self, prompt: &str) -> CompletionResult<String>;
}

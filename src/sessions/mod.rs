//! Chat sessions, message history and uploaded-document records.
//!
//! The retrieval pipeline never reads from here; the HTTP layer records
//! conversations and uploads through the [`SessionStore`] trait.

mod memory;

pub use memory::InMemorySessionStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SessionError {
    #[error("Session '{0}' not found")]
    NotFound(String),

    #[error("Session store unavailable: {0}")]
    Backend(String),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Active,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: String,
    pub user_id: Option<String>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

/// Author of a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::System => write!(f, "system"),
        }
    }
}

/// Kind of content carried by a plain message.
pub const TEXT_MESSAGE: &str = "text";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub content: String,
    pub role: Role,
    pub message_type: String,
    pub created_at: DateTime<Utc>,
}

/// Uploaded document as recorded for a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentRecord {
    pub id: String,
    pub session_id: Option<String>,
    pub file_name: String,
    pub file_url: Option<String>,
    pub do_not_store: bool,
    pub chunk_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when recording an upload.
#[derive(Debug, Clone, Default)]
pub struct NewDocument {
    pub session_id: Option<String>,
    pub file_name: String,
    pub file_url: Option<String>,
    pub do_not_store: bool,
    pub chunk_count: usize,
}

/// Persistence for sessions, their messages and their documents.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, user_id: Option<String>) -> SessionResult<Session>;

    async fn get_session(&self, id: &str) -> SessionResult<Option<Session>>;

    /// All sessions, newest first.
    async fn list_sessions(&self) -> SessionResult<Vec<Session>>;

    /// Append a message to an existing session.
    async fn append_message(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        message_type: &str,
    ) -> SessionResult<Message>;

    /// Messages of one session in the order they were appended.
    async fn messages(&self, session_id: &str) -> SessionResult<Vec<Message>>;

    /// Record an upload. A document may belong to no session.
    async fn record_document(&self, document: NewDocument) -> SessionResult<DocumentRecord>;

    /// Documents of one session, or all documents when `session_id` is `None`.
    async fn documents(&self, session_id: Option<&str>) -> SessionResult<Vec<DocumentRecord>>;
}

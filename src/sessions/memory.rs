//! Process-local session store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{
    DocumentRecord, Message, NewDocument, Role, Session, SessionError, SessionResult,
    SessionStatus, SessionStore,
};

#[derive(Debug, Default)]
struct Tables {
    /// Creation order
    sessions: Vec<Session>,
    messages: HashMap<String, Vec<Message>>,
    documents: Vec<DocumentRecord>,
}

impl Tables {
    fn has_session(&self, id: &str) -> bool {
        self.sessions.iter().any(|s| s.id == id)
    }
}

/// [`SessionStore`] held in memory; contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    tables: RwLock<Tables>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(&self, user_id: Option<String>) -> SessionResult<Session> {
        let session = Session {
            id: new_id(),
            user_id,
            status: SessionStatus::Active,
            created_at: Utc::now(),
        };
        self.tables.write().sessions.push(session.clone());
        tracing::debug!(target: "sessions", "created session {}", session.id);
        Ok(session)
    }

    async fn get_session(&self, id: &str) -> SessionResult<Option<Session>> {
        Ok(self
            .tables
            .read()
            .sessions
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn list_sessions(&self) -> SessionResult<Vec<Session>> {
        Ok(self.tables.read().sessions.iter().rev().cloned().collect())
    }

    async fn append_message(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        message_type: &str,
    ) -> SessionResult<Message> {
        let mut tables = self.tables.write();
        if !tables.has_session(session_id) {
            return Err(SessionError::NotFound(session_id.to_string()));
        }

        let message = Message {
            id: new_id(),
            session_id: session_id.to_string(),
            content: content.to_string(),
            role,
            message_type: message_type.to_string(),
            created_at: Utc::now(),
        };
        tables
            .messages
            .entry(session_id.to_string())
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn messages(&self, session_id: &str) -> SessionResult<Vec<Message>> {
        let tables = self.tables.read();
        if !tables.has_session(session_id) {
            return Err(SessionError::NotFound(session_id.to_string()));
        }
        Ok(tables
            .messages
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn record_document(&self, document: NewDocument) -> SessionResult<DocumentRecord> {
        let mut tables = self.tables.write();
        if let Some(session_id) = document
            .session_id
            .as_deref()
            .filter(|id| !tables.has_session(id))
        {
            return Err(SessionError::NotFound(session_id.to_string()));
        }

        let record = DocumentRecord {
            id: new_id(),
            session_id: document.session_id,
            file_name: document.file_name,
            file_url: document.file_url,
            do_not_store: document.do_not_store,
            chunk_count: document.chunk_count,
            created_at: Utc::now(),
        };
        tables.documents.push(record.clone());
        Ok(record)
    }

    async fn documents(&self, session_id: Option<&str>) -> SessionResult<Vec<DocumentRecord>> {
        Ok(self
            .tables
            .read()
            .documents
            .iter()
            .filter(|d| session_id.is_none() || d.session_id.as_deref() == session_id)
            .cloned()
            .collect())
    }
}

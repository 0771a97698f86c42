//! Route handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use super::AppState;
use super::error::{ApiError, ApiResult};
use crate::documents::is_pdf_file_name;
use crate::rag::MAX_TOP_K;
use crate::sessions::{DocumentRecord, Message, NewDocument, Role, Session, TEXT_MESSAGE};

/// Chunks echoed back after an upload.
const CHUNK_SAMPLE_SIZE: usize = 3;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub indexed_chunks: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        indexed_chunks: state.app.index().len(),
    })
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    pub top_k: Option<usize>,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

fn require_query(query: &str) -> ApiResult<()> {
    if query.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }
    Ok(())
}

/// Treat an empty `session_id` the same as an absent one.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn rag_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    require_query(&request.query)?;
    let pipeline = state.app.pipeline();
    let top_k = request.top_k.unwrap_or(pipeline.default_top_k());
    if top_k > MAX_TOP_K {
        return Err(ApiError::BadRequest(format!(
            "top_k must be at most {MAX_TOP_K}"
        )));
    }
    let session_id = non_empty(request.session_id);

    let answer = pipeline
        .answer(&request.query, top_k, session_id.as_deref())
        .await?;
    Ok(Json(ChatResponse { answer }))
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub user_id: Option<String>,
}

/// The body is optional; an empty one creates an anonymous session.
pub async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Session>)> {
    let request: CreateSessionRequest = if body.is_empty() {
        CreateSessionRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid session request: {e}")))?
    };

    let session = state
        .sessions
        .create_session(non_empty(request.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn list_sessions(State(state): State<AppState>) -> ApiResult<Json<Vec<Session>>> {
    Ok(Json(state.sessions.list_sessions().await?))
}

pub async fn session_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Vec<Message>>> {
    Ok(Json(state.sessions.messages(&session_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct SessionMessageRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct AssistantMessage {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub content: String,
    pub session_id: String,
}

/// Record the question, answer it, record the answer.
pub async fn post_session_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SessionMessageRequest>,
) -> ApiResult<Json<AssistantMessage>> {
    require_query(&request.query)?;

    state
        .sessions
        .append_message(&session_id, Role::User, &request.query, TEXT_MESSAGE)
        .await?;

    let pipeline = state.app.pipeline();
    let answer = pipeline
        .answer(&request.query, pipeline.default_top_k(), Some(&session_id))
        .await?;

    state
        .sessions
        .append_message(&session_id, Role::Assistant, &answer, TEXT_MESSAGE)
        .await?;

    Ok(Json(AssistantMessage {
        kind: "assistant_message",
        content: answer,
        session_id,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub file_name: String,
    pub session_id: Option<String>,
    #[serde(default)]
    pub do_not_store: bool,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub chunks_sample: Vec<String>,
}

/// Ingest one PDF sent as the raw request body.
pub async fn upload_document(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> ApiResult<Json<UploadResponse>> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("No file uploaded".to_string()));
    }
    if !is_pdf_file_name(&params.file_name) {
        return Err(ApiError::BadRequest("Only PDF files supported".to_string()));
    }

    let session_id = non_empty(params.session_id);
    if let Some(id) = session_id.as_deref() {
        state
            .sessions
            .get_session(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Session '{id}' not found")))?;
    }

    let report = state
        .app
        .ingestor()
        .ingest_pdf(&params.file_name, body.to_vec(), params.do_not_store)
        .await?;

    state
        .sessions
        .record_document(NewDocument {
            session_id,
            file_name: params.file_name,
            file_url: None,
            do_not_store: params.do_not_store,
            chunk_count: report.chunks.len(),
        })
        .await?;

    crate::log_event!(
        "http",
        "uploaded",
        "{} ({} chunks, stored: {})",
        report.source,
        report.chunks.len(),
        report.stored
    );

    let chunk_count = report.chunks.len();
    Ok(Json(UploadResponse {
        message: format!("1 files uploaded, {chunk_count} chunks processed"),
        chunks_sample: report.chunks.into_iter().take(CHUNK_SAMPLE_SIZE).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct DocumentFilter {
    pub session_id: Option<String>,
}

pub async fn list_documents(
    State(state): State<AppState>,
    Query(filter): Query<DocumentFilter>,
) -> ApiResult<Json<Vec<DocumentRecord>>> {
    let session_id = non_empty(filter.session_id);
    Ok(Json(state.sessions.documents(session_id.as_deref()).await?))
}

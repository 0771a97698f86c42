//! HTTP API over the question-answering pipeline.
//!
//! JSON routes for chat, sessions and document upload. Uploads carry the raw
//! PDF bytes as the request body with metadata in the query string.

#[cfg(feature = "http-server")]
mod error;
#[cfg(feature = "http-server")]
mod handlers;

#[cfg(feature = "http-server")]
pub use error::{ApiError, ApiResult};

#[cfg(feature = "http-server")]
pub use routes::{AppState, router};

#[cfg(feature = "http-server")]
mod routes {
    use std::sync::Arc;

    use axum::Router;
    use axum::extract::DefaultBodyLimit;
    use axum::routing::{get, post};
    use tower::ServiceBuilder;
    use tower_http::cors::CorsLayer;

    use super::handlers;
    use crate::app::App;
    use crate::config::ServerConfig;
    use crate::sessions::SessionStore;

    /// Shared handler state.
    #[derive(Clone)]
    pub struct AppState {
        pub app: App,
        pub sessions: Arc<dyn SessionStore>,
    }

    impl AppState {
        pub fn new(app: App, sessions: Arc<dyn SessionStore>) -> Self {
            Self { app, sessions }
        }
    }

    /// Build the API router.
    pub fn router(state: AppState, config: &ServerConfig) -> Router {
        let layers = ServiceBuilder::new()
            .layer(DefaultBodyLimit::max(config.max_upload_bytes))
            .option_layer(config.cors.then(CorsLayer::permissive));

        Router::new()
            .route("/health", get(handlers::health))
            .route("/rag/chat", post(handlers::rag_chat))
            .route(
                "/sessions",
                get(handlers::list_sessions).post(handlers::create_session),
            )
            .route(
                "/sessions/{id}/messages",
                get(handlers::session_messages).post(handlers::post_session_message),
            )
            .route("/documents", get(handlers::list_documents))
            .route("/documents/upload", post(handlers::upload_document))
            .layer(layers)
            .with_state(state)
    }
}

/// Load the model, wire the pipeline and serve until Ctrl+C.
#[cfg(feature = "http-server")]
pub async fn serve_http(settings: crate::Settings, bind: String) -> anyhow::Result<()> {
    use std::sync::Arc;

    use crate::app::App;
    use crate::sessions::InMemorySessionStore;

    crate::log_event!("http", "starting", "loading model {}", settings.embedding.model);

    let model_settings = settings.clone();
    let app = tokio::task::spawn_blocking(move || App::from_settings(&model_settings)).await??;
    let state = AppState::new(app, Arc::new(InMemorySessionStore::new()));
    let router = router(state, &settings.server);

    async fn shutdown_signal() {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("[http] failed to listen for ctrl+c: {e}");
            std::future::pending::<()>().await;
        }
        crate::log_event!("http", "stopping");
    }

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    crate::log_event!("http", "listening", "http://{bind}");
    eprintln!("Elara API listening on http://{bind}");
    eprintln!("Press Ctrl+C to stop the server");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    eprintln!("HTTP server shut down gracefully");
    Ok(())
}

#[cfg(not(feature = "http-server"))]
pub async fn serve_http(_settings: crate::Settings, _bind: String) -> anyhow::Result<()> {
    anyhow::bail!("HTTP server support is not compiled in; rebuild with --features http-server")
}

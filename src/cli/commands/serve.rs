//! Serve command - HTTP API.

use crate::config::Settings;

/// Run the HTTP server, preferring `bind` over `server.bind`.
pub async fn run(bind: Option<String>, config: Settings) -> anyhow::Result<()> {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    crate::server::serve_http(config, bind).await
}

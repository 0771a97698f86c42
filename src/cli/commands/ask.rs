//! Ask command - one-shot question answering over local PDFs.

use std::path::PathBuf;

use anyhow::Context;

use crate::app::App;
use crate::config::Settings;

pub struct AskArgs {
    pub files: Vec<PathBuf>,
    pub question: String,
    pub top_k: Option<usize>,
    pub show_context: bool,
}

/// Ingest `files` into a fresh index, then answer the question.
pub async fn run(args: AskArgs, config: Settings) -> anyhow::Result<()> {
    let model_config = config.clone();
    let app = tokio::task::spawn_blocking(move || App::from_settings(&model_config)).await??;

    for file in &args.files {
        let bytes = tokio::fs::read(file)
            .await
            .with_context(|| format!("reading {}", file.display()))?;
        let file_name = file
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();

        let report = app.ingestor().ingest_pdf(&file_name, bytes, false).await?;
        eprintln!("Indexed {}: {} chunks", report.source, report.chunks.len());
    }

    let pipeline = app.pipeline();
    let top_k = args.top_k.unwrap_or(pipeline.default_top_k());

    if !args.show_context {
        let answer = pipeline.answer(&args.question, top_k, None).await?;
        println!("{answer}");
        return Ok(());
    }

    let chunks = pipeline.retrieve(&args.question, top_k).await?;
    for (rank, chunk) in chunks.iter().enumerate() {
        eprintln!(
            "[{}] #{} score {:.4} (boosted {:.4})",
            rank + 1,
            chunk.position,
            chunk.score,
            chunk.boosted_score
        );
        eprintln!("{}", chunk.text);
    }
    eprintln!("{}", "=".repeat(50));

    let answer = pipeline.answer_from(&args.question, &chunks).await?;
    println!("{answer}");
    Ok(())
}

//! Chunk command - preview how a PDF or text file is chunked.

use std::path::Path;

use anyhow::Context;

use crate::config::Settings;
use crate::documents::{TextChunker, extract_pdf_text, is_pdf_file_name};

/// Text of `file`: extracted for `.pdf` names, read as UTF-8 otherwise.
fn load_text(file: &Path, bytes: Vec<u8>) -> anyhow::Result<String> {
    let name = file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    if is_pdf_file_name(name) {
        return Ok(extract_pdf_text(&bytes)?);
    }
    String::from_utf8(bytes).with_context(|| format!("{} is not UTF-8 text", file.display()))
}

/// Extract `file` and print every chunk with its character count.
pub fn run(file: &Path, config: &Settings) -> anyhow::Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let text = load_text(file, bytes)?;
    let chunker = TextChunker::new(config.chunking.clone())?;
    let chunks = chunker.split(&text);

    println!(
        "{}: {} characters, {} chunks (size {}, overlap {})",
        file.display(),
        text.chars().count(),
        chunks.len(),
        chunker.config().chunk_size,
        chunker.config().chunk_overlap
    );
    for (i, chunk) in chunks.iter().enumerate() {
        println!("\n--- chunk {} ({} chars) ---", i + 1, chunk.chars().count());
        println!("{chunk}");
    }
    Ok(())
}

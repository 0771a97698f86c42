//! CLI argument parsing using clap.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

const AFTER_HELP: &str = "\
Quick Start:
  $ elara init                                  # Write .elara/settings.toml
  $ elara chunk report.pdf                      # Preview how a PDF is chunked
  $ elara ask --file report.pdf \"What changed?\" # One-shot question over PDFs
  $ elara serve --bind 0.0.0.0:8000             # Start the HTTP API

The LLM key is read from the variable named by llm.api_key_env
(OPENROUTER_API_KEY by default).";

/// Question answering over PDF documents
#[derive(Parser, Debug)]
#[command(
    name = "elara",
    version = env!("CARGO_PKG_VERSION"),
    about = "Question answering over PDF documents",
    long_about = "Chunk and embed PDF documents, then answer questions about them with a retrieval-augmented LLM prompt.",
    next_line_help = true,
    styles = clap_cargo_style(),
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize project
    #[command(about = "Set up .elara directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    #[command(about = "Display active settings")]
    Config,

    /// Print the chunks a PDF or text file would be split into
    #[command(about = "Extract and chunk a PDF or text file without embedding it")]
    Chunk {
        /// PDF or UTF-8 text file to chunk
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Ingest PDFs into a fresh index and answer one question
    #[command(about = "Answer a question over one or more PDF files")]
    Ask {
        /// PDF files to ingest before answering
        #[arg(short, long = "file", value_name = "PDF", required = true)]
        files: Vec<PathBuf>,

        /// Question to answer
        question: String,

        /// Number of chunks to retrieve (overrides config)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print the retrieved chunks and their scores
        #[arg(long)]
        show_context: bool,
    },

    /// Start the HTTP API
    #[command(about = "Serve the question-answering HTTP API")]
    Serve {
        /// Bind address (overrides server.bind)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
}

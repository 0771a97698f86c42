use clap::Parser;

use elara::cli::commands::ask::AskArgs;
use elara::cli::{Cli, Commands, commands};
use elara::{Settings, logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Commands::Init { force } = cli.command {
        commands::init::run_init(force);
        return;
    }

    // Load configuration
    let loaded = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let config = loaded.unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    logging::init_with_config(&config.logging);

    let result = match cli.command {
        Commands::Init { .. } => unreachable!("handled above"),
        Commands::Config => {
            commands::init::run_config(&config);
            Ok(())
        }
        Commands::Chunk { file } => commands::chunk::run(&file, &config),
        Commands::Ask {
            files,
            question,
            top_k,
            show_context,
        } => {
            let args = AskArgs {
                files,
                question,
                top_k,
                show_context,
            };
            commands::ask::run(args, config).await
        }
        Commands::Serve { bind } => commands::serve::run(bind, config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

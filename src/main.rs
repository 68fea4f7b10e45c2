//! Highlighter
//!
//! Assembles a short highlight video from a long recorded talk.
//!
//! # Usage
//!
//! ```bash
//! highlighter generate --input talk.mp4
//! highlighter generate --input talk.mp4 --artifacts artifacts/talk --dry-run
//! highlighter batch --input-dir talks/ --artifacts artifacts/ --resume
//! highlighter retry-failed --input-dir talks/ --results batch_summaries.json
//! highlighter detect
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use highlight_reel::app::DefaultAppContainer;
use highlight_reel::cli::{commands, Cli, Commands};
use highlight_reel::config::HighlightConfig;
use highlight_reel::utils::logging::{init_logging, log_system_info};

/// Main entry point for the highlighter CLI
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format);
    log_system_info();

    let config = HighlightConfig::load(
        cli.config.as_deref(),
        |key| std::env::var(key).ok(),
        &cli.overrides.to_overrides(),
    )
    .context("Invalid configuration")?;
    let container = DefaultAppContainer::new(config.clone(), cli.log_format)
        .context("Could not set up adapters")?;

    let succeeded = match cli.command {
        Commands::Generate(args) => commands::generate(&container, args).await?,
        Commands::Batch(args) => commands::batch(&container, args).await?,
        Commands::RetryFailed(args) => commands::retry_failed(&container, args).await?,
        Commands::Detect => commands::detect(&container, config.hardware_enabled).await?,
    };

    if !succeeded {
        error!("Finished with errors");
        std::process::exit(1);
    }
    info!("Done");
    Ok(())
}

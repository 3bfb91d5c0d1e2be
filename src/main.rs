//! Pipeline Toolkit - Main Entry Point

use clap::Parser;
use pipeline_toolkit::cli::{cmd_dtw, cmd_features, cmd_train, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pipeline_toolkit=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { data, config, param, max_splits, output } => {
            cmd_train(&data, config.as_deref(), &param, max_splits, output.as_deref())?;
        }
        Commands::Features { data, output } => {
            cmd_features(&data, &output)?;
        }
        Commands::Dtw { left, right, metric } => {
            cmd_dtw(&left, &right, &metric)?;
        }
    }

    Ok(())
}

//! recap - Transcript storage and AI summary service
//!
//! Entry point for the recap CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recap::cli::{Cli, Commands};
use recap::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        recap::cli::completions::print(*shell);
        return Ok(());
    }

    // Load configuration only for runtime commands.
    let settings = Settings::load()?;
    init_logging(&settings, cli.verbose);

    match cli.command {
        Commands::Serve { host, port } => {
            recap::cli::commands::serve(&settings, host, port).await?;
        }
        Commands::User(user_cmd) => {
            recap::cli::commands::user_command(&settings, user_cmd)?;
        }
        Commands::File(file_cmd) => {
            recap::cli::commands::file_command(&settings, file_cmd)?;
        }
        Commands::Token { email } => {
            recap::cli::commands::issue_token(&settings, &email)?;
        }
        Commands::Summarize { id, fallback } => {
            recap::cli::commands::summarize_file(&settings, &id, fallback).await?;
        }
        Commands::Config(config_cmd) => {
            recap::cli::commands::config_command(&settings, config_cmd)?;
        }
        Commands::Completions { .. } => unreachable!(),
    }

    Ok(())
}

fn init_logging(settings: &Settings, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else {
        settings.general.log_level.as_str()
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

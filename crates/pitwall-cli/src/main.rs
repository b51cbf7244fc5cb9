use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pitwall_cli::commands::{analyze, drivers, sessions};
use pitwall_cli::{Cli, Commands, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    match cli.command {
        Some(Commands::Analyze {
            session,
            driver,
            json,
        }) => {
            analyze::run(&config, session, driver, json).await?;
        }
        Some(Commands::Drivers { session, json }) => {
            drivers::run(&config, session, json).await?;
        }
        Some(Commands::Sessions {
            year,
            location,
            json,
        }) => {
            sessions::run(&config, year, location.as_deref(), json).await?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}

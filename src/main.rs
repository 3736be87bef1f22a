//! Anvilboot CLI - bootstrap build orchestrator for the Anvil IDE toolchain
//!
//! Entry point for the anvilboot command-line application.

use anyhow::Result;
use clap::Parser;

use anvilboot::cli::output::display_error;
use anvilboot::cli::Cli;
use anvilboot::config::Workspace;
use anvilboot::error::BootstrapError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber; -v raises the level
    let default_level = match (cli.quiet, cli.verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::WARN,
        (false, 1) => tracing::Level::INFO,
        (false, _) => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.into()),
        )
        .init();

    let workspace = Workspace::new(std::env::current_dir()?);

    // Run the command and handle errors
    match cli.run(&workspace).await {
        Ok(()) => Ok(()),
        Err(e) => {
            match e.downcast_ref::<BootstrapError>() {
                Some(bootstrap_error) => display_error(bootstrap_error),
                None => eprintln!("ERROR: {e}"),
            }
            std::process::exit(1);
        }
    }
}

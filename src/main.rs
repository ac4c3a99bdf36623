mod cli;
mod config;
mod db;
mod embedding;
mod error;
mod memory;
mod server;
mod tools;
mod vault;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "haven", version, about = "Local-first encrypted vault and memory daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the daemon (stdio or HTTP transport, per config)
    Serve,
    /// Show store statistics
    Stats,
    /// Delete all stored data (interactive confirmation)
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::HavenConfig::load()?;

    // Initialize tracing with the configured log level.
    // Log to stderr so stdout stays clean for the stdio transport.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => match config.server.transport.as_str() {
            "http" => server::serve_http(config).await?,
            _ => server::serve_stdio(config).await?,
        },
        Command::Stats => cli::stats::stats(&config)?,
        Command::Reset => cli::reset::reset(&config)?,
    }

    Ok(())
}

//! event-harvester CLI - Backward event harvester for Starknet

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::new(filter))
        .init();

    match &cli.command {
        Commands::Scan(args) => cli::scan::handle(args, cli.quiet).await,
        Commands::Decode { action } => cli::decode::handle(action, cli.quiet),
        Commands::Selector(args) => cli::selector::handle(args, cli.quiet),
        Commands::Windows(args) => cli::windows::handle(args, cli.quiet),
        Commands::Config { action } => cli::config::handle(action),
    }
}

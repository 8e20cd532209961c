//! TR7AE CLI - Command-line interface for Legend/Anniversary file tools

pub mod commands;

use clap::Parser;
use commands::Commands;

#[derive(Parser)]
#[command(name = "tr7ae")]
#[command(about = "TR7AE: Tomb Raider Legend/Anniversary mesh and texture tools", long_about = None)]
#[command(version = crate::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Run the TR7AE CLI
pub fn run_cli() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli.command.execute()?;

    Ok(())
}

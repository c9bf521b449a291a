mod cli;
mod drill;
mod error;
mod normalise;
mod product;
mod site;
mod wps;

use anyhow::{Error, Result};
use clap::Parser;
use cli::{command, Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();

    // No subcommand runs the full download.
    match cli.command.unwrap_or(Commands::Download {}) {
        Commands::Download {} => command::download(&cli.endpoint, &cli.sites).await?,
        Commands::Describe {} => command::describe(&cli.endpoint).await?,
        Commands::Process { name } => command::process(&cli.endpoint, &name).await?,
    }

    Ok(())
}

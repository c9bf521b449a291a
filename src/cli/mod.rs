//! Command line interface.

pub mod command;

use std::path::PathBuf;

use clap::{command, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Endpoint the TERN landscapes processing service is served from.
pub const DEFAULT_ENDPOINT: &str = "https://funcwps.ternlandscapes.org.au/wps/";

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    /// WPS endpoint to talk to
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Site registry file
    #[arg(long, default_value = "sites.json")]
    pub sites: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download every product for every registered site (the default)
    Download {},
    /// Show what the server offers
    Describe {},
    /// Show the inputs and outputs of one server process
    Process {
        /// Process identifier, e.g. `temporalDrill`
        name: String,
    },
}

/// Creates a percentage bar that draws in place on stdout.
pub fn create_percent_bar(message: String) -> ProgressBar {
    ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::stdout())
        .with_message(message)
        .with_style(
            ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {percent}%")
                .unwrap()
                .progress_chars("##-"),
        )
}

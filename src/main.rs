//! # scour
//!
//! Entry point for the scour binary. With no subcommand (or `serve`) it runs
//! the HTTP service; `stats` and `clean` work on a local file and exit.
//!
//! ```bash
//! scour serve --port 5000
//! scour stats data.csv
//! scour clean data.xlsx --dedupe --fill 0 -o cleaned.xlsx
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout)] // Allow println! in main binary

mod cli;

use anyhow::Result;
use clap::Parser as _;
use scour::logging::{self, LogSettings};

/// # Errors
///
/// Returns error if the config cannot be loaded, logging cannot be set up,
/// the Tokio runtime fails to start or the chosen command fails.
fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let config = cli.resolve_config()?;

    logging::init(&LogSettings::from(&config))?;

    tokio::runtime::Runtime::new()?.block_on(cli::run_command(cli.command, config))
}

//! # dmrfill CLI
//!
//! This is the binary entry point for the `dmrfill` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Handling top-level application errors, which `anyhow` prints to stderr
//!   before exiting with status 1.
//!
//! The core application logic is defined in the `lib.rs` library crate, so
//! the binary is a thin wrapper around the library.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}

//! # Multiclone CLI
//!
//! This is the binary entry point for the `multiclone` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging, which is the tool's progress output.
//! - Handling top-level errors: any error ends the process with exit code 1.
//!
//! The core logic lives in the `multiclone` library crate; the binary is a
//! thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}

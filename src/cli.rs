//! CLI argument parsing, logging setup and dispatch

use std::io::Write;

use anyhow::Result;
use clap::Parser;
use env_logger::{Env, Target};
use log::Level;

use crate::commands;
use multiclone::output::ColorChoice;

/// Multiclone - Clone repositories with their dependencies and run their post-clone actions
#[derive(Parser, Debug)]
#[command(name = "multiclone")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    clone: commands::clone::CloneArgs,

    /// Colorize output
    #[arg(long, value_name = "WHEN", value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        commands::clone::execute(self.clone, self.color)
    }
}

/// Progress goes to stdout. Info records print as the bare message, warnings
/// and errors carry their level.
fn init_logging(log_level: &str) {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .target(Target::Stdout)
        .format(|buf, record| {
            if record.level() <= Level::Warn {
                writeln!(buf, "[{}] {}", record.level(), record.args())
            } else {
                writeln!(buf, "{}", record.args())
            }
        })
        .try_init();
}

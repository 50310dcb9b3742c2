//! Clone command implementation
//!
//! Runs the whole pipeline:
//! 1. Load workspace settings and merge them with the command line
//! 2. Create the `main` and `source` folders
//! 3. Clone the requested repositories and their dependency closure
//! 4. Link repositories without descriptors and run the action phases
//! 5. Print a summary
//!
//! Failed clones of dependencies and failed action lines are reported but do
//! not change the exit code. Only a run without any usable root clone fails.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Args;
use log::{error, info};

use multiclone::actions::ActionRegistry;
use multiclone::config::{self, Overrides, RunOptions};
use multiclone::defaults::{default_workspace_root, CLI_REQUEST_DELIMITER, SETTINGS_FILENAME};
use multiclone::output::{ColorChoice, Console, Marker};
use multiclone::phases::orchestrator::{self, PipelineReport};
use multiclone::phases::resolve::{CloneState, RootStatus};
use multiclone::repository::RepositoryManager;
use multiclone::request::{parse_requests, RequestOrigin};
use multiclone::workspace::Workspace;

/// Arguments for the clone pipeline
#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Repositories to clone, `;`-separated: `<url> [branch=<name>] [commit=<id>]`
    #[arg(value_name = "REPOSITORIES")]
    pub repositories: Option<String>,

    /// Workspace root holding `main` and `source` (defaults to current directory)
    #[arg(short, long, value_name = "DIR", env = "MULTICLONE_PATH")]
    pub path: Option<PathBuf>,

    /// Version policy: 1/prefer-pin, 2/always-newest, 3/always-pinned
    #[arg(long, value_name = "POLICY", env = "MULTICLONE_VERSION_ACTION")]
    pub version_action: Option<String>,

    /// Replace existing clones, links and files
    #[arg(short, long)]
    pub force: bool,

    /// Clone depth, 0 for the full history (default: 1)
    #[arg(long, value_name = "N", env = "MULTICLONE_DEPTH")]
    pub depth: Option<u32>,

    /// Directory with executable actions (repeatable)
    #[arg(
        long = "action-dir",
        value_name = "DIR",
        env = "MULTICLONE_ACTION_DIRS",
        value_delimiter = ','
    )]
    pub action_dirs: Vec<PathBuf>,

    /// Settings file (defaults to <path>/.multiclone.yaml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Execute the clone pipeline
pub fn execute(args: CloneArgs, color: ColorChoice) -> Result<()> {
    let out = Console::new(color);
    let start_time = Instant::now();

    println!(
        "{} multiclone {}",
        out.marker(Marker::Banner),
        env!("CARGO_PKG_VERSION")
    );

    let input = args.repositories.unwrap_or_default();
    if input.trim().is_empty() {
        error!("No repositories requested");
        bail!("{}", RootStatus::NothingAttempted.message());
    }

    let root = args.path.unwrap_or_else(default_workspace_root);
    let config_path = args
        .config
        .unwrap_or_else(|| root.join(SETTINGS_FILENAME));
    let settings = config::load(&config_path)?;
    let options = RunOptions::resolve(
        root,
        Overrides {
            version_action: args.version_action,
            depth: args.depth,
            force: args.force,
            action_dirs: args.action_dirs,
        },
        &settings,
    )?;

    info!("Configuration:");
    info!("  Path: {}", options.root.display());
    info!("  Version action: {} ({})", options.policy, options.policy.code());
    info!("  Force: {}", options.force);
    info!("  Depth: {}", options.depth);
    if let Ok(cwd) = std::env::current_dir() {
        info!("  Working directory: {}", cwd.display());
    }

    let workspace = Workspace::prepare(&options.root, options.force)
        .with_context(|| format!("Failed to create workspace at {}", options.root.display()))?;
    let repo_manager = RepositoryManager::new(
        workspace.source_dir().to_path_buf(),
        options.force,
        options.depth,
    );
    let mut registry = ActionRegistry::load(&options.action_dirs, &[]);

    let requests = parse_requests(
        &input,
        CLI_REQUEST_DELIMITER,
        options.policy,
        RequestOrigin::Root,
    );

    match orchestrator::execute(
        requests,
        options.policy,
        &repo_manager,
        &mut registry,
        &workspace,
    ) {
        Ok(report) => {
            print_summary(&out, &report);
            println!(
                "{} Finished in {:.2}s",
                out.marker(Marker::Elapsed),
                start_time.elapsed().as_secs_f64()
            );
            Ok(())
        }
        Err(e) => {
            println!("{} Clone failed", out.outcome(false));
            Err(e.into())
        }
    }
}

fn print_summary(out: &Console, report: &PipelineReport) {
    let total = report.records.len();
    let present = report
        .records
        .iter()
        .filter(|r| matches!(r.state(), CloneState::AlreadyPresent(_)))
        .count();
    let failed: Vec<_> = report.failed_clones().collect();

    println!();
    println!("{} Summary:", out.marker(Marker::Summary));
    println!(
        "   Repositories: {} ({} cloned, {} already present, {} failed)",
        total,
        total - present - failed.len(),
        present,
        failed.len()
    );
    for record in &failed {
        let reason = match record.state() {
            CloneState::Failed(reason) => reason.as_str(),
            _ => "",
        };
        println!("     {} {} {}", out.outcome(false), record.url(), reason);
    }

    if !report.default_links.is_empty() {
        let linked = report.default_links.iter().filter(|l| l.succeeded).count();
        println!(
            "   Default links: {}/{}",
            linked,
            report.default_links.len()
        );
    }

    for (phase, phase_report) in &report.phases {
        let total_lines = phase_report.total_lines();
        if total_lines == 0 {
            continue;
        }
        println!(
            "   {} actions: {}/{} succeeded",
            phase,
            total_lines - phase_report.failed_lines(),
            total_lines
        );
    }

    let ok = report.succeeded() && failed.is_empty();
    let status = if ok {
        "All operations successful"
    } else {
        "Some operations failed"
    };
    println!("{} {}", out.outcome(ok), out.paint(status, ok));
}

//! Action Descriptor Interpreter
//!
//! An action descriptor is a text file at the repository root with one
//! `<ActionName> <arguments>` line per action. The name ends at the first
//! whitespace run; the rest of the line is the argument string.
//!
//! Lines run strictly one after another. Each line gets a fresh
//! [`ActionContext`]; only the variable map is carried from one line to the
//! next within the same repository. Results are ANDed per repository and per
//! phase, and a failure never stops the lines and repositories after it.
//!
//! Blank lines inside a descriptor are dispatched like any other line and
//! fail as an unknown action. A trailing newline does not produce a line.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::actions::{ActionContext, ActionRegistry, Variables};
use crate::workspace::Workspace;

/// Result of one descriptor line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineReport {
    pub line: String,
    pub action: String,
    pub succeeded: bool,
    pub log: Vec<String>,
}

/// Result of one repository's descriptor in one phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReport {
    pub repo_path: PathBuf,
    /// Whether the descriptor file exists. Without it the repository has
    /// nothing to do and succeeds.
    pub descriptor_found: bool,
    /// Set when the descriptor exists but could not be read.
    pub read_error: Option<String>,
    pub lines: Vec<LineReport>,
}

impl RepositoryReport {
    pub fn succeeded(&self) -> bool {
        self.read_error.is_none() && self.lines.iter().all(|line| line.succeeded)
    }
}

/// Result of running one descriptor filename over a set of repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    pub descriptor: String,
    pub repositories: Vec<RepositoryReport>,
}

impl PhaseReport {
    pub fn succeeded(&self) -> bool {
        self.repositories.iter().all(RepositoryReport::succeeded)
    }

    /// Number of descriptor lines that failed.
    pub fn failed_lines(&self) -> usize {
        self.repositories
            .iter()
            .flat_map(|repo| repo.lines.iter())
            .filter(|line| !line.succeeded)
            .count()
    }

    pub fn total_lines(&self) -> usize {
        self.repositories.iter().map(|repo| repo.lines.len()).sum()
    }
}

/// Run the descriptor named `descriptor` in each repository, in order.
pub fn run_repository_actions(
    repositories: &[PathBuf],
    descriptor: &str,
    registry: &mut ActionRegistry,
    workspace: &Workspace,
) -> PhaseReport {
    let repositories = repositories
        .iter()
        .map(|repo_path| run_descriptor(repo_path, descriptor, registry, workspace))
        .collect();

    PhaseReport {
        descriptor: descriptor.to_string(),
        repositories,
    }
}

fn run_descriptor(
    repo_path: &Path,
    descriptor: &str,
    registry: &mut ActionRegistry,
    workspace: &Workspace,
) -> RepositoryReport {
    let mut report = RepositoryReport {
        repo_path: repo_path.to_path_buf(),
        descriptor_found: false,
        read_error: None,
        lines: Vec::new(),
    };

    let path = repo_path.join(descriptor);
    if !path.is_file() {
        return report;
    }
    report.descriptor_found = true;

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            report.read_error = Some(e.to_string());
            return report;
        }
    };

    info!("Actions for: {}", repo_path.display());
    let mut variables = Variables::new();
    for line in content.lines() {
        report
            .lines
            .push(dispatch_line(line, repo_path, registry, workspace, &mut variables));
    }

    report
}

/// Split a descriptor line into action name and argument string.
pub fn split_line(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((name, arguments)) => (name, arguments.trim_start()),
        None => (line, ""),
    }
}

/// Dispatch one descriptor line against the registry.
///
/// The action's `reset` and `populate` hooks run first; a `false` from either
/// fails the line without calling `action`. The context log is flushed to
/// the log output as soon as the line completes.
pub fn dispatch_line(
    line: &str,
    repo_path: &Path,
    registry: &mut ActionRegistry,
    workspace: &Workspace,
    variables: &mut Variables,
) -> LineReport {
    let (name, arguments) = split_line(line);
    let mut ctx = ActionContext::new(workspace, repo_path, arguments, variables);

    let succeeded = match registry.get_mut(name) {
        None => {
            ctx.log(format!("Action not found: \"{}\"", name));
            false
        }
        Some(action) => {
            if !action.reset() {
                ctx.log(format!("{}: reset failed", name));
                false
            } else if !action.populate(arguments) {
                ctx.log(format!("{}: invalid arguments: {}", name, arguments));
                false
            } else {
                action.action(&mut ctx)
            }
        }
    };

    let log = ctx.into_log();
    if succeeded {
        info!("  {}: {}", name, arguments);
        for entry in &log {
            info!("    {}", entry);
        }
    } else {
        warn!("  Action failed: {} {}", name, arguments);
        for entry in &log {
            warn!("    {}", entry);
        }
    }

    LineReport {
        line: line.to_string(),
        action: name.to_string(),
        succeeded,
        log,
    }
}

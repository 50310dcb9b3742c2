//! Orchestrator for a complete multiclone run
//!
//! 1. Resolve the dependency closure of the root requests.
//! 2. Abort when no root clone was attempted or every root clone failed.
//! 3. Link every cloned repository without an action descriptor into `main`.
//! 4. Run the initial, main and final action phases over every cloned
//!    repository. Each phase finishes for all repositories before the next
//!    one starts.
//!
//! The overall outcome is the AND of the default links and the three phases.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{error, info};

use super::actions::{dispatch_line, run_repository_actions, LineReport, PhaseReport};
use super::resolve::{resolve_closure, CloneRecord, RootStatus};
use super::ActionPhase;
use crate::actions::links::LinkToMain;
use crate::actions::{ActionRegistry, Variables};
use crate::error::{Error, Result};
use crate::repository::RepositoryManager;
use crate::request::{CloneRequest, VersionPolicy};
use crate::workspace::Workspace;

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub root_status: RootStatus,
    pub records: Vec<CloneRecord>,
    /// One entry per repository linked into `main` by default.
    pub default_links: Vec<LineReport>,
    pub phases: Vec<(ActionPhase, PhaseReport)>,
}

impl PipelineReport {
    pub fn succeeded(&self) -> bool {
        self.default_links.iter().all(|link| link.succeeded)
            && self.phases.iter().all(|(_, report)| report.succeeded())
    }

    pub fn cloned_paths(&self) -> Vec<PathBuf> {
        cloned_paths(&self.records)
    }

    pub fn failed_clones(&self) -> impl Iterator<Item = &CloneRecord> {
        self.records.iter().filter(|record| !record.succeeded())
    }
}

/// Execute a complete run.
///
/// Returns [`Error::WorkspaceAbort`] when the root clones leave nothing to
/// work on. Per-clone and per-action failures are reported, not returned.
pub fn execute(
    roots: Vec<CloneRequest>,
    policy: VersionPolicy,
    repo_manager: &RepositoryManager,
    registry: &mut ActionRegistry,
    workspace: &Workspace,
) -> Result<PipelineReport> {
    let (root_status, records) = resolve_closure(repo_manager, policy, roots);
    if root_status.is_abort() {
        error!("{}", root_status.message());
        return Err(Error::WorkspaceAbort {
            message: root_status.message().to_string(),
        });
    }

    let repositories = cloned_paths(&records);

    info!("Link repositories without post-clone actions:");
    let default_links = link_undescribed(&repositories, registry, workspace);

    let mut phases = Vec::new();
    for phase in ActionPhase::ALL {
        info!("Run {} post-clone actions:", phase);
        let report =
            run_repository_actions(&repositories, phase.descriptor_filename(), registry, workspace);
        phases.push((phase, report));
    }

    Ok(PipelineReport {
        root_status,
        records,
        default_links,
        phases,
    })
}

/// Link each repository that has no action descriptor of any phase into
/// `main` under its own name.
pub fn link_undescribed(
    repositories: &[PathBuf],
    registry: &mut ActionRegistry,
    workspace: &Workspace,
) -> Vec<LineReport> {
    repositories
        .iter()
        .filter(|repo_path| {
            ActionPhase::ALL
                .iter()
                .all(|phase| !repo_path.join(phase.descriptor_filename()).exists())
        })
        .map(|repo_path| {
            let mut variables = Variables::new();
            dispatch_line(LinkToMain::NAME, repo_path, registry, workspace, &mut variables)
        })
        .collect()
}

/// Local paths of the successful records, each path once, in record order.
fn cloned_paths(records: &[CloneRecord]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(CloneRecord::local_path)
        .filter(|path| seen.insert(path.to_path_buf()))
        .map(Path::to_path_buf)
        .collect()
}

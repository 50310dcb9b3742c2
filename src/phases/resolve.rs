//! Dependency Closure Resolution
//!
//! The resolver owns one [`CloneRecord`] per distinct URL ever referenced.
//! Work is a FIFO queue of record indices plus a seen-set of URL strings:
//!
//! 1. Every root request is enqueued (duplicates by exact URL are dropped).
//! 2. A pass attempts every record queued when the pass started. After a
//!    successful clone, the repository's `.dependencies` descriptor is read
//!    and every request with an unseen URL is enqueued for the next pass.
//! 3. Passes repeat until the queue is empty.
//!
//! Each URL enters the queue at most once, so each record is attempted at
//! most once and resolution terminates for any finite dependency graph,
//! including graphs with cycles. URLs are compared as plain strings; two
//! spellings of the same repository are two records.
//!
//! A destination folder under `source` belongs to the first URL that cloned
//! (or found) a repository there. A later record for a different URL with the
//! same repository name fails without calling git, so it can neither replace
//! nor impersonate the first clone.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::defaults::{DEPENDENCIES_FILENAME, DESCRIPTOR_REQUEST_DELIMITER};
use crate::error::{Error, Result};
use crate::repository::{CloneOutcome, RepositoryManager};
use crate::request::{parse_requests, CloneRequest, RequestOrigin, VersionPolicy};

/// Lifecycle of a clone record. Leaves `Pending` exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneState {
    Pending,
    Cloned(PathBuf),
    /// The destination existed and `force` was off.
    AlreadyPresent(PathBuf),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneRecord {
    pub request: CloneRequest,
    pub origin: RequestOrigin,
    state: CloneState,
}

impl CloneRecord {
    fn new(request: CloneRequest, origin: RequestOrigin) -> Self {
        Self {
            request,
            origin,
            state: CloneState::Pending,
        }
    }

    pub fn url(&self) -> &str {
        &self.request.url
    }

    pub fn state(&self) -> &CloneState {
        &self.state
    }

    pub fn attempted(&self) -> bool {
        self.state != CloneState::Pending
    }

    pub fn succeeded(&self) -> bool {
        matches!(
            self.state,
            CloneState::Cloned(_) | CloneState::AlreadyPresent(_)
        )
    }

    /// Defined if and only if the clone succeeded.
    pub fn local_path(&self) -> Option<&Path> {
        match &self.state {
            CloneState::Cloned(path) | CloneState::AlreadyPresent(path) => Some(path),
            _ => None,
        }
    }

    fn complete(&mut self, outcome: CloneOutcome) {
        self.state = match outcome {
            CloneOutcome::Cloned(path) => CloneState::Cloned(path),
            CloneOutcome::AlreadyPresent(path) => CloneState::AlreadyPresent(path),
            CloneOutcome::Failed(e) => CloneState::Failed(e.to_string()),
        };
    }
}

/// Outcome of the root pass, which decides whether the run continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootStatus {
    AllSucceeded,
    SomeFailed,
    AllFailed,
    NothingAttempted,
}

impl RootStatus {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a CloneRecord>) -> Self {
        let (mut attempted, mut succeeded) = (0, 0);
        for record in records.into_iter().filter(|r| r.attempted()) {
            attempted += 1;
            if record.succeeded() {
                succeeded += 1;
            }
        }

        if attempted == 0 {
            RootStatus::NothingAttempted
        } else if succeeded == attempted {
            RootStatus::AllSucceeded
        } else if succeeded == 0 {
            RootStatus::AllFailed
        } else {
            RootStatus::SomeFailed
        }
    }

    /// The run aborts before any action phase.
    pub fn is_abort(self) -> bool {
        matches!(self, RootStatus::AllFailed | RootStatus::NothingAttempted)
    }

    pub fn message(self) -> &'static str {
        match self {
            RootStatus::AllSucceeded => {
                "Requested clone operations successful, check for dependencies"
            }
            RootStatus::SomeFailed => "Some clone operations failed, check for dependencies",
            RootStatus::AllFailed => "All clone operations failed - Abort",
            RootStatus::NothingAttempted => "No clone operations performed - Abort",
        }
    }
}

/// Counters for one resolver pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub discovered: usize,
}

pub struct Resolver<'a> {
    manager: &'a RepositoryManager,
    policy: VersionPolicy,
    records: Vec<CloneRecord>,
    queue: VecDeque<usize>,
    seen: HashSet<String>,
    /// Destination folder to the URL whose clone occupies it.
    destinations: HashMap<PathBuf, String>,
}

impl<'a> Resolver<'a> {
    pub fn new(manager: &'a RepositoryManager, policy: VersionPolicy) -> Self {
        Self {
            manager,
            policy,
            records: Vec::new(),
            queue: VecDeque::new(),
            seen: HashSet::new(),
            destinations: HashMap::new(),
        }
    }

    pub fn policy(&self) -> VersionPolicy {
        self.policy
    }

    /// Add a request unless its URL was seen before. Returns whether it was added.
    pub fn enqueue(&mut self, request: CloneRequest, origin: RequestOrigin) -> bool {
        if !self.seen.insert(request.url.clone()) {
            debug!("Skipping duplicate request: {}", request.url);
            return false;
        }
        self.records.push(CloneRecord::new(request, origin));
        self.queue.push_back(self.records.len() - 1);
        true
    }

    /// True while some record has not been attempted.
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Attempt every record queued before this call. Requests discovered
    /// along the way are queued for the next pass.
    pub fn run_pass(&mut self) -> PassReport {
        let mut report = PassReport::default();
        let batch: Vec<usize> = self.queue.drain(..).collect();

        for index in batch {
            let outcome = self.attempt(&self.records[index].request);
            self.records[index].complete(outcome);
            report.attempted += 1;

            let Some(path) = self.records[index].local_path().map(Path::to_path_buf) else {
                continue;
            };
            report.succeeded += 1;
            self.destinations
                .insert(path.clone(), self.records[index].request.url.clone());

            let dependencies = match read_dependencies(&path, self.policy) {
                Ok(dependencies) => dependencies,
                Err(e) => {
                    warn!("    {}", e);
                    continue;
                }
            };
            for dependency in dependencies {
                if self.enqueue(dependency, RequestOrigin::Dependency) {
                    report.discovered += 1;
                }
            }
        }

        report
    }

    fn attempt(&self, request: &CloneRequest) -> CloneOutcome {
        let target_dir = self.manager.target_dir(request);
        match self.destinations.get(&target_dir) {
            Some(owner) if *owner != request.url => {
                info!("  Clone {}", request);
                warn!(
                    "    Destination {} already used by {}",
                    target_dir.display(),
                    owner
                );
                CloneOutcome::Failed(Error::DestinationTaken {
                    path: target_dir,
                    url: owner.clone(),
                })
            }
            _ => self.manager.clone_repository(request),
        }
    }

    /// Run passes until no record is pending.
    pub fn resolve(&mut self) -> Vec<PassReport> {
        let mut passes = Vec::new();
        while self.has_pending() {
            passes.push(self.run_pass());
        }
        passes
    }

    pub fn records(&self) -> &[CloneRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<CloneRecord> {
        self.records
    }
}

/// Clone the root requests and their whole dependency closure.
///
/// Dependencies are only followed when at least one root clone succeeded.
/// Returns the root status and every record, roots first.
pub fn resolve_closure(
    manager: &RepositoryManager,
    policy: VersionPolicy,
    roots: Vec<CloneRequest>,
) -> (RootStatus, Vec<CloneRecord>) {
    let mut resolver = Resolver::new(manager, policy);
    for request in roots {
        resolver.enqueue(request, RequestOrigin::Root);
    }

    info!("Clone requested repositories:");
    resolver.run_pass();
    let root_status = RootStatus::from_records(
        resolver
            .records()
            .iter()
            .filter(|r| r.origin == RequestOrigin::Root),
    );
    info!("{}", root_status.message());
    if root_status.is_abort() {
        return (root_status, resolver.into_records());
    }

    if resolver.has_pending() {
        info!("Clone dependencies:");
        let passes = resolver.resolve();
        let attempted: usize = passes.iter().map(|p| p.attempted).sum();
        let succeeded: usize = passes.iter().map(|p| p.succeeded).sum();
        if succeeded == attempted {
            info!("All dependency clone operations successful");
        } else {
            warn!(
                "Some clone operations failed ({} of {} dependencies)",
                attempted - succeeded,
                attempted
            );
        }
    }

    (root_status, resolver.into_records())
}

/// Parse `<repo>/.dependencies` into requests of dependency origin.
/// A missing descriptor declares no dependencies.
pub fn read_dependencies(repo_path: &Path, policy: VersionPolicy) -> Result<Vec<CloneRequest>> {
    let path = repo_path.join(DEPENDENCIES_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(Error::Descriptor {
                path,
                message: e.to_string(),
            })
        }
    };

    Ok(parse_requests(
        &content,
        DESCRIPTOR_REQUEST_DELIMITER,
        policy,
        RequestOrigin::Dependency,
    ))
}

//! # Repository Cloning
//!
//! This module provides the `RepositoryManager`, the clone entry point used by
//! the dependency closure resolver. It owns everything about a single clone
//! that is not git itself:
//!
//! - rejecting URLs that do not start with the expected scheme, or whose
//!   repository name is not a single plain folder name,
//! - deriving the destination directory `<source>/<repo name>`,
//! - the force policy: an existing destination is deleted before cloning when
//!   `force` is set, and treated as an already successful clone otherwise.
//!
//! ## Design
//!
//! The git invocation sits behind the **`GitOperations`** trait. The main
//! application uses `DefaultGitOperations`, which wraps the system `git`
//! command. Tests inject mock implementations to simulate clones (including
//! repositories that declare dependencies) without network access.

use std::path::{Component, Path, PathBuf};

use log::{info, warn};

use crate::defaults::URL_SCHEME_PREFIX;
use crate::error::{Error, Result};
use crate::filesystem;
use crate::request::CloneRequest;

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Clones the requested repository version into `target_dir`.
    ///
    /// `target_dir` does not exist when this is called. `depth` of 0 means a
    /// full clone. A commit pin takes precedence over a branch pin.
    fn clone_repository(&self, request: &CloneRequest, target_dir: &Path, depth: u32)
        -> Result<()>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command to perform real Git operations.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn clone_repository(
        &self,
        request: &CloneRequest,
        target_dir: &Path,
        depth: u32,
    ) -> Result<()> {
        crate::git::clone_repository(
            &request.url,
            target_dir,
            depth,
            request.branch.as_deref(),
            request.commit.as_deref(),
        )
    }
}

/// Result of a single clone attempt.
#[derive(Debug)]
pub enum CloneOutcome {
    /// The repository was cloned into the path.
    Cloned(PathBuf),
    /// The destination already existed and `force` was off; the clone was skipped.
    AlreadyPresent(PathBuf),
    /// The clone was rejected or failed.
    Failed(Error),
}

impl CloneOutcome {
    pub fn succeeded(&self) -> bool {
        !matches!(self, CloneOutcome::Failed(_))
    }

    /// Local path of the repository, defined only on success.
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            CloneOutcome::Cloned(path) | CloneOutcome::AlreadyPresent(path) => Some(path),
            CloneOutcome::Failed(_) => None,
        }
    }
}

/// The entry point for cloning repositories into the workspace source folder.
pub struct RepositoryManager {
    git_ops: Box<dyn GitOperations>,
    source_dir: PathBuf,
    force: bool,
    depth: u32,
}

impl RepositoryManager {
    /// Creates a `RepositoryManager` that clones with the system `git` into
    /// `source_dir`.
    pub fn new(source_dir: PathBuf, force: bool, depth: u32) -> Self {
        Self::with_operations(Box::new(DefaultGitOperations), source_dir, force, depth)
    }

    /// Creates a `RepositoryManager` with a custom `GitOperations`
    /// implementation.
    ///
    /// This is primarily used for testing to inject mock operations.
    pub fn with_operations(
        git_ops: Box<dyn GitOperations>,
        source_dir: PathBuf,
        force: bool,
        depth: u32,
    ) -> Self {
        Self {
            git_ops,
            source_dir,
            force,
            depth,
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn force(&self) -> bool {
        self.force
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Destination directory for a request: `<source>/<repo name>`.
    pub fn target_dir(&self, request: &CloneRequest) -> PathBuf {
        self.source_dir.join(request.repo_name())
    }

    /// Clone one repository.
    ///
    /// Never returns an error: every failure is reported through
    /// [`CloneOutcome::Failed`] so the caller can record it and continue.
    pub fn clone_repository(&self, request: &CloneRequest) -> CloneOutcome {
        info!("  Clone {}", request);

        if let Err(e) = validate_url(&request.url) {
            warn!("    Invalid URL: {}", request.url);
            return CloneOutcome::Failed(e);
        }

        let repo_name = request.repo_name();
        if let Err(e) = validate_repo_name(&request.url, &repo_name) {
            warn!("    Invalid URL, no repository name: {}", request.url);
            return CloneOutcome::Failed(e);
        }
        let target_dir = self.target_dir(request);

        if filesystem::path_exists(&target_dir) {
            if !self.force {
                info!("    Repository already exists, clone skipped: {}", repo_name);
                return CloneOutcome::AlreadyPresent(target_dir);
            }
            if let Err(e) = filesystem::remove_path(&target_dir) {
                warn!("    Forced removal failure for: {} ({})", repo_name, e);
                return CloneOutcome::Failed(e);
            }
            info!("    Forced removal of: {}", repo_name);
        }

        match self
            .git_ops
            .clone_repository(request, &target_dir, self.depth)
        {
            Ok(()) => {
                info!("    Successfully cloned repository: {}", repo_name);
                CloneOutcome::Cloned(target_dir)
            }
            Err(e) => {
                warn!("    Failed to clone repository: {} ({})", repo_name, e);
                CloneOutcome::Failed(e)
            }
        }
    }
}

/// A clonable URL starts with the `http` scheme prefix and parses as a URL.
pub fn validate_url(url: &str) -> Result<()> {
    if !url.starts_with(URL_SCHEME_PREFIX) {
        return Err(Error::InvalidUrl {
            url: url.to_string(),
        });
    }
    url::Url::parse(url)?;
    Ok(())
}

/// A repository name must be exactly one normal path component, so that
/// `<source>/<name>` is a folder strictly inside `source`.
pub fn validate_repo_name(url: &str, name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    let single_folder = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_folder || name.contains(['/', '\\']) {
        return Err(Error::InvalidUrl {
            url: url.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Mock git operations for testing
    struct MockGitOperations {
        clone_calls: Arc<Mutex<Vec<(CloneRequest, PathBuf, u32)>>>,
        should_fail: bool,
    }

    impl MockGitOperations {
        fn new() -> Self {
            Self {
                clone_calls: Arc::new(Mutex::new(Vec::new())),
                should_fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                clone_calls: Arc::new(Mutex::new(Vec::new())),
                should_fail: true,
            }
        }
    }

    impl GitOperations for MockGitOperations {
        fn clone_repository(
            &self,
            request: &CloneRequest,
            target_dir: &Path,
            depth: u32,
        ) -> Result<()> {
            self.clone_calls
                .lock()
                .unwrap()
                .push((request.clone(), target_dir.to_path_buf(), depth));
            if self.should_fail {
                return Err(Error::GitClone {
                    url: request.url.clone(),
                    message: "Network error".to_string(),
                });
            }
            fs::create_dir_all(target_dir.join(".git"))?;
            Ok(())
        }
    }

    #[test]
    fn test_clone_into_source_dir() {
        let temp_dir = TempDir::new().unwrap();
        let git_ops = Box::new(MockGitOperations::new());
        let clone_calls = git_ops.clone_calls.clone();
        let manager =
            RepositoryManager::with_operations(git_ops, temp_dir.path().to_path_buf(), false, 3);

        let request = CloneRequest::new("https://github.com/test/repo").with_branch("main");
        let outcome = manager.clone_repository(&request);

        assert!(matches!(outcome, CloneOutcome::Cloned(_)));
        assert_eq!(outcome.local_path(), Some(temp_dir.path().join("repo").as_path()));

        let calls = clone_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, request);
        assert_eq!(calls[0].1, temp_dir.path().join("repo"));
        assert_eq!(calls[0].2, 3);
    }

    #[test]
    fn test_existing_repository_skipped_without_force() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("repo")).unwrap();

        let git_ops = Box::new(MockGitOperations::new());
        let clone_calls = git_ops.clone_calls.clone();
        let manager =
            RepositoryManager::with_operations(git_ops, temp_dir.path().to_path_buf(), false, 1);

        let outcome = manager.clone_repository(&CloneRequest::new("https://github.com/test/repo"));

        assert!(matches!(outcome, CloneOutcome::AlreadyPresent(_)));
        assert!(outcome.succeeded());
        assert!(clone_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_existing_repository_replaced_with_force() {
        let temp_dir = TempDir::new().unwrap();
        let existing = temp_dir.path().join("repo");
        fs::create_dir_all(&existing).unwrap();
        fs::write(existing.join("stale.txt"), "old").unwrap();

        let git_ops = Box::new(MockGitOperations::new());
        let clone_calls = git_ops.clone_calls.clone();
        let manager =
            RepositoryManager::with_operations(git_ops, temp_dir.path().to_path_buf(), true, 1);

        let outcome = manager.clone_repository(&CloneRequest::new("https://github.com/test/repo"));

        assert!(matches!(outcome, CloneOutcome::Cloned(_)));
        assert!(!existing.join("stale.txt").exists());
        assert_eq!(clone_calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_url_rejected_without_git() {
        let temp_dir = TempDir::new().unwrap();
        let git_ops = Box::new(MockGitOperations::new());
        let clone_calls = git_ops.clone_calls.clone();
        let manager =
            RepositoryManager::with_operations(git_ops, temp_dir.path().to_path_buf(), false, 1);

        let outcome = manager.clone_repository(&CloneRequest::new("git@github.com:test/repo.git"));

        assert!(matches!(outcome, CloneOutcome::Failed(Error::InvalidUrl { .. })));
        assert_eq!(outcome.local_path(), None);
        assert!(clone_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_clone_error_becomes_failed_outcome() {
        let temp_dir = TempDir::new().unwrap();
        let manager = RepositoryManager::with_operations(
            Box::new(MockGitOperations::failing()),
            temp_dir.path().to_path_buf(),
            false,
            1,
        );

        let outcome = manager.clone_repository(&CloneRequest::new("https://github.com/test/repo"));

        match outcome {
            CloneOutcome::Failed(e) => assert!(e.to_string().contains("Network error")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://github.com/test/repo").is_ok());
        assert!(validate_url("http://localhost/repo").is_ok());
        assert!(validate_url("ssh://github.com/test/repo").is_err());
        assert!(validate_url("https://").is_err());
    }

    #[test]
    fn test_target_dir_uses_repo_name() {
        let manager = RepositoryManager::new(PathBuf::from("/ws/source"), false, 1);
        let request = CloneRequest::new("https://github.com/org/LV32.2020..PPL.Driver");
        assert_eq!(
            manager.target_dir(&request),
            PathBuf::from("/ws/source/PPL.Driver")
        );
    }

    #[test]
    fn test_validate_repo_name() {
        assert!(validate_repo_name("u", "repo").is_ok());
        assert!(validate_repo_name("u", "PPL.Driver").is_ok());
        assert!(validate_repo_name("u", "").is_err());
        assert!(validate_repo_name("u", ".").is_err());
        assert!(validate_repo_name("u", "..").is_err());
        assert!(validate_repo_name("u", "a/b").is_err());
        assert!(validate_repo_name("u", "a\\b").is_err());
    }

    #[test]
    fn test_nameless_url_never_touches_source_dir() {
        let temp_dir = TempDir::new().unwrap();
        let sibling = temp_dir.path().join("Sibling");
        fs::create_dir_all(&sibling).unwrap();
        fs::write(sibling.join("keep.txt"), "keep").unwrap();

        let git_ops = Box::new(MockGitOperations::new());
        let clone_calls = git_ops.clone_calls.clone();
        let manager =
            RepositoryManager::with_operations(git_ops, temp_dir.path().to_path_buf(), true, 1);

        for url in ["https://host/org/LV2020..", "https://host/org/x/..", "https://host/org/."] {
            let outcome = manager.clone_repository(&CloneRequest::new(url));
            assert!(
                matches!(outcome, CloneOutcome::Failed(Error::InvalidUrl { .. })),
                "{} should be rejected, got {:?}",
                url,
                outcome
            );
        }

        assert_eq!(fs::read_to_string(sibling.join("keep.txt")).unwrap(), "keep");
        assert!(clone_calls.lock().unwrap().is_empty());
    }
}

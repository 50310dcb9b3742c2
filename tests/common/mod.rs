//! Shared test utilities for integration and E2E tests.
//!
//! The CLI tests run offline: a repository is "cloned" by seeding
//! `<workspace>/source/<name>` beforehand. Without `--force` an existing clone
//! is reused and git is never invoked, so the URLs only need to be valid.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_repository("App", &[(".postcloneactions", "...")]);
//!     fixture.command().arg(repo_url("App")).assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::env;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::repo_url;
    #[allow(unused_imports)]
    pub use super::should_skip_network_tests;
    pub use super::TestFixture;
}

/// URL of a test repository. The host is never contacted.
#[allow(dead_code)]
pub fn repo_url(name: &str) -> String {
    format!("https://git.example.invalid/org/{}", name)
}

/// Check if network tests should be skipped.
///
/// Returns `true` if the `SKIP_NETWORK_TESTS` environment variable is set.
#[allow(dead_code)]
pub fn should_skip_network_tests() -> bool {
    env::var("SKIP_NETWORK_TESTS").is_ok()
}

/// A temporary workspace root with optionally pre-seeded clones.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_repository("Lib", &[])
///     .with_repository("App", &[(".dependencies", &repo_url("Lib"))]);
///
/// fixture.command().arg(repo_url("App")).assert().success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Seed `source/<name>` with the given files, as if it had been cloned.
    pub fn with_repository(self, name: &str, files: &[(&str, &str)]) -> Self {
        let repo = self.temp_dir.child("source").child(name);
        repo.create_dir_all().expect("Failed to create repository");
        for (path, content) in files {
            repo.child(path)
                .write_str(content)
                .expect("Failed to write repository file");
        }
        self
    }

    /// Add a `.multiclone.yaml` settings file with the given content.
    #[allow(dead_code)]
    pub fn with_settings(self, content: &str) -> Self {
        self.temp_dir
            .child(".multiclone.yaml")
            .write_str(content)
            .expect("Failed to write settings file");
        self
    }

    /// Add an executable shell script `<dir>/<name>`.
    #[cfg(unix)]
    #[allow(dead_code)]
    pub fn with_script(self, dir: &str, name: &str, body: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let script = self.temp_dir.child(dir).child(name);
        script
            .write_str(&format!("#!/bin/sh\n{}\n", body))
            .expect("Failed to write script");
        std::fs::set_permissions(script.path(), std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make script executable");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    #[allow(dead_code)]
    pub fn main_dir(&self) -> PathBuf {
        self.path().join("main")
    }

    #[allow(dead_code)]
    pub fn source_dir(&self) -> PathBuf {
        self.path().join("source")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command for this workspace with colors off and no
    /// configuration leaking in from the environment.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("multiclone");
        cmd.current_dir(self.path())
            .env_remove("MULTICLONE_PATH")
            .env_remove("MULTICLONE_VERSION_ACTION")
            .env_remove("MULTICLONE_DEPTH")
            .env_remove("MULTICLONE_ACTION_DIRS")
            .env_remove("RUST_LOG")
            .arg("--color")
            .arg("never")
            .arg("--path")
            .arg(self.path());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_repository() {
        let fixture = TestFixture::new().with_repository("Repo", &[(".dependencies", "")]);
        assert!(fixture.source_dir().join("Repo/.dependencies").exists());
    }
}

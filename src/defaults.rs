//! Reserved names and default values for multiclone.
//!
//! This module provides the file and directory names that form the on-disk
//! contract between multiclone and the repositories it clones, plus the
//! defaults shared by the CLI and the library.

use std::path::PathBuf;

/// Dependency descriptor at the root of a cloned repository.
pub const DEPENDENCIES_FILENAME: &str = ".dependencies";

/// Action descriptor run before the main phase.
pub const ACTIONS_INITIAL_FILENAME: &str = ".postcloneactions_initial";

/// Action descriptor for the main phase.
pub const ACTIONS_FILENAME: &str = ".postcloneactions";

/// Action descriptor run after the main phase.
pub const ACTIONS_FINAL_FILENAME: &str = ".postcloneactions_final";

/// Optional workspace settings file, looked up in the workspace root.
pub const SETTINGS_FILENAME: &str = ".multiclone.yaml";

/// Linked view of the workspace.
pub const MAIN_DIRNAME: &str = "main";

/// Raw clones.
pub const SOURCE_DIRNAME: &str = "source";

/// Branch prefix marking a tag reference.
pub const TAG_PREFIX: &str = "tags/";

/// Scheme prefix every clonable URL must start with.
pub const URL_SCHEME_PREFIX: &str = "http";

/// Separator between repository specifications on the command line.
pub const CLI_REQUEST_DELIMITER: char = ';';

/// Separator between repository specifications in a dependency descriptor.
pub const DESCRIPTOR_REQUEST_DELIMITER: char = '\n';

/// Default clone depth (number of commits).
pub const DEFAULT_DEPTH: u32 = 1;

/// Characters that may not appear in an action path argument once
/// environment variables have been expanded.
pub const FORBIDDEN_PATH_CHARS: &[char] = &['?', '%', '*', '|', '"', '<', '>'];

/// Files never hard-linked when recreating a repository structure.
pub const STRUCTURE_EXCLUSIONS: &[&str] = &[".git", "README.md"];

/// Environment variables exported to external actions.
pub mod env {
    pub const REPO_PATH: &str = "MULTICLONE_REPO_PATH";
    pub const REPO_NAME: &str = "MULTICLONE_REPO_NAME";
    pub const MAIN: &str = "MULTICLONE_MAIN";
    pub const SOURCE: &str = "MULTICLONE_SOURCE";
    pub const FORCE: &str = "MULTICLONE_FORCE";
    pub const ARGUMENTS: &str = "MULTICLONE_ARGUMENTS";
}

/// Returns the default workspace root, the current working directory.
///
/// Falls back to `.` if the current directory cannot be determined.
pub fn default_workspace_root() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

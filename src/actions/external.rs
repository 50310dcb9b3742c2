//! Actions provided as executables in an action directory.
//!
//! An executable file `<dir>/<Name>[.ext]` registers the action `<Name>`. It
//! runs with the repository as working directory and receives the argument
//! string as its single command line argument. The workspace is described
//! through `MULTICLONE_*` environment variables. Every line it writes to
//! stdout becomes a status line; exit code 0 means success.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{Action, ActionContext};
use crate::defaults::env;

#[derive(Debug, Clone)]
pub struct ExternalAction {
    name: String,
    program: PathBuf,
}

impl ExternalAction {
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
        }
    }

    /// Build an action from a directory entry, if it is an executable file.
    /// The action name is the file stem.
    pub fn from_path(path: &Path) -> Option<Self> {
        if !is_executable(path) {
            return None;
        }
        let name = path.file_stem()?.to_str()?;
        if name.is_empty() || name.starts_with('.') {
            return None;
        }
        Some(Self::new(name, path))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Action for ExternalAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn action(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        let workspace = ctx.workspace();
        let output = Command::new(&self.program)
            .arg(ctx.arguments())
            .current_dir(ctx.repo_path())
            .env(env::REPO_PATH, ctx.repo_path())
            .env(env::REPO_NAME, ctx.repo_name())
            .env(env::MAIN, workspace.main_dir())
            .env(env::SOURCE, workspace.source_dir())
            .env(env::FORCE, if workspace.force() { "1" } else { "0" })
            .env(env::ARGUMENTS, ctx.arguments())
            .output();

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                ctx.log(format!(
                    "Failed to run {}: {}",
                    self.program.display(),
                    e
                ));
                return false;
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines().filter(|line| !line.trim().is_empty()) {
            ctx.log(line);
        }

        if output.status.success() {
            return true;
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        match output.status.code() {
            Some(code) => ctx.log(format!("{} exited with code {}", self.name, code)),
            None => ctx.log(format!("{} was terminated by a signal", self.name)),
        }
        if !stderr.is_empty() {
            ctx.log(stderr.to_string());
        }
        false
    }
}

/// True if `path` is a regular file the current platform can execute.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// True if `path` is a regular file the current platform can execute.
#[cfg(windows)]
pub fn is_executable(path: &Path) -> bool {
    let is_file = fs::metadata(path)
        .map(|metadata| metadata.is_file())
        .unwrap_or(false);
    let has_executable_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ["exe", "bat", "cmd", "com"]
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false);
    is_file && has_executable_extension
}

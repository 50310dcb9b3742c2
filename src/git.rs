use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use log::debug;

use crate::defaults::TAG_PREFIX;
use crate::error::Error;

/// Clone a repository into `target_dir` using the system git command
///
/// This uses the system git command, which automatically handles:
/// - SSH keys from ~/.ssh/
/// - Git credential helpers
/// - Personal access tokens
/// - Any authentication configured in ~/.gitconfig
///
/// `depth` of 0 clones the full history. A `commit` takes precedence over
/// `branch`: the repository is cloned without checkout, the commit is
/// fetched and then checked out detached. A branch of the form
/// `tags/<name>` checks out the tag `<name>`.
pub fn clone_repository(
    url: &str,
    target_dir: &Path,
    depth: u32,
    branch: Option<&str>,
    commit: Option<&str>,
) -> Result<(), Error> {
    // Create parent directory if it doesn't exist
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut args = vec!["clone".to_string()];
    if depth > 0 {
        args.push(format!("--depth={}", depth));
    }
    match (commit, branch) {
        (Some(_), _) => args.push("--no-checkout".to_string()),
        (None, Some(branch)) => {
            args.push("--branch".to_string());
            args.push(branch.strip_prefix(TAG_PREFIX).unwrap_or(branch).to_string());
        }
        (None, None) => {}
    }
    args.push(url.to_string());

    debug!("git {} {}", args.join(" "), target_dir.display());
    let output = Command::new("git")
        .args(&args)
        .arg(target_dir)
        .output()
        .map_err(|e| Error::GitClone {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(Error::GitClone {
            url: url.to_string(),
            message: clone_failure_message(&output),
        });
    }

    if let Some(commit) = commit {
        if let Err(e) = checkout_commit(url, target_dir, depth, commit) {
            // A half-populated clone would be mistaken for a finished one on the next run
            let _ = fs::remove_dir_all(target_dir);
            return Err(e);
        }
    }

    Ok(())
}

/// Fetch `commit` from origin and check it out in an existing clone.
fn checkout_commit(url: &str, repo_dir: &Path, depth: u32, commit: &str) -> Result<(), Error> {
    let mut fetch = vec!["fetch".to_string()];
    if depth > 0 {
        fetch.push(format!("--depth={}", depth));
    }
    fetch.push("origin".to_string());
    fetch.push(commit.to_string());
    run_git(url, repo_dir, &fetch)?;

    run_git(
        url,
        repo_dir,
        &["checkout".to_string(), "--detach".to_string(), commit.to_string()],
    )
}

/// Run `git -C <repo_dir> <args>`, mapping a failure to `Error::GitCommand`.
fn run_git(url: &str, repo_dir: &Path, args: &[String]) -> Result<(), Error> {
    debug!("git -C {} {}", repo_dir.display(), args.join(" "));
    let command = args.first().cloned().unwrap_or_default();
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_dir)
        .args(args)
        .output()
        .map_err(|e| Error::GitCommand {
            command: command.clone(),
            url: url.to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command,
            url: url.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}

/// Turn git's stderr into a message, expanding on common authentication failures.
fn clone_failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);

    if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
    {
        format!(
            "Authentication failed. Make sure you have access to the repository.\n\
            For private repos, ensure you have:\n\
            - SSH key added to ssh-agent\n\
            - Git credentials configured\n\
            - Personal access token set up\n\
            Error: {}",
            stderr.trim()
        )
    } else {
        stderr.trim().to_string()
    }
}

//! # Post-Clone Actions
//!
//! An action is a named unit of post-clone work. Repositories list the
//! actions to run in their action descriptor files, one `<ActionName>
//! <arguments>` per line, and the interpreter in
//! [`phases::actions`](crate::phases::actions) dispatches each line to the
//! [`ActionRegistry`].
//!
//! ## Capability contract
//!
//! Every action implements [`Action`]. Per line, the interpreter builds a
//! fresh [`ActionContext`] and then calls, in order:
//!
//! 1. `reset()` - optional hook, defaults to success,
//! 2. `populate(arguments)` - optional hook, defaults to success,
//! 3. `action(ctx)` - the work itself.
//!
//! A `false` from either hook fails the line without calling `action()`.
//!
//! ## Context
//!
//! The context is an explicit value handed to the action by parameter. It
//! carries the repository path and name, the raw argument string, the
//! workspace, a log of human-readable status lines, and a variable map that
//! lives for the whole run of one repository's descriptor file so that
//! consecutive lines can pass values to each other.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::workspace::Workspace;

pub mod dependencies;
pub mod external;
pub mod folders;
pub mod links;
pub mod registry;
pub mod structure;

pub use registry::{ActionFactory, ActionRegistry};

/// The capability every post-clone action exposes.
pub trait Action {
    /// Registration key, the name used in action descriptor files.
    fn name(&self) -> &str;

    /// Clear state left over from a previous invocation.
    fn reset(&mut self) -> bool {
        true
    }

    /// Receive the raw argument string before `action` runs.
    fn populate(&mut self, _arguments: &str) -> bool {
        true
    }

    /// Perform the action. Returns `true` on success.
    fn action(&mut self, ctx: &mut ActionContext<'_>) -> bool;
}

/// Variables shared by the lines of one repository's descriptor run.
pub type Variables = BTreeMap<String, String>;

/// Execution context for a single action invocation.
pub struct ActionContext<'a> {
    workspace: &'a Workspace,
    repo_path: PathBuf,
    repo_name: String,
    arguments: String,
    log: Vec<String>,
    variables: &'a mut Variables,
}

impl<'a> ActionContext<'a> {
    pub fn new(
        workspace: &'a Workspace,
        repo_path: &Path,
        arguments: &str,
        variables: &'a mut Variables,
    ) -> Self {
        let repo_name = repo_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            workspace,
            repo_path: repo_path.to_path_buf(),
            repo_name,
            arguments: arguments.to_string(),
            log: Vec::new(),
            variables,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        self.workspace
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    pub fn repo_name(&self) -> &str {
        &self.repo_name
    }

    pub fn arguments(&self) -> &str {
        &self.arguments
    }

    /// Append a status line.
    pub fn log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    pub fn into_log(self) -> Vec<String> {
        self.log
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }
}

/// Parsed `key=value;key=value` argument string.
///
/// Tokens are separated by `;`. A token of the form `key=value` starts a new
/// key; any other token continues the value list of the preceding key, so
/// `target=libs;exclusions=a;b` yields `exclusions = [a, b]`. Tokens before
/// the first key are positional.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ActionArguments {
    entries: Vec<(String, Vec<String>)>,
    positional: Vec<String>,
}

impl ActionArguments {
    pub fn parse(input: &str) -> Self {
        let mut arguments = Self::default();

        for token in input.split(';').map(str::trim).filter(|t| !t.is_empty()) {
            match token.split_once('=') {
                Some((key, value)) if is_key(key) => {
                    arguments
                        .entries
                        .push((key.to_string(), vec![value.trim().to_string()]));
                }
                _ => match arguments.entries.last_mut() {
                    Some((_, values)) => values.push(token.to_string()),
                    None => arguments.positional.push(token.to_string()),
                },
            }
        }

        arguments
    }

    /// First value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }

    /// All non-empty values of `key`.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(k, _)| k == key)
            .flat_map(|(_, values)| values.iter())
            .filter(|value| !value.is_empty())
            .cloned()
            .collect()
    }

    pub fn positional(&self) -> &[String] {
        &self.positional
    }
}

fn is_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

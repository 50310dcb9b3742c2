//! # Workspace Settings
//!
//! A workspace may carry a `.multiclone.yaml` file at its root with defaults
//! for the run:
//!
//! ```yaml
//! version_action: always-newest   # or 1, 2, 3, or a policy name
//! depth: 1                        # 0 clones the full history
//! force: false
//! action_dirs:                    # relative entries resolve against the workspace root
//!   - tools/actions
//! ```
//!
//! Every field is optional. Values from the command line or the environment
//! take precedence over the file, and the file over built-in defaults; the
//! merge happens in [`RunOptions::resolve`].

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::defaults::DEFAULT_DEPTH;
use crate::error::{Error, Result};
use crate::filesystem::resolve_against;
use crate::request::VersionPolicy;

/// Contents of a settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub version_action: Option<String>,
    pub depth: Option<u32>,
    pub force: Option<bool>,
    pub action_dirs: Vec<PathBuf>,
}

impl Settings {
    /// The configured version policy, if any.
    pub fn version_policy(&self) -> Result<Option<VersionPolicy>> {
        self.version_action
            .as_deref()
            .map(str::parse)
            .transpose()
    }

    /// Action directories with relative entries resolved against `root`.
    pub fn action_dirs(&self, root: &Path) -> Vec<PathBuf> {
        self.action_dirs
            .iter()
            .map(|dir| resolve_against(root, dir))
            .collect()
    }
}

/// Parse settings from YAML. An empty document yields the defaults.
pub fn parse(yaml_content: &str) -> Result<Settings> {
    if yaml_content.trim().is_empty() {
        return Ok(Settings::default());
    }
    Ok(serde_yaml::from_str(yaml_content)?)
}

/// Parse settings from a file that must exist.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

/// Load settings from `path`, using the defaults when it does not exist.
/// A malformed file is reported as [`Error::ConfigParse`] naming the file.
pub fn load(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    from_file(path).map_err(|e| match e {
        Error::Yaml(yaml) => Error::ConfigParse {
            message: format!("{}: {}", path.display(), yaml),
        },
        other => other,
    })
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub version_action: Option<String>,
    pub depth: Option<u32>,
    pub force: bool,
    pub action_dirs: Vec<PathBuf>,
}

/// Effective options for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub root: PathBuf,
    pub policy: VersionPolicy,
    pub force: bool,
    pub depth: u32,
    /// Scanned in order; a later directory wins a name conflict.
    pub action_dirs: Vec<PathBuf>,
}

impl RunOptions {
    pub fn resolve(root: PathBuf, overrides: Overrides, settings: &Settings) -> Result<Self> {
        let policy = match overrides.version_action.as_deref() {
            Some(value) => value.parse()?,
            None => settings.version_policy()?.unwrap_or_default(),
        };

        let mut action_dirs = settings.action_dirs(&root);
        action_dirs.extend(
            overrides
                .action_dirs
                .iter()
                .map(|dir| resolve_against(&root, dir)),
        );

        Ok(Self {
            policy,
            force: overrides.force || settings.force.unwrap_or(false),
            depth: overrides.depth.or(settings.depth).unwrap_or(DEFAULT_DEPTH),
            action_dirs,
            root,
        })
    }
}

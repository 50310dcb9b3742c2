//! Actions that link a repository into the workspace.
//!
//! All of them share one policy: with `force`, whatever occupies the
//! destination is deleted first; without it, an existing destination counts
//! as already linked.

use std::path::{Path, PathBuf};

use super::{Action, ActionContext};
use crate::filesystem::{self, expand_env_vars, resolve_within, sanity_check_path};

/// Link the repository into `main` under its own name.
///
/// This is also the default for repositories without any action descriptor.
#[derive(Debug, Default)]
pub struct LinkToMain;

impl LinkToMain {
    pub const NAME: &'static str = "Action_LinkToMain";
}

impl Action for LinkToMain {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn action(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        let destination = ctx.workspace().main_dir().join(ctx.repo_name());
        let source = ctx.repo_path().to_path_buf();
        link_directory(ctx, &destination, &source)
    }
}

/// Link the repository into a target folder as `<target>/<repo name>`.
///
/// Arguments: the target folder. Environment variables are expanded; a
/// relative or empty target is resolved against `main` and may not leave it.
#[derive(Debug, Default)]
pub struct LinkToFolder;

impl LinkToFolder {
    pub const NAME: &'static str = "Action_LinkToFolder";
}

impl Action for LinkToFolder {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn action(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        let target = ctx.arguments().trim().to_string();
        let source = ctx.repo_path().to_path_buf();
        link_into_folder(ctx, &target, &source)
    }
}

/// Link the repository into a sub-folder of `main`.
///
/// Arguments: path relative to `main`. With repository `Repo1` and argument
/// `libs/drivers` the link is `main/libs/drivers/Repo1`.
#[derive(Debug, Default)]
pub struct LinkIntoMainSubFolder;

impl LinkIntoMainSubFolder {
    pub const NAME: &'static str = "Action_LinkIntoMainSubFolder";
}

impl Action for LinkIntoMainSubFolder {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn action(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        let sub_folder = ctx.arguments().trim().to_string();
        let folder = match resolve_within(ctx.workspace().main_dir(), Path::new(&sub_folder)) {
            Ok(folder) if sanity_check_path(&sub_folder) && !Path::new(&sub_folder).is_absolute() => {
                folder
            }
            _ => {
                ctx.log(format!("Illegal sub-folder path: {}", sub_folder));
                return false;
            }
        };

        let destination = folder.join(ctx.repo_name());
        let source = ctx.repo_path().to_path_buf();
        link_directory(ctx, &destination, &source)
    }
}

/// Link `source` into the user-supplied `target` as
/// `<target>/<basename of source>`.
fn link_into_folder(ctx: &mut ActionContext<'_>, target: &str, source: &Path) -> bool {
    let expanded = expand_env_vars(target);
    if !sanity_check_path(&expanded) {
        ctx.log(format!("Illegal target path: {}", expanded));
        return false;
    }
    let directory = match resolve_within(ctx.workspace().main_dir(), Path::new(&expanded)) {
        Ok(directory) => directory,
        Err(e) => {
            ctx.log(format!("Illegal target path: {}", e));
            return false;
        }
    };
    link_into_directory(ctx, &directory, source)
}

/// Link `source` into an already resolved `directory`. The path is taken
/// as is: no expansion and no character check.
pub(crate) fn link_into_directory(
    ctx: &mut ActionContext<'_>,
    directory: &Path,
    source: &Path,
) -> bool {
    let Some(name) = source.file_name() else {
        ctx.log(format!("Source has no name: {}", source.display()));
        return false;
    };
    let destination: PathBuf = directory.join(name);
    link_directory(ctx, &destination, source)
}

/// Create the directory link `destination -> source` under the force policy.
fn link_directory(ctx: &mut ActionContext<'_>, destination: &Path, source: &Path) -> bool {
    if ctx.workspace().force() && filesystem::path_exists(destination) {
        if let Err(e) = filesystem::remove_path(destination) {
            ctx.log(format!(
                "Failed to delete for linking: {} ({})",
                destination.display(),
                e
            ));
            return false;
        }
    }

    if filesystem::path_exists(destination) {
        ctx.log(format!(
            "Folder found, skip linking to: {}",
            destination.display()
        ));
        return true;
    }

    match filesystem::create_dir_link(destination, source) {
        Ok(()) => {
            ctx.log(format!(
                "Soft link created: {} -> {}",
                destination.display(),
                source.display()
            ));
            true
        }
        Err(e) => {
            ctx.log(format!("Error creating link: {}", e));
            false
        }
    }
}

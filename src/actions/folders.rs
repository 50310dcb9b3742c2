//! Folder creation actions.

use std::path::{Path, PathBuf};

use super::{Action, ActionContext};
use crate::filesystem::{self, create_folder, expand_env_vars, resolve_within, sanity_check_path};

/// Create a folder relative to `main`, or anywhere when given an absolute
/// path. Environment variable references are expanded first. A relative path
/// may not climb out of `main`.
///
/// Arguments: the folder path.
#[derive(Debug, Default)]
pub struct CreateFolder;

impl CreateFolder {
    pub const NAME: &'static str = "Action_CreateFolder";
}

impl Action for CreateFolder {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn action(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        let expanded = expand_env_vars(ctx.arguments().trim());
        if !sanity_check_path(&expanded) {
            ctx.log(format!("Illegal folder path: {}", expanded));
            return false;
        }

        let destination = match resolve_within(ctx.workspace().main_dir(), Path::new(&expanded)) {
            Ok(destination) => destination,
            Err(e) => {
                ctx.log(format!("Illegal folder path: {}", e));
                return false;
            }
        };
        create_folder_logged(ctx, &destination)
    }
}

/// Create a folder inside the repository itself. Meant to be combined with a
/// `.gitignore` entry.
///
/// Arguments: path relative to the repository root.
#[derive(Debug, Default)]
pub struct CreateFolderInSelf;

impl CreateFolderInSelf {
    pub const NAME: &'static str = "Action_CreateFolderInSelf";
}

impl Action for CreateFolderInSelf {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn action(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        let folder = ctx.arguments().trim().to_string();
        let repo_path = ctx.repo_path().to_path_buf();
        create_folder_in(ctx, &repo_path, &folder).is_some()
    }
}

/// Create `folder` below `base` and return its path. Illegal paths, absolute
/// paths and paths leaving `base` are rejected.
pub(crate) fn create_folder_in(
    ctx: &mut ActionContext<'_>,
    base: &Path,
    folder: &str,
) -> Option<PathBuf> {
    let destination = match resolve_within(base, Path::new(folder)) {
        Ok(destination) if sanity_check_path(folder) && !Path::new(folder).is_absolute() => {
            destination
        }
        _ => {
            ctx.log(format!("Illegal folder path: {}", folder));
            return None;
        }
    };
    create_folder_logged(ctx, &destination).then_some(destination)
}

fn create_folder_logged(ctx: &mut ActionContext<'_>, destination: &Path) -> bool {
    if destination.is_dir() {
        ctx.log(format!("Folder already found at path: {}", destination.display()));
        return true;
    }
    if filesystem::path_exists(destination) {
        ctx.log(format!("Not a folder: {}", destination.display()));
        return false;
    }

    match create_folder(destination) {
        Ok(_) => {
            ctx.log(format!("Folder created at path: {}", destination.display()));
            true
        }
        Err(e) => {
            ctx.log(format!("Error creating folder: {}", e));
            false
        }
    }
}

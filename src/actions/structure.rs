use std::path::Path;

use super::{Action, ActionArguments, ActionContext};
use crate::defaults::STRUCTURE_EXCLUSIONS;
use crate::filesystem::{create_folder, recreate_linked_structure, resolve_within};

/// Recreate a folder structure at a target using hard links.
///
/// Arguments, `;`-separated:
/// - `target=<path>` (required): where the structure is recreated, relative
///   to `main` unless absolute.
/// - `source=<path>`: folder to mirror, relative to the repository unless
///   absolute. Defaults to the repository itself.
///
/// Relative paths may not climb out of their base.
/// - `exclusions=<name>;<name>...`: file or folder names to leave out, in
///   addition to `.git` and `README.md`.
#[derive(Debug, Default)]
pub struct LinkContentStructureToFolder;

impl LinkContentStructureToFolder {
    pub const NAME: &'static str = "Action_LinkContentStructureToFolder";
}

impl Action for LinkContentStructureToFolder {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn action(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        let args = ActionArguments::parse(ctx.arguments());
        let repo_name = ctx.repo_name().to_string();

        let source = match args.get("source") {
            Some(source) => match resolve_within(ctx.repo_path(), Path::new(source)) {
                Ok(source) => source,
                Err(e) => {
                    ctx.log(format!("{}: illegal source path ({})", repo_name, e));
                    return false;
                }
            },
            None => ctx.repo_path().to_path_buf(),
        };

        let Some(target) = args.get("target") else {
            ctx.log(format!(
                "{}: target-argument missing from provided argument string",
                repo_name
            ));
            return false;
        };
        let target = match resolve_within(ctx.workspace().main_dir(), Path::new(target)) {
            Ok(target) => target,
            Err(e) => {
                ctx.log(format!("{}: illegal target path ({})", repo_name, e));
                return false;
            }
        };
        if let Err(e) = create_folder(&target) {
            ctx.log(format!(
                "{}: Failed to find or create target folder ({})",
                repo_name, e
            ));
            return false;
        }

        let mut exclusions = args.list("exclusions");
        exclusions.extend(STRUCTURE_EXCLUSIONS.iter().map(|name| name.to_string()));

        if !source.is_dir() {
            ctx.log(format!("{}: source path not found", repo_name));
            return false;
        }

        match recreate_linked_structure(&source, &target, &exclusions, ctx.workspace().force()) {
            Ok(stats) => {
                ctx.log(format!(
                    "Structure linked into {}: {} files linked, {} kept",
                    target.display(),
                    stats.linked,
                    stats.skipped
                ));
                true
            }
            Err(e) => {
                ctx.log(format!("{}: failed to link structure ({})", repo_name, e));
                false
            }
        }
    }
}

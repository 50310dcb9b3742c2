use std::path::Path;

use super::folders::create_folder_in;
use super::links::link_into_directory;
use super::{Action, ActionArguments, ActionContext};
use crate::error::Result;
use crate::phases::resolve::read_dependencies;
use crate::request::VersionPolicy;

/// Link every declared dependency into a folder inside the repository.
///
/// Arguments, `;`-separated:
/// - `target=<path>` (required): folder inside the repository, created if
///   missing.
/// - `exclusions=<name>;<name>...`: dependency repository names to skip.
///
/// Each dependency's clone under `source` is linked as `<target>/<name>`.
/// A dependency whose clone is missing fails, without stopping the others.
#[derive(Debug, Default)]
pub struct LinkDependenciesIntoSelf;

impl LinkDependenciesIntoSelf {
    pub const NAME: &'static str = "Action_LinkDependenciesIntoSelf";
}

impl Action for LinkDependenciesIntoSelf {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn action(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        let args = ActionArguments::parse(ctx.arguments());
        let repo_name = ctx.repo_name().to_string();
        let repo_path = ctx.repo_path().to_path_buf();

        let Some(target) = args.get("target").map(str::to_string) else {
            ctx.log(format!(
                "{}: target-argument missing from provided argument string",
                repo_name
            ));
            return false;
        };
        let exclusions = args.list("exclusions");

        let Some(target_path) = create_folder_in(ctx, &repo_path, &target) else {
            return false;
        };

        let dependencies = match dependency_repo_names(&repo_path) {
            Ok(dependencies) => dependencies,
            Err(e) => {
                ctx.log(format!("{}: {}", repo_name, e));
                return false;
            }
        };

        let source_dir = ctx.workspace().source_dir().to_path_buf();
        let mut all_linked = true;
        for dependency in dependencies {
            if exclusions.contains(&dependency) {
                continue;
            }
            let dependency_source = source_dir.join(&dependency);
            if !dependency_source.is_dir() {
                ctx.log(format!("{}: source path ({}) not found", repo_name, dependency));
                all_linked = false;
                continue;
            }
            all_linked &= link_into_directory(ctx, &target_path, &dependency_source);
        }

        all_linked
    }
}

/// Repository names declared in `<repo>/.dependencies`, in file order.
/// A missing descriptor declares no dependencies.
pub fn dependency_repo_names(repo_path: &Path) -> Result<Vec<String>> {
    Ok(read_dependencies(repo_path, VersionPolicy::AlwaysPinned)?
        .iter()
        .map(|request| request.repo_name())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Variables;
    use crate::defaults::DEPENDENCIES_FILENAME;
    use crate::workspace::Workspace;
    use std::fs;
    use tempfile::TempDir;

    fn run(workspace: &Workspace, repo: &Path, args: &str) -> (bool, Vec<String>) {
        let mut variables = Variables::new();
        let mut ctx = ActionContext::new(workspace, repo, args, &mut variables);
        let status = LinkDependenciesIntoSelf.action(&mut ctx);
        (status, ctx.into_log())
    }

    fn seeded(temp_dir: &TempDir, dependencies: &str, present: &[&str]) -> (Workspace, std::path::PathBuf) {
        let workspace = Workspace::prepare(temp_dir.path(), false).unwrap();
        let repo = workspace.source_dir().join("App");
        fs::create_dir_all(&repo).unwrap();
        fs::write(repo.join(DEPENDENCIES_FILENAME), dependencies).unwrap();
        for name in present {
            fs::create_dir_all(workspace.source_dir().join(name)).unwrap();
        }
        (workspace, repo)
    }

    #[test]
    fn test_dependency_repo_names() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(DEPENDENCIES_FILENAME),
            "https://host/org/LibA branch=main\n\nhttps://host/org/X..LibB\n",
        )
        .unwrap();

        let names = dependency_repo_names(temp_dir.path()).unwrap();
        assert_eq!(names, vec!["LibA", "LibB"]);
    }

    #[test]
    fn test_dependency_repo_names_missing_descriptor() {
        let temp_dir = TempDir::new().unwrap();
        assert!(dependency_repo_names(temp_dir.path()).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_links_all_dependencies() {
        let temp_dir = TempDir::new().unwrap();
        let (workspace, repo) = seeded(
            &temp_dir,
            "https://host/org/LibA\nhttps://host/org/LibB\n",
            &["LibA", "LibB"],
        );

        let (status, _) = run(&workspace, &repo, "target=deps");

        assert!(status);
        assert!(crate::filesystem::is_link(&repo.join("deps/LibA")));
        assert!(crate::filesystem::is_link(&repo.join("deps/LibB")));
    }

    #[cfg(unix)]
    #[test]
    fn test_excluded_dependency_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let (workspace, repo) = seeded(
            &temp_dir,
            "https://host/org/LibA\nhttps://host/org/LibB\n",
            &["LibA"],
        );

        let (status, _) = run(&workspace, &repo, "target=deps;exclusions=LibB");

        assert!(status);
        assert!(repo.join("deps/LibA").exists());
        assert!(!repo.join("deps/LibB").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_dependency_fails_but_links_others() {
        let temp_dir = TempDir::new().unwrap();
        let (workspace, repo) = seeded(
            &temp_dir,
            "https://host/org/Missing\nhttps://host/org/LibA\n",
            &["LibA"],
        );

        let (status, log) = run(&workspace, &repo, "target=deps");

        assert!(!status);
        assert!(log.iter().any(|line| line.contains("source path (Missing) not found")));
        assert!(repo.join("deps/LibA").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_workspace_path_characters_are_not_checked() {
        let temp_dir = TempDir::new().unwrap();
        let workspace = Workspace::prepare(temp_dir.path().join("ws%1*"), false).unwrap();
        let repo = workspace.source_dir().join("App");
        fs::create_dir_all(&repo).unwrap();
        fs::write(repo.join(DEPENDENCIES_FILENAME), "https://host/org/LibA\n").unwrap();
        fs::create_dir_all(workspace.source_dir().join("LibA")).unwrap();

        let (status, log) = run(&workspace, &repo, "target=deps");

        assert!(status, "{:?}", log);
        assert!(crate::filesystem::is_link(&repo.join("deps/LibA")));
    }

    #[test]
    fn test_target_cannot_leave_repository() {
        let temp_dir = TempDir::new().unwrap();
        let (workspace, repo) = seeded(&temp_dir, "https://host/org/LibA\n", &["LibA"]);

        let (status, log) = run(&workspace, &repo, "target=../../main");

        assert!(!status);
        assert!(log[0].contains("Illegal folder path"));
    }

    #[test]
    fn test_requires_target() {
        let temp_dir = TempDir::new().unwrap();
        let (workspace, repo) = seeded(&temp_dir, "", &[]);

        let (status, log) = run(&workspace, &repo, "");

        assert!(!status);
        assert!(log[0].contains("target-argument missing"));
    }

    #[test]
    fn test_no_dependencies_is_success() {
        let temp_dir = TempDir::new().unwrap();
        let (workspace, repo) = seeded(&temp_dir, "", &[]);

        let (status, _) = run(&workspace, &repo, "target=deps");

        assert!(status);
        assert!(repo.join("deps").is_dir());
    }
}

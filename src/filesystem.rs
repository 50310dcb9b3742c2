//! Host filesystem operations used by clones and post-clone actions
//!
//! Directory links are symlinks on Unix and directory junctions on Windows,
//! which do not require elevated privileges. Links are never followed when
//! checking for existence or deleting.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::{Captures, Regex};
use walkdir::WalkDir;

use crate::defaults::FORBIDDEN_PATH_CHARS;
use crate::error::{Error, Result};

/// True if anything exists at `path`, including a dangling link.
pub fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// True if `path` is a symlink or a directory junction.
pub fn is_link(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|metadata| metadata.file_type().is_symlink())
        .unwrap_or(false)
}

/// Delete whatever is at `path`. A link is removed without touching its
/// target; a directory is removed recursively.
pub fn remove_path(path: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.file_type().is_symlink() {
        remove_link(path)?;
    } else if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(unix)]
fn remove_link(path: &Path) -> std::io::Result<()> {
    fs::remove_file(path)
}

#[cfg(windows)]
fn remove_link(path: &Path) -> std::io::Result<()> {
    // Directory symlinks and junctions are directories to the Windows API
    fs::remove_dir(path).or_else(|_| fs::remove_file(path))
}

/// Create `path` and any missing parents. Returns `false` if it already existed.
pub fn create_folder(path: &Path) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path)?;
    Ok(true)
}

/// Create a directory link at `link` pointing to `target`, creating the
/// parent of `link` if needed.
pub fn create_dir_link(link: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = link.parent() {
        fs::create_dir_all(parent)?;
    }
    platform_dir_link(link, target)
}

#[cfg(unix)]
fn platform_dir_link(link: &Path, target: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link)?;
    Ok(())
}

#[cfg(windows)]
fn platform_dir_link(link: &Path, target: &Path) -> Result<()> {
    use std::process::Command;

    let output = Command::new("cmd")
        .args(["/C", "mklink", "/J"])
        .arg(link)
        .arg(target)
        .output()?;
    if !output.status.success() {
        return Err(Error::Path {
            message: format!(
                "mklink /J {} {} failed: {}",
                link.display(),
                target.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }
    Ok(())
}

/// A path argument is legal if it contains none of the forbidden characters.
pub fn sanity_check_path(path: &str) -> bool {
    !path.contains(FORBIDDEN_PATH_CHARS)
}

fn env_var_regex() -> Option<&'static Regex> {
    static ENV_VAR: OnceLock<Option<Regex>> = OnceLock::new();
    ENV_VAR
        .get_or_init(|| {
            Regex::new(
                r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)|%([A-Za-z_][A-Za-z0-9_()]*)%",
            )
            .ok()
        })
        .as_ref()
}

/// Expand `$NAME`, `${NAME}` and `%NAME%` references from the process
/// environment. References to unset variables are left unchanged.
pub fn expand_env_vars(input: &str) -> String {
    let Some(pattern) = env_var_regex() else {
        return input.to_string();
    };
    pattern
        .replace_all(input, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or_default();
            std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Like [`resolve_against`], but a relative `path` must stay below `base`.
///
/// `.` components are dropped and `..` steps back within `path` itself.
/// Stepping above `base` is an error, as is a relative path that still names
/// a root or drive.
pub fn resolve_within(base: &Path, path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let mut relative = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => relative.push(part),
            Component::ParentDir => {
                if !relative.pop() {
                    return Err(Error::Path {
                        message: format!("{} leaves {}", path.display(), base.display()),
                    });
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::Path {
                    message: format!("{} is neither relative nor absolute", path.display()),
                });
            }
        }
    }
    Ok(base.join(relative))
}

/// Counters reported by [`recreate_linked_structure`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LinkStats {
    pub directories: usize,
    pub linked: usize,
    pub skipped: usize,
}

fn is_hidden_or_private(name: &str) -> bool {
    name.starts_with('_') || name.starts_with('.')
}

/// Recreate the directory structure of `source` below `target`, hard-linking
/// every regular file.
///
/// Entries named in `exclusions`, and entries whose name begins with `_` or
/// `.`, are skipped (excluded directories are not descended into). A target
/// file that already exists is replaced only when `force` is set.
pub fn recreate_linked_structure(
    source: &Path,
    target: &Path,
    exclusions: &[String],
    force: bool,
) -> Result<LinkStats> {
    if !source.is_dir() {
        return Err(Error::Path {
            message: format!("Source path does not exist: {}", source.display()),
        });
    }
    fs::create_dir_all(target)?;

    let mut stats = LinkStats::default();
    let walker = WalkDir::new(source).into_iter().filter_entry(|entry| {
        if entry.depth() == 0 {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        !is_hidden_or_private(&name) && !exclusions.iter().any(|excluded| *excluded == name)
    });

    for entry in walker {
        let entry = entry?;
        if entry.depth() == 0 {
            continue;
        }
        let relative = entry.path().strip_prefix(source).map_err(|e| Error::Path {
            message: e.to_string(),
        })?;
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)?;
            stats.directories += 1;
        } else if entry.file_type().is_file() {
            if path_exists(&destination) {
                if !force {
                    stats.skipped += 1;
                    continue;
                }
                fs::remove_file(&destination)?;
            }
            fs::hard_link(entry.path(), &destination)?;
            stats.linked += 1;
        }
    }

    Ok(stats)
}

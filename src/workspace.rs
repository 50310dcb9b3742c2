//! The workspace layout: `<root>/main` holds the linked view that people work
//! in, `<root>/source` holds the raw clones.

use std::path::{Path, PathBuf};

use log::info;

use crate::defaults::{MAIN_DIRNAME, SOURCE_DIRNAME};
use crate::error::Result;
use crate::filesystem::create_folder;

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    main_dir: PathBuf,
    source_dir: PathBuf,
    force: bool,
}

impl Workspace {
    /// Describe the workspace at `root` without touching the disk.
    pub fn new(root: impl Into<PathBuf>, force: bool) -> Self {
        let root = root.into();
        Self {
            main_dir: root.join(MAIN_DIRNAME),
            source_dir: root.join(SOURCE_DIRNAME),
            root,
            force,
        }
    }

    /// Describe the workspace at `root` and create its `main` and `source`
    /// folders if they are missing.
    pub fn prepare(root: impl Into<PathBuf>, force: bool) -> Result<Self> {
        let workspace = Self::new(root, force);
        create_folder(&workspace.main_dir)?;
        create_folder(&workspace.source_dir)?;
        info!("Create target folders:");
        info!("  Main: {}", workspace.main_dir.display());
        info!("  Source: {}", workspace.source_dir.display());
        Ok(workspace)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The linked view, also the base for relative action paths.
    pub fn main_dir(&self) -> &Path {
        &self.main_dir
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Whether existing clones, links and files may be replaced.
    pub fn force(&self) -> bool {
        self.force
    }
}

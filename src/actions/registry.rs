//! Name-to-action lookup table.
//!
//! The registry is populated before any action phase runs: built-in actions
//! first, then executables discovered in action directories, then factories
//! injected by the embedding program. A later registration under the same
//! name replaces the earlier one.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::dependencies::LinkDependenciesIntoSelf;
use super::external::ExternalAction;
use super::folders::{CreateFolder, CreateFolderInSelf};
use super::links::{LinkIntoMainSubFolder, LinkToFolder, LinkToMain};
use super::structure::LinkContentStructureToFolder;
use super::Action;

/// Constructor for an injected action.
pub type ActionFactory = Box<dyn Fn() -> Box<dyn Action>>;

#[derive(Default)]
pub struct ActionRegistry {
    actions: BTreeMap<String, Box<dyn Action>>,
}

impl ActionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in action.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(CreateFolder));
        registry.register(Box::new(CreateFolderInSelf));
        registry.register(Box::new(LinkToMain));
        registry.register(Box::new(LinkToFolder));
        registry.register(Box::new(LinkIntoMainSubFolder));
        registry.register(Box::new(LinkContentStructureToFolder));
        registry.register(Box::new(LinkDependenciesIntoSelf));
        registry
    }

    /// Built-ins, then every action directory in order, then `factories`.
    pub fn load(action_dirs: &[PathBuf], factories: &[ActionFactory]) -> Self {
        let mut registry = Self::with_builtins();
        for dir in action_dirs {
            let found = registry.scan_directory(dir);
            debug!("{} action(s) found in {}", found, dir.display());
        }
        for factory in factories {
            registry.register_factory(factory);
        }
        registry
    }

    /// Register `action` under its own name, returning the action it replaced.
    pub fn register(&mut self, action: Box<dyn Action>) -> Option<Box<dyn Action>> {
        let name = action.name().to_string();
        let replaced = self.actions.insert(name.clone(), action);
        if replaced.is_some() {
            debug!("Action {} replaced by a later registration", name);
        }
        replaced
    }

    pub fn register_factory(&mut self, factory: &ActionFactory) -> Option<Box<dyn Action>> {
        self.register(factory())
    }

    /// Register every executable file in `dir`. Returns how many were found.
    ///
    /// Entries are visited in name order. A missing or unreadable directory
    /// contributes nothing.
    pub fn scan_directory(&mut self, dir: &Path) -> usize {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Skipping action directory {}: {}", dir.display(), e);
                return 0;
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .collect();
        paths.sort();

        let mut found = 0;
        for path in paths {
            if let Some(action) = ExternalAction::from_path(&path) {
                self.register(Box::new(action));
                found += 1;
            }
        }
        found
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn Action + 'static)> {
        self.actions.get_mut(name).map(|action| action.as_mut())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

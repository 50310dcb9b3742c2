//! # Multiclone Library
//!
//! This library provisions a local workspace from a set of git repositories.
//! It clones the requested repositories, follows the dependencies each of
//! them declares until nothing new turns up, and then runs the post-clone
//! actions every repository describes for itself. It is used by the
//! `multiclone` command-line tool but can be embedded by other programs, for
//! instance to register additional actions.
//!
//! ## Quick Example
//!
//! ```
//! use multiclone::request::{parse_requests, RequestOrigin, VersionPolicy};
//!
//! let requests = parse_requests(
//!     "https://github.com/org/App branch=main;https://github.com/org/Lib",
//!     ';',
//!     VersionPolicy::AlwaysNewest,
//!     RequestOrigin::Root,
//! );
//!
//! assert_eq!(requests.len(), 2);
//! assert_eq!(requests[0].branch, None);
//! assert_eq!(requests[1].repo_name(), "Lib");
//! ```
//!
//! ## Core Concepts
//!
//! - **Requests (`request`)**: the `<url> [branch=<name>] [commit=<id>]`
//!   grammar and the version policy that decides which pins are honored.
//! - **Repository Management (`repository`, `git`)**: validates URLs and
//!   clones into `<workspace>/source/<name>`, skipping clones that already
//!   exist unless forced.
//! - **Workspace (`workspace`, `filesystem`)**: the `main` and `source`
//!   folders and the filesystem operations actions are built from.
//! - **Actions (`actions`)**: named units of post-clone work, looked up in an
//!   `ActionRegistry` that holds the built-ins, executables found in action
//!   directories and injected factories.
//! - **Phases (`phases`)**: closure resolution, the action descriptor
//!   interpreter and the orchestrator that runs them in order.
//!
//! ## Execution Flow
//!
//! 1. **Resolution**: clone the root requests, then every dependency listed
//!    in a `.dependencies` file, pass by pass, each URL once.
//! 2. **Evaluation**: abort if no root clone was attempted or all failed.
//! 3. **Default links**: repositories without action descriptors are linked
//!    into `main` under their own name.
//! 4. **Actions**: run `.postcloneactions_initial`, `.postcloneactions` and
//!    `.postcloneactions_final` over every cloned repository, in that order.

pub mod actions;
pub mod config;
pub mod defaults;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod output;
pub mod phases;
pub mod repository;
pub mod request;
pub mod workspace;

#[cfg(test)]
mod closure_proptest;

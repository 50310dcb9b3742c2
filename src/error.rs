//! # Error Handling
//!
//! This module defines the centralized error type for `multiclone`. It uses
//! the `thiserror` library to describe every failure the library can report
//! with a clear message.
//!
//! Note that most per-unit failures never travel as `Err` values past the
//! unit that produced them. A failed clone is recorded on its
//! [`CloneRecord`](crate::phases::resolve::CloneRecord) and a failed action
//! line is recorded on its report; both are aggregated as booleans. The
//! variants here surface as `Err` only for workspace setup, configuration,
//! and the top-level abort condition, or they are carried inside an outcome
//! so the log can explain what went wrong.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for multiclone operations
#[derive(Error, Debug)]
pub enum Error {
    /// The URL does not look like a clonable repository URL.
    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    /// The VCS client failed to clone a repository.
    #[error("Git clone error for {url}: {message}")]
    GitClone { url: String, message: String },

    /// A git command other than the initial clone failed.
    #[error("Git command failed for {url}: {command} - {stderr}")]
    GitCommand {
        command: String,
        url: String,
        stderr: String,
    },

    /// Another URL's clone already occupies the destination folder.
    #[error("Destination {} already used by {url}", path.display())]
    DestinationTaken { path: PathBuf, url: String },

    /// A dependency or action descriptor file could not be read.
    #[error("Descriptor error in {}: {message}", path.display())]
    Descriptor { path: PathBuf, message: String },

    /// The workspace settings file could not be parsed.
    #[error("Configuration parsing error: {message}")]
    ConfigParse { message: String },

    /// An unknown version resolution policy was requested.
    #[error("Unknown version action: {value} (expected 1, 2, 3 or a policy name)")]
    VersionPolicy { value: String },

    /// A path failed validation or could not be resolved.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// The pipeline cannot continue: no clone was performed or every root clone failed.
    #[error("{message}")]
    WorkspaceAbort { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A directory traversal error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

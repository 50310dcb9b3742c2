//! # CLI Command Implementations
//!
//! `multiclone` has a single command surface, the clone pipeline, kept in
//! its own module like a subcommand would be:
//! - an `Args` struct deriving `clap::Args`,
//! - an `execute` function that takes the parsed arguments and calls into
//!   the `multiclone` library.

pub mod clone;

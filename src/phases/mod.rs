//! The stages of a multiclone run.
//!
//! ## Overview
//!
//! A run has two halves:
//! 1. Resolution - clone the requested repositories, then everything they
//!    declare in their `.dependencies` descriptors, until nothing new turns
//!    up ([`resolve`]).
//! 2. Post-clone actions - interpret the action descriptors of every
//!    successfully cloned repository, in three ordered phases ([`actions`]).
//!
//! [`orchestrator`] ties the two together, handles the abort conditions and
//! links repositories without any descriptor into `main`.

use std::fmt;

use crate::defaults::{ACTIONS_FILENAME, ACTIONS_FINAL_FILENAME, ACTIONS_INITIAL_FILENAME};

pub mod actions;
pub mod orchestrator;
pub mod resolve;

/// One of the three ordered action phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionPhase {
    Initial,
    Main,
    Final,
}

impl ActionPhase {
    /// Every phase, in execution order.
    pub const ALL: [ActionPhase; 3] = [ActionPhase::Initial, ActionPhase::Main, ActionPhase::Final];

    /// Reserved descriptor filename at the repository root.
    pub fn descriptor_filename(self) -> &'static str {
        match self {
            ActionPhase::Initial => ACTIONS_INITIAL_FILENAME,
            ActionPhase::Main => ACTIONS_FILENAME,
            ActionPhase::Final => ACTIONS_FINAL_FILENAME,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActionPhase::Initial => "initial",
            ActionPhase::Main => "main",
            ActionPhase::Final => "final",
        }
    }
}

impl fmt::Display for ActionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

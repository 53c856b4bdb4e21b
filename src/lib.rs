//! # Grove
//!
//! A CLI tool for managing git worktrees as sibling directories of the main
//! checkout. Each worktree lives next to the repository as
//! `<project>-<branch>`, and branches move between worktrees by local
//! merging rather than by round-tripping through a remote.
//!
//! ## Quick Start
//!
//! ```bash
//! # Create a sibling worktree on a new branch
//! grove create feature-x
//!
//! # Show every worktree and its uncommitted-change count
//! grove status
//!
//! # Merge another worktree's branch into the current one
//! grove pull feature-x
//!
//! # Merge the current branch back into main
//! grove push
//!
//! # Remove a worktree (and optionally its branch)
//! grove remove feature-x
//! ```
//!
//! ## Module Structure
//!
//! - [`cli`] - Raw-argument command router (prefix matched, order sensitive)
//! - [`commands`] - Individual command implementations (create, status, pull, push, remove)
//! - [`config`] - Handles `.grove.toml` for the default branch and setup-file patterns
//! - [`git`] - Git operations wrapper using the git2 crate
//! - [`naming`] - Branch-name validation and sibling-directory derivation
//! - [`selection`] - Abstracts interactive prompts for testability
//! - [`traits`] - Defines the GitOperations trait for testability and abstraction

pub mod cli;
pub mod commands;
pub mod config;
pub mod git;
pub mod naming;
pub mod selection;
pub mod traits;

pub use anyhow::Result;

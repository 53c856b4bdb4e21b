//! The [`GitOperations`] seam between command handlers and git.
//!
//! Handlers only consume git as a set of black-box operations and interpret
//! their success/failure/conflict outcomes. Keeping that surface behind a
//! trait lets unit tests script outcomes and assert on the exact operation
//! sequence a handler performed.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::git::{MergeOutcome, WorktreeInfo};

/// Git operations the command handlers depend on.
pub trait GitOperations {
    fn workdir(&self) -> PathBuf;
    fn main_workdir(&self) -> Result<PathBuf>;
    fn current_branch(&self) -> Result<String>;
    fn branch_exists(&self, branch_name: &str) -> Result<bool>;
    fn list_local_branches(&self) -> Result<Vec<String>>;
    fn dirty_count(&self) -> Result<usize>;
    fn list_worktrees(&self) -> Result<Vec<WorktreeInfo>>;
    fn create_worktree(&self, branch_name: &str, worktree_path: &Path) -> Result<()>;
    fn remove_worktree(&self, worktree_name: &str) -> Result<()>;
    fn delete_branch(&self, branch_name: &str) -> Result<()>;
    fn merge_branch(&self, branch_name: &str) -> Result<MergeOutcome>;
    fn checkout_branch(&self, branch_name: &str) -> Result<()>;
}

/// Scripted in-memory git for handler tests.
///
/// Records every mutating call in order, so tests can assert both what
/// happened and that nothing happened (e.g. push must perform zero git
/// operations when the tree is dirty).
#[derive(Default)]
pub struct MockGit {
    pub workdir: PathBuf,
    pub current_branch: String,
    pub branches: Vec<String>,
    pub dirty_count: usize,
    pub worktrees: Vec<WorktreeInfo>,
    /// Branch names whose merge is scripted to conflict.
    pub conflicting_branches: Vec<String>,
    /// Branch names whose checkout is scripted to fail.
    pub failing_checkouts: Vec<String>,
    /// Branch names whose deletion is scripted to be refused (unmerged).
    pub unmerged_branches: Vec<String>,
    pub calls: std::cell::RefCell<Vec<String>>,
}

impl MockGit {
    pub fn new(current_branch: impl Into<String>, branches: &[&str]) -> Self {
        Self {
            workdir: PathBuf::from("/mock/project"),
            current_branch: current_branch.into(),
            branches: branches.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    /// The recorded operation log.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl GitOperations for MockGit {
    fn workdir(&self) -> PathBuf {
        self.workdir.clone()
    }

    fn main_workdir(&self) -> Result<PathBuf> {
        Ok(self.workdir.clone())
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self.current_branch.clone())
    }

    fn branch_exists(&self, branch_name: &str) -> Result<bool> {
        Ok(self.branches.iter().any(|b| b == branch_name))
    }

    fn list_local_branches(&self) -> Result<Vec<String>> {
        Ok(self.branches.clone())
    }

    fn dirty_count(&self) -> Result<usize> {
        Ok(self.dirty_count)
    }

    fn list_worktrees(&self) -> Result<Vec<WorktreeInfo>> {
        Ok(self.worktrees.clone())
    }

    fn create_worktree(&self, branch_name: &str, worktree_path: &Path) -> Result<()> {
        self.record(format!(
            "create_worktree {} {}",
            branch_name,
            worktree_path.display()
        ));
        Ok(())
    }

    fn remove_worktree(&self, worktree_name: &str) -> Result<()> {
        self.record(format!("remove_worktree {}", worktree_name));
        Ok(())
    }

    fn delete_branch(&self, branch_name: &str) -> Result<()> {
        self.record(format!("delete_branch {}", branch_name));
        if self.unmerged_branches.iter().any(|b| b == branch_name) {
            anyhow::bail!(
                "Branch '{}' is not fully merged; its commits would be lost",
                branch_name
            );
        }
        Ok(())
    }

    fn merge_branch(&self, branch_name: &str) -> Result<MergeOutcome> {
        self.record(format!("merge {}", branch_name));
        if self.conflicting_branches.iter().any(|b| b == branch_name) {
            Ok(MergeOutcome::Conflict)
        } else {
            Ok(MergeOutcome::Merged)
        }
    }

    fn checkout_branch(&self, branch_name: &str) -> Result<()> {
        self.record(format!("checkout {}", branch_name));
        if self.failing_checkouts.iter().any(|b| b == branch_name) {
            anyhow::bail!("Failed to check out branch '{}'", branch_name);
        }
        Ok(())
    }
}

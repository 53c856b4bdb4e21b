use anyhow::{Context, Result};
use git2::{BranchType, Repository, StatusOptions};
use std::path::{Path, PathBuf};

use crate::traits::GitOperations;

/// What a merge attempt did to the current branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Nothing to do; the branch is already contained in HEAD.
    UpToDate,
    /// HEAD moved forward without a merge commit.
    FastForward,
    /// A merge commit was created.
    Merged,
    /// Conflicting changes; the index and working tree are left mid-merge
    /// for manual resolution.
    Conflict,
}

/// A snapshot of one working tree, rebuilt from live git state on every
/// query. Never cached: other worktrees may be edited between invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeInfo {
    pub path: PathBuf,
    pub branch: String,
    pub dirty_count: usize,
}

pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    /// Opens the git repository containing the specified path.
    ///
    /// # Errors
    /// Returns an error if the path is not inside a git repository.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path).context("Failed to find git repository")?;
        Ok(Self { repo })
    }

    /// The working directory of the checkout this repository was opened in.
    #[must_use]
    pub fn workdir(&self) -> &Path {
        self.repo.workdir().unwrap_or_else(|| self.repo.path())
    }

    /// The working directory of the main checkout, even when grove runs
    /// inside a linked worktree.
    ///
    /// # Errors
    /// Returns an error if the main repository cannot be opened.
    pub fn main_workdir(&self) -> Result<PathBuf> {
        let main_repo =
            Repository::open(self.repo.commondir()).context("Failed to open main repository")?;
        Ok(main_repo
            .workdir()
            .unwrap_or_else(|| main_repo.path())
            .to_path_buf())
    }

    /// Name of the branch currently checked out here.
    ///
    /// # Errors
    /// Returns an error if HEAD is unborn or detached.
    pub fn current_branch(&self) -> Result<String> {
        let head = self.repo.head().context("Failed to read HEAD")?;
        if !head.is_branch() {
            anyhow::bail!("HEAD is detached; check out a branch first");
        }
        head.shorthand()
            .map(ToString::to_string)
            .context("Current branch has no readable name")
    }

    /// Checks if a local branch exists.
    ///
    /// # Errors
    /// Returns an error if git operations fail.
    pub fn branch_exists(&self, branch_name: &str) -> Result<bool> {
        match self.repo.find_branch(branch_name, BranchType::Local) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Lists local branch names in libgit2's listing order (lexicographic).
    ///
    /// # Errors
    /// Returns an error if git operations fail.
    pub fn list_local_branches(&self) -> Result<Vec<String>> {
        let branches = self.repo.branches(Some(BranchType::Local))?;
        let mut branch_names = Vec::new();

        for branch_result in branches {
            let (branch, _) = branch_result?;
            if let Some(name) = branch.name()? {
                branch_names.push(name.to_string());
            }
        }

        Ok(branch_names)
    }

    /// Counts uncommitted changes in this checkout, untracked files included.
    ///
    /// # Errors
    /// Returns an error if the status query fails.
    pub fn dirty_count(&self) -> Result<usize> {
        count_changes(&self.repo)
    }

    /// Enumerates every working tree of this repository: the main checkout
    /// first, then each registered linked worktree whose directory still
    /// exists. Each entry is freshly queried.
    ///
    /// # Errors
    /// Returns an error if git operations fail.
    pub fn list_worktrees(&self) -> Result<Vec<WorktreeInfo>> {
        let mut infos = vec![worktree_info_at(&self.main_workdir()?)?];

        for name in self.repo.worktrees()?.iter().flatten() {
            let worktree = self.repo.find_worktree(name)?;
            let path = worktree.path().to_path_buf();
            if path.exists() {
                infos.push(worktree_info_at(&path)?);
            }
        }

        Ok(infos)
    }

    /// Creates a new branch at HEAD and a worktree for it at the given path.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The branch already exists
    /// - The worktree cannot be created
    pub fn create_worktree(&self, branch_name: &str, worktree_path: &Path) -> Result<()> {
        let head_commit = self.repo.head()?.peel_to_commit()?;
        self.repo
            .branch(branch_name, &head_commit, false)
            .with_context(|| format!("Failed to create branch '{}'", branch_name))?;

        let branch = self
            .repo
            .find_branch(branch_name, BranchType::Local)
            .with_context(|| format!("Failed to find branch '{}'", branch_name))?;

        // Use the directory name as the worktree name to avoid filesystem conflicts
        let worktree_name = worktree_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(branch_name);

        let mut opts = git2::WorktreeAddOptions::new();
        opts.reference(Some(branch.get()));

        self.repo
            .worktree(worktree_name, worktree_path, Some(&opts))
            .with_context(|| {
                format!("Failed to create worktree at {}", worktree_path.display())
            })?;

        Ok(())
    }

    /// Removes a worktree registration.
    ///
    /// # Errors
    /// Returns an error if git operations fail.
    pub fn remove_worktree(&self, worktree_name: &str) -> Result<()> {
        let worktree = self.repo.find_worktree(worktree_name)?;
        worktree.prune(Some(git2::WorktreePruneOptions::new().valid(true)))?;
        Ok(())
    }

    /// Deletes a local branch, refusing when the branch is checked out or
    /// carries commits not reachable from HEAD. libgit2 would happily delete
    /// an unmerged branch, so the "not fully merged" refusal is enforced
    /// here.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The branch doesn't exist
    /// - The branch is checked out or not fully merged
    pub fn delete_branch(&self, branch_name: &str) -> Result<()> {
        let mut branch = self.repo.find_branch(branch_name, BranchType::Local)?;

        if branch.is_head() {
            anyhow::bail!("Cannot delete the currently checked-out branch");
        }

        let branch_commit = branch.get().peel_to_commit()?;
        let head_commit = self.repo.head()?.peel_to_commit()?;
        let is_merged = self
            .repo
            .merge_base(branch_commit.id(), head_commit.id())
            .map(|base| base == branch_commit.id())
            .unwrap_or(false);

        if !is_merged {
            anyhow::bail!(
                "Branch '{}' is not fully merged; its commits would be lost",
                branch_name
            );
        }

        branch.delete()?;
        Ok(())
    }

    /// Merges a local branch into the current branch.
    ///
    /// Fast-forwards when possible, otherwise creates a merge commit. On
    /// conflict the index and working tree are left mid-merge and no cleanup
    /// is attempted.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The branch doesn't exist
    /// - Git operations fail
    pub fn merge_branch(&self, branch_name: &str) -> Result<MergeOutcome> {
        let branch = self
            .repo
            .find_branch(branch_name, BranchType::Local)
            .with_context(|| format!("Branch '{}' does not exist", branch_name))?;
        let annotated = self.repo.reference_to_annotated_commit(branch.get())?;

        let (analysis, _) = self.repo.merge_analysis(&[&annotated])?;

        if analysis.contains(git2::MergeAnalysis::ANALYSIS_UP_TO_DATE) {
            return Ok(MergeOutcome::UpToDate);
        }

        if analysis.contains(git2::MergeAnalysis::ANALYSIS_FASTFORWARD) {
            let target = self.repo.find_commit(annotated.id())?;
            let mut head_ref = self.repo.head()?;
            head_ref.set_target(target.id(), "merge: fast-forward")?;
            // Without explicit options libgit2 treats the checkout as a dry
            // run, leaving the index and working tree behind the moved ref.
            let mut checkout = git2::build::CheckoutBuilder::new();
            checkout.safe();
            self.repo.checkout_head(Some(&mut checkout))?;
            return Ok(MergeOutcome::FastForward);
        }

        self.repo.merge(&[&annotated], None, None)?;

        if self.repo.index()?.has_conflicts() {
            Ok(MergeOutcome::Conflict)
        } else {
            self.commit_merge(branch_name)?;
            Ok(MergeOutcome::Merged)
        }
    }

    fn commit_merge(&self, branch_name: &str) -> Result<()> {
        let mut index = self.repo.index()?;
        let oid = index.write_tree()?;
        let tree = self.repo.find_tree(oid)?;

        let head = self.repo.head()?.peel_to_commit()?;
        let branch = self.repo.find_branch(branch_name, BranchType::Local)?;
        let branch_commit = branch.get().peel_to_commit()?;

        let signature = self.repo.signature()?;
        let message = format!("Merge branch '{}'", branch_name);

        self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            &message,
            &tree,
            &[&head, &branch_commit],
        )?;

        self.repo.cleanup_state()?;
        Ok(())
    }

    /// Switches this checkout to another branch.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The branch doesn't exist
    /// - The checkout would clobber local changes
    pub fn checkout_branch(&self, branch_name: &str) -> Result<()> {
        let refname = format!("refs/heads/{}", branch_name);
        let obj = self
            .repo
            .revparse_single(&refname)
            .with_context(|| format!("Branch '{}' does not exist", branch_name))?;

        // Explicit safe options: the default is a dry run that would move
        // HEAD without materializing the branch's files.
        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.safe();
        self.repo
            .checkout_tree(&obj, Some(&mut checkout))
            .with_context(|| format!("Failed to check out branch '{}'", branch_name))?;
        self.repo.set_head(&refname)?;
        Ok(())
    }
}

/// Builds a [`WorktreeInfo`] by opening the repository at a worktree path.
fn worktree_info_at(path: &Path) -> Result<WorktreeInfo> {
    let repo = Repository::open(path)
        .with_context(|| format!("Failed to open worktree at {}", path.display()))?;

    let branch = match repo.head() {
        Ok(head) if head.is_branch() => head
            .shorthand()
            .map(ToString::to_string)
            .unwrap_or_else(|| "(unknown)".to_string()),
        _ => "(detached)".to_string(),
    };

    let dirty_count = count_changes(&repo)?;

    Ok(WorktreeInfo {
        path: path.to_path_buf(),
        branch,
        dirty_count,
    })
}

fn count_changes(repo: &Repository) -> Result<usize> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true);
    opts.recurse_untracked_dirs(true);

    let statuses = repo.statuses(Some(&mut opts))?;
    Ok(statuses.len())
}

impl GitOperations for GitRepo {
    fn workdir(&self) -> PathBuf {
        self.workdir().to_path_buf()
    }

    fn main_workdir(&self) -> Result<PathBuf> {
        self.main_workdir()
    }

    fn current_branch(&self) -> Result<String> {
        self.current_branch()
    }

    fn branch_exists(&self, branch_name: &str) -> Result<bool> {
        self.branch_exists(branch_name)
    }

    fn list_local_branches(&self) -> Result<Vec<String>> {
        self.list_local_branches()
    }

    fn dirty_count(&self) -> Result<usize> {
        self.dirty_count()
    }

    fn list_worktrees(&self) -> Result<Vec<WorktreeInfo>> {
        self.list_worktrees()
    }

    fn create_worktree(&self, branch_name: &str, worktree_path: &Path) -> Result<()> {
        self.create_worktree(branch_name, worktree_path)
    }

    fn remove_worktree(&self, worktree_name: &str) -> Result<()> {
        self.remove_worktree(worktree_name)
    }

    fn delete_branch(&self, branch_name: &str) -> Result<()> {
        self.delete_branch(branch_name)
    }

    fn merge_branch(&self, branch_name: &str) -> Result<MergeOutcome> {
        self.merge_branch(branch_name)
    }

    fn checkout_branch(&self, branch_name: &str) -> Result<()> {
        self.checkout_branch(branch_name)
    }
}

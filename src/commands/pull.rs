use anyhow::Result;

use crate::git::{GitRepo, MergeOutcome};
use crate::selection::{RealSelectionProvider, SelectionProvider};
use crate::traits::GitOperations;

/// Meta-option offered by the interactive picker.
const ALL_OPTION: &str = "All branches";

/// Merges one named branch into the current branch.
///
/// # Errors
/// Returns an error if:
/// - The branch doesn't exist or is the current branch
/// - The merge conflicts (files are left mid-merge for manual resolution)
/// - Git operations fail
pub fn pull_branch(branch: &str) -> Result<()> {
    let current_dir = std::env::current_dir()?;
    let git_repo = GitRepo::open(&current_dir)?;
    pull_branch_with_git(&git_repo, branch)
}

pub fn pull_branch_with_git(git_repo: &dyn GitOperations, branch: &str) -> Result<()> {
    let current = git_repo.current_branch()?;

    if branch == current {
        anyhow::bail!("'{}' is the current branch; nothing to pull", branch);
    }
    if !git_repo.branch_exists(branch)? {
        anyhow::bail!("Branch '{}' does not exist", branch);
    }

    merge_one(git_repo, branch, &current)
}

/// Merges every other local branch into the current branch, in listing
/// order, halting at the first conflict.
///
/// # Errors
/// Returns an error if a merge conflicts or git operations fail. Branches
/// after the conflicting one are not attempted.
pub fn pull_all() -> Result<()> {
    let current_dir = std::env::current_dir()?;
    let git_repo = GitRepo::open(&current_dir)?;
    pull_all_with_git(&git_repo)
}

pub fn pull_all_with_git(git_repo: &dyn GitOperations) -> Result<()> {
    let current = git_repo.current_branch()?;
    let others = other_branches(git_repo, &current)?;

    if others.is_empty() {
        println!("No other branches to pull.");
        return Ok(());
    }

    merge_sequence(git_repo, &others, &current)
}

/// Interactive variant: multi-select over the other branches, with an
/// "All branches" meta-option that degrades to [`pull_all`].
///
/// # Errors
/// Returns an error if prompting fails, a merge conflicts, or git
/// operations fail.
pub fn pull_interactive() -> Result<()> {
    let current_dir = std::env::current_dir()?;
    let git_repo = GitRepo::open(&current_dir)?;
    pull_interactive_with(&git_repo, &RealSelectionProvider)
}

pub fn pull_interactive_with(
    git_repo: &dyn GitOperations,
    provider: &dyn SelectionProvider,
) -> Result<()> {
    let current = git_repo.current_branch()?;
    let others = other_branches(git_repo, &current)?;

    if others.is_empty() {
        println!("No other branches to pull.");
        return Ok(());
    }

    let mut options = vec![ALL_OPTION.to_string()];
    options.extend(others.iter().cloned());

    let chosen = provider.multi_select("Select branches to merge:", options)?;

    if chosen.is_empty() {
        println!("Nothing selected.");
        return Ok(());
    }

    if chosen.iter().any(|c| c == ALL_OPTION) || chosen.len() == others.len() {
        return merge_sequence(git_repo, &others, &current);
    }

    // Preserve listing order regardless of selection order.
    let selected: Vec<String> = others.into_iter().filter(|b| chosen.contains(b)).collect();
    merge_sequence(git_repo, &selected, &current)
}

fn other_branches(git_repo: &dyn GitOperations, current: &str) -> Result<Vec<String>> {
    Ok(git_repo
        .list_local_branches()?
        .into_iter()
        .filter(|b| b != current)
        .collect())
}

fn merge_sequence(git_repo: &dyn GitOperations, branches: &[String], current: &str) -> Result<()> {
    for branch in branches {
        merge_one(git_repo, branch, current)?;
    }

    println!("✓ Pulled {} branch(es) into '{}'", branches.len(), current);
    Ok(())
}

fn merge_one(git_repo: &dyn GitOperations, branch: &str, current: &str) -> Result<()> {
    println!("Merging '{}' into '{}'...", branch, current);

    match git_repo.merge_branch(branch)? {
        MergeOutcome::UpToDate => {
            println!("  Already up to date.");
            Ok(())
        }
        MergeOutcome::FastForward => {
            println!("  ✓ Fast-forwarded.");
            Ok(())
        }
        MergeOutcome::Merged => {
            println!("  ✓ Merged.");
            Ok(())
        }
        MergeOutcome::Conflict => {
            anyhow::bail!(
                "Merge conflict while merging '{}' into '{}'. \
                 Resolve the conflicts manually, commit, and retry; \
                 no further branches were attempted.",
                branch,
                current
            )
        }
    }
}

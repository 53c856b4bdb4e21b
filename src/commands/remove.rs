use anyhow::{Context, Result};
use std::fs;

use crate::git::{GitRepo, WorktreeInfo};
use crate::naming;
use crate::selection::{RealSelectionProvider, SelectionProvider};
use crate::traits::GitOperations;

/// Removes a worktree and optionally deletes the associated branch.
///
/// A dirty target requires explicit confirmation; whether to also delete the
/// branch is always asked. Deleting a branch with unmerged commits is
/// refused by the git layer and the refusal is surfaced, never forced.
///
/// # Errors
/// Returns an error if:
/// - No target was given or no matching worktree exists
/// - The target is the main checkout or the currently-occupied worktree
/// - Git operations fail
/// - Prompting fails
pub fn remove_worktree(target: Option<&str>) -> Result<()> {
    let current_dir = std::env::current_dir()?;
    let git_repo = GitRepo::open(&current_dir)?;
    remove_worktree_with(&git_repo, &RealSelectionProvider, target)
}

pub fn remove_worktree_with(
    git_repo: &dyn GitOperations,
    provider: &dyn SelectionProvider,
    target: Option<&str>,
) -> Result<()> {
    let target = target.context("Usage: grove remove <branch>")?;

    let main_workdir = git_repo.main_workdir()?;
    let project = naming::project_name(&main_workdir)?;

    let worktrees = git_repo.list_worktrees()?;
    let info = resolve_target(&worktrees, &project, target)
        .with_context(|| format!("No worktree found for '{}'", target))?;

    if info.path == main_workdir {
        anyhow::bail!("'{}' is the main checkout; refusing to remove it", target);
    }
    if info.path == git_repo.workdir() {
        anyhow::bail!(
            "You are inside the worktree for '{}'; run remove from another worktree",
            target
        );
    }

    if info.dirty_count > 0 {
        let proceed = provider.confirm(
            &format!(
                "Worktree '{}' has {} uncommitted change(s). Remove it anyway?",
                info.branch, info.dirty_count
            ),
            false,
        )?;
        if !proceed {
            println!("Aborted; worktree left untouched.");
            return Ok(());
        }
    }

    let delete_branch = provider.confirm(
        &format!("Also delete branch '{}'?", info.branch),
        false,
    )?;

    println!("Removing worktree: {}", info.path.display());

    // The registration uses the directory name, not the branch name.
    let worktree_name = info
        .path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(&info.branch);

    git_repo
        .remove_worktree(worktree_name)
        .context("Failed to remove worktree registration")?;

    if info.path.exists() {
        fs::remove_dir_all(&info.path).context("Failed to remove worktree directory")?;
    }

    if delete_branch {
        println!("Deleting branch: {}", info.branch);
        match git_repo.delete_branch(&info.branch) {
            Ok(()) => println!("✓ Branch deleted successfully"),
            Err(e) => println!("⚠ Warning: Failed to delete branch: {:#}", e),
        }
    }

    println!("✓ Worktree removed successfully!");

    Ok(())
}

/// Matches a target string against a worktree's branch name or its derived
/// directory name.
fn resolve_target<'a>(
    worktrees: &'a [WorktreeInfo],
    project: &str,
    target: &str,
) -> Option<&'a WorktreeInfo> {
    let dir_name = naming::worktree_dir_name(project, target);

    worktrees.iter().find(|info| {
        if info.branch == target {
            return true;
        }
        info.path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name == dir_name || name == target)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::selection::MockSelectionProvider;
    use crate::traits::MockGit;
    use std::path::PathBuf;

    fn mock_with_worktrees(dirty: usize) -> MockGit {
        let mut git = MockGit::new("main", &["feature-x", "main"]);
        git.worktrees = vec![
            WorktreeInfo {
                path: PathBuf::from("/mock/project"),
                branch: "main".to_string(),
                dirty_count: 0,
            },
            WorktreeInfo {
                path: PathBuf::from("/mock/project-feature-x"),
                branch: "feature-x".to_string(),
                dirty_count: dirty,
            },
        ];
        git
    }

    #[test]
    fn test_remove_requires_operand() {
        let git = mock_with_worktrees(0);
        let provider = MockSelectionProvider::new(&[], &[]);
        assert!(remove_worktree_with(&git, &provider, None).is_err());
        assert!(git.calls().is_empty());
    }

    #[test]
    fn test_remove_unknown_target_fails() {
        let git = mock_with_worktrees(0);
        let provider = MockSelectionProvider::new(&[], &[]);
        assert!(remove_worktree_with(&git, &provider, Some("nope")).is_err());
        assert!(git.calls().is_empty());
    }

    #[test]
    fn test_remove_refuses_main_checkout() {
        let git = mock_with_worktrees(0);
        let provider = MockSelectionProvider::new(&[], &[]);
        assert!(remove_worktree_with(&git, &provider, Some("main")).is_err());
        assert!(git.calls().is_empty());
    }

    #[test]
    fn test_remove_clean_worktree_and_branch() {
        let git = mock_with_worktrees(0);
        // Only the delete-branch question is asked for a clean tree.
        let provider = MockSelectionProvider::new(&[], &[true]);

        remove_worktree_with(&git, &provider, Some("feature-x")).expect("remove succeeds");
        assert_eq!(
            git.calls(),
            vec![
                "remove_worktree project-feature-x".to_string(),
                "delete_branch feature-x".to_string(),
            ]
        );
    }

    #[test]
    fn test_remove_keeps_branch_when_declined() {
        let git = mock_with_worktrees(0);
        let provider = MockSelectionProvider::new(&[], &[false]);

        remove_worktree_with(&git, &provider, Some("feature-x")).expect("remove succeeds");
        assert_eq!(
            git.calls(),
            vec!["remove_worktree project-feature-x".to_string()]
        );
    }

    #[test]
    fn test_dirty_worktree_requires_confirmation() {
        let git = mock_with_worktrees(2);
        // Decline the dirty-tree confirmation.
        let provider = MockSelectionProvider::new(&[], &[false]);

        remove_worktree_with(&git, &provider, Some("feature-x")).expect("abort is not an error");
        assert!(git.calls().is_empty());
    }

    #[test]
    fn test_dirty_worktree_removed_after_confirmation() {
        let git = mock_with_worktrees(2);
        // Confirm removal, decline branch deletion.
        let provider = MockSelectionProvider::new(&[], &[true, false]);

        remove_worktree_with(&git, &provider, Some("feature-x")).expect("remove succeeds");
        assert_eq!(
            git.calls(),
            vec!["remove_worktree project-feature-x".to_string()]
        );
    }

    #[test]
    fn test_unmerged_branch_deletion_is_surfaced_not_forced() {
        let mut git = mock_with_worktrees(0);
        git.unmerged_branches = vec!["feature-x".to_string()];
        let provider = MockSelectionProvider::new(&[], &[true]);

        // The worktree removal itself still succeeds; the refusal is a warning.
        remove_worktree_with(&git, &provider, Some("feature-x")).expect("remove succeeds");
        assert_eq!(
            git.calls(),
            vec![
                "remove_worktree project-feature-x".to_string(),
                "delete_branch feature-x".to_string(),
            ]
        );
    }

    #[test]
    fn test_remove_by_directory_name() {
        let git = mock_with_worktrees(0);
        let provider = MockSelectionProvider::new(&[], &[false]);

        remove_worktree_with(&git, &provider, Some("project-feature-x"))
            .expect("remove succeeds");
        assert_eq!(
            git.calls(),
            vec!["remove_worktree project-feature-x".to_string()]
        );
    }
}

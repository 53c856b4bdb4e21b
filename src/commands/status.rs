use anyhow::Result;

use crate::git::GitRepo;
use crate::traits::GitOperations;

/// Shows every working tree with its branch and uncommitted-change count.
///
/// Pure read: the worktree list and each dirty count are queried live on
/// every invocation.
///
/// # Errors
/// Returns an error if git operations fail.
pub fn show_status() -> Result<()> {
    let current_dir = std::env::current_dir()?;
    let git_repo = GitRepo::open(&current_dir)?;
    show_status_with_git(&git_repo)
}

pub fn show_status_with_git(git_repo: &dyn GitOperations) -> Result<()> {
    let worktrees = git_repo.list_worktrees()?;

    println!("Worktrees ({}):", worktrees.len());
    println!("{}", "=".repeat(60));
    println!("{:<28} {:>7}  PATH", "BRANCH", "CHANGES");

    for info in &worktrees {
        println!(
            "{:<28} {:>7}  {}",
            info.branch,
            info.dirty_count,
            info.path.display()
        );
    }

    Ok(())
}

use anyhow::{Context, Result};

use crate::config::GroveConfig;
use crate::git::{GitRepo, MergeOutcome};
use crate::traits::GitOperations;

/// Merges the current branch into the repository's default branch.
///
/// The merge runs inside the main checkout, which owns the default branch
/// under the sibling layout; libgit2 refuses to re-point a branch that is
/// HEAD of another checkout, so the invoking worktree never leaves its own
/// branch. When the main checkout is not on the default branch it is
/// switched there for the merge, with a guarded restore that runs whether
/// or not the merge succeeded. If the restore itself fails (a conflicted
/// index blocks checkout), that is reported rather than forced.
///
/// # Errors
/// Returns an error if:
/// - The current tree has uncommitted changes (nothing is done)
/// - The current branch is already the default branch
/// - The merge conflicts or git operations fail
pub fn push_to_default() -> Result<()> {
    let current_dir = std::env::current_dir()?;
    let git_repo = GitRepo::open(&current_dir)?;
    let main_repo = GitRepo::open(&git_repo.main_workdir()?)?;
    let config = GroveConfig::load_from_repo(&git_repo.workdir())?;
    push_with_git(&git_repo, &main_repo, config.main_branch.as_deref())
}

pub fn push_with_git(
    current_repo: &dyn GitOperations,
    main_repo: &dyn GitOperations,
    configured_target: Option<&str>,
) -> Result<()> {
    let current = current_repo.current_branch()?;

    let changes = current_repo.dirty_count()?;
    if changes > 0 {
        anyhow::bail!(
            "Working tree has {} uncommitted change(s); commit or stash them first. Nothing was done.",
            changes
        );
    }

    let target = default_branch(main_repo, configured_target)?;
    if current == target {
        anyhow::bail!("Already on '{}'; nothing to push", target);
    }

    let resident = main_repo.current_branch()?;

    println!("Merging '{}' into '{}'...", current, target);

    if resident == target {
        merge_in_place(main_repo, &current, &target)
    } else {
        merge_with_switch(main_repo, &current, &target, &resident)
    }
}

/// The common case: the main checkout already has the default branch checked
/// out, so the merge materializes there directly.
fn merge_in_place(main_repo: &dyn GitOperations, current: &str, target: &str) -> Result<()> {
    match main_repo.merge_branch(current)? {
        MergeOutcome::Conflict => {
            anyhow::bail!(
                "Merge conflict while merging '{}' into '{}'. Resolve the conflicts \
                 in the main checkout at {}.",
                current,
                target,
                main_repo.workdir().display()
            );
        }
        outcome => {
            report_outcome(outcome, current, target);
            println!("✓ Pushed '{}' to '{}'", current, target);
            Ok(())
        }
    }
}

/// The default branch is not checked out anywhere, so the main checkout is
/// switched to it for the merge and then restored.
fn merge_with_switch(
    main_repo: &dyn GitOperations,
    current: &str,
    target: &str,
    resident: &str,
) -> Result<()> {
    main_repo.checkout_branch(target)?;

    let merge_result = main_repo.merge_branch(current);
    // Guarded restore: always try to put the main checkout back.
    let restore_result = main_repo.checkout_branch(resident);

    match merge_result {
        Ok(MergeOutcome::Conflict) => {
            if restore_result.is_err() {
                anyhow::bail!(
                    "Merge conflict while merging '{}' into '{}'. The conflicted files \
                     must be resolved manually; the main checkout is left on '{}'.",
                    current,
                    target,
                    target
                );
            }
            anyhow::bail!(
                "Merge conflict while merging '{}' into '{}'. Resolve it in the main \
                 checkout; it is back on '{}'.",
                current,
                target,
                resident
            );
        }
        Ok(outcome) => {
            report_outcome(outcome, current, target);
            restore_result.with_context(|| {
                format!(
                    "Merged successfully, but failed to return the main checkout to '{}'; \
                     it is on '{}'",
                    resident, target
                )
            })?;
            println!("✓ Pushed '{}' to '{}'", current, target);
            Ok(())
        }
        Err(e) => {
            if restore_result.is_err() {
                Err(e.context(format!(
                    "Merge failed; the main checkout is left on '{}'",
                    target
                )))
            } else {
                Err(e)
            }
        }
    }
}

fn report_outcome(outcome: MergeOutcome, current: &str, target: &str) {
    match outcome {
        MergeOutcome::UpToDate => println!("  '{}' already contains '{}'.", target, current),
        MergeOutcome::FastForward => println!("  ✓ Fast-forwarded '{}'.", target),
        _ => println!("  ✓ Merged into '{}'.", target),
    }
}

/// The branch push merges into: the configured override if present, else
/// `main`, else `master`.
fn default_branch(git_repo: &dyn GitOperations, configured: Option<&str>) -> Result<String> {
    if let Some(name) = configured {
        if !git_repo.branch_exists(name)? {
            anyhow::bail!("Configured main-branch '{}' does not exist", name);
        }
        return Ok(name.to_string());
    }

    for candidate in ["main", "master"] {
        if git_repo.branch_exists(candidate)? {
            return Ok(candidate.to_string());
        }
    }

    anyhow::bail!("No 'main' or 'master' branch found; set main-branch in .grove.toml")
}

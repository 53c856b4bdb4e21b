//! Branch-name validation and sibling-directory derivation.
//!
//! Worktrees live next to the main checkout: a repository at
//! `/work/project` gets its `feature-x` worktree at `/work/project-feature-x`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Checks that a proposed branch name is syntactically usable.
///
/// This is not a full reimplementation of git's ref-name rules, just the
/// cases that would produce confusing worktree directories or that git would
/// reject outright.
///
/// # Errors
/// Returns an error describing the first violated rule.
pub fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() {
        anyhow::bail!("Branch name cannot be empty");
    }
    if name.chars().any(char::is_whitespace) {
        anyhow::bail!("Branch name cannot contain whitespace: '{}'", name);
    }
    if name.starts_with('-') {
        anyhow::bail!("Branch name cannot start with '-': '{}'", name);
    }
    if name.contains("..") {
        anyhow::bail!("Branch name cannot contain '..': '{}'", name);
    }
    if name.starts_with('/') || name.ends_with('/') {
        anyhow::bail!("Branch name cannot start or end with '/': '{}'", name);
    }
    if name.ends_with(".lock") {
        anyhow::bail!("Branch name cannot end with '.lock': '{}'", name);
    }
    if name.chars().any(|c| c.is_control() || "~^:?*[\\".contains(c)) {
        anyhow::bail!("Branch name contains characters git does not allow: '{}'", name);
    }
    Ok(())
}

/// Replaces characters that are legal in branch names but hostile in
/// directory names.
#[must_use]
pub fn sanitize_branch_name(branch_name: &str) -> String {
    branch_name.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "-")
}

/// Extracts the project name from the repository's top-level directory.
///
/// # Errors
/// Returns an error if the path has no final component.
pub fn project_name(repo_root: &Path) -> Result<String> {
    repo_root
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .context("Could not determine repository name from path")
}

/// Derives the directory name for a branch's worktree: `<project>-<branch>`.
#[must_use]
pub fn worktree_dir_name(project: &str, branch: &str) -> String {
    format!("{}-{}", project, sanitize_branch_name(branch))
}

/// Derives the sibling path for a branch's worktree.
///
/// # Errors
/// Returns an error if the repository root has no parent directory or no
/// usable name.
pub fn sibling_path(repo_root: &Path, branch: &str) -> Result<PathBuf> {
    let parent = repo_root
        .parent()
        .context("Repository has no parent directory to place worktrees in")?;
    let project = project_name(repo_root)?;
    Ok(parent.join(worktree_dir_name(&project, branch)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_branch_names() {
        for name in ["feature-x", "fix/login", "v2", "a", "release/1.2.3"] {
            assert!(validate_branch_name(name).is_ok(), "rejected '{}'", name);
        }
    }

    #[test]
    fn test_rejects_empty_and_whitespace() {
        assert!(validate_branch_name("").is_err());
        assert!(validate_branch_name("feature x").is_err());
        assert!(validate_branch_name("feature\tx").is_err());
        assert!(validate_branch_name("feature\nx").is_err());
    }

    #[test]
    fn test_rejects_git_illegal_names() {
        assert!(validate_branch_name("-flag").is_err());
        assert!(validate_branch_name("a..b").is_err());
        assert!(validate_branch_name("/leading").is_err());
        assert!(validate_branch_name("trailing/").is_err());
        assert!(validate_branch_name("x.lock").is_err());
        assert!(validate_branch_name("what?").is_err());
        assert!(validate_branch_name("star*").is_err());
    }

    #[test]
    fn test_sanitize_branch_name() {
        assert_eq!(sanitize_branch_name("feature/auth"), "feature-auth");
        assert_eq!(sanitize_branch_name("plain"), "plain");
    }

    #[test]
    fn test_sibling_path_derivation() {
        let root = Path::new("/work/project");
        let path = sibling_path(root, "feature-x").expect("valid path");
        assert_eq!(path, PathBuf::from("/work/project-feature-x"));

        let path = sibling_path(root, "fix/login").expect("valid path");
        assert_eq!(path, PathBuf::from("/work/project-fix-login"));
    }

    #[test]
    fn test_sibling_path_requires_parent() {
        assert!(sibling_path(Path::new("/"), "x").is_err());
    }
}

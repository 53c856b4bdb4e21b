#![allow(clippy::unwrap_used)]
#![allow(dead_code)] // Each integration test crate uses a subset of these helpers

//! Shared helpers for integration tests: real git repositories in temp
//! directories, driven through the compiled binary.

use anyhow::Result;
use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A test environment with a real git repository on a `main` branch.
pub struct TestEnvironment {
    // Keeps the temp directory alive for the duration of the test
    pub temp_dir: TempDir,
    pub repo_path: PathBuf,
}

impl TestEnvironment {
    /// Creates a temp git repository named `project` with one commit on
    /// `main`.
    ///
    /// # Errors
    /// Returns an error if git setup fails.
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let repo_path = temp_dir.path().join("project");
        std::fs::create_dir_all(&repo_path)?;

        git(&repo_path, &["init"])?;
        // Pin the default branch name regardless of host git configuration.
        git(&repo_path, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
        git(&repo_path, &["config", "user.name", "Test User"])?;
        git(&repo_path, &["config", "user.email", "test@example.com"])?;

        std::fs::write(repo_path.join("README.md"), "# Test Repo\n")?;
        git(&repo_path, &["add", "."])?;
        git(&repo_path, &["commit", "-m", "Initial commit"])?;

        Ok(Self {
            temp_dir,
            repo_path,
        })
    }

    /// The sibling path grove derives for a branch's worktree.
    #[must_use]
    pub fn worktree_path(&self, branch: &str) -> PathBuf {
        self.temp_dir.path().join(format!("project-{}", branch))
    }

    /// A grove invocation with the repository as working directory.
    pub fn grove(&self, args: &[&str]) -> Command {
        grove_in(&self.repo_path, args)
    }

    /// Creates a worktree through the binary and returns its path.
    ///
    /// # Errors
    /// Returns an error if the command fails.
    pub fn create_worktree(&self, branch: &str) -> Result<PathBuf> {
        self.grove(&["create", branch]).assert().success();
        Ok(self.worktree_path(branch))
    }

    /// Writes a file and commits it in the given checkout.
    ///
    /// # Errors
    /// Returns an error if git operations fail.
    pub fn commit_file(&self, dir: &Path, name: &str, content: &str, message: &str) -> Result<()> {
        std::fs::write(dir.join(name), content)?;
        git(dir, &["add", name])?;
        git(dir, &["commit", "-m", message])?;
        Ok(())
    }

    /// Current branch of a checkout.
    ///
    /// # Errors
    /// Returns an error if git operations fail.
    pub fn current_branch(&self, dir: &Path) -> Result<String> {
        let output = git_output(dir, &["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(output.trim().to_string())
    }

    /// Whether `ancestor` is reachable from `descendant`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        git(
            &self.repo_path,
            &["merge-base", "--is-ancestor", ancestor, descendant],
        )
        .is_ok()
    }
}

/// A grove invocation in an arbitrary directory (e.g. inside a worktree).
#[must_use]
pub fn grove_in(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("grove").unwrap();
    cmd.current_dir(dir).args(args);
    cmd
}

/// Runs a git command, failing the test on a non-zero exit.
pub fn git(dir: &Path, args: &[&str]) -> Result<()> {
    git_output(dir, args).map(|_| ())
}

/// Runs a git command and returns its stdout.
pub fn git_output(dir: &Path, args: &[&str]) -> Result<String> {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        // Keep host-level git configuration out of the tests
        .env("GIT_CONFIG_GLOBAL", "/dev/null")
        .env("GIT_CONFIG_SYSTEM", "/dev/null")
        .output()?;

    if !output.status.success() {
        anyhow::bail!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

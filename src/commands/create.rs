use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::GroveConfig;
use crate::git::GitRepo;
use crate::naming;
use crate::traits::GitOperations;

/// Creates a sibling worktree on a freshly created branch.
///
/// # Errors
/// Returns an error if:
/// - No branch name was given or the name is not syntactically legal
/// - A branch of that name already exists
/// - The derived sibling directory already exists
/// - Git operations fail
pub fn create_worktree(branch: Option<&str>) -> Result<()> {
    let current_dir = std::env::current_dir()?;
    let git_repo = GitRepo::open(&current_dir)?;
    create_worktree_with_git(&git_repo, branch)
}

pub fn create_worktree_with_git(git_repo: &dyn GitOperations, branch: Option<&str>) -> Result<()> {
    let branch = branch.context("Usage: grove create <branch>")?;
    naming::validate_branch_name(branch)?;

    if git_repo.branch_exists(branch)? {
        anyhow::bail!(
            "Branch '{}' already exists; pick another name or remove it first",
            branch
        );
    }

    // Sibling paths always derive from the main checkout, even when create
    // runs inside another worktree.
    let repo_root = git_repo.main_workdir()?;
    let worktree_path = naming::sibling_path(&repo_root, branch)?;

    if worktree_path.exists() {
        anyhow::bail!("Worktree path already exists: {}", worktree_path.display());
    }

    println!(
        "Creating worktree for branch '{}' at: {}",
        branch,
        worktree_path.display()
    );

    git_repo.create_worktree(branch, &worktree_path)?;

    let config = GroveConfig::load_from_repo(&repo_root)?;
    copy_setup_files(&repo_root, &worktree_path, &config)?;

    println!("✓ Worktree created successfully!");
    println!("  Branch: {}", branch);
    println!("  Path: {}", worktree_path.display());

    Ok(())
}

/// Copies configured (typically gitignored) setup files into a new worktree.
///
/// # Errors
/// Returns an error if a matched file cannot be copied.
pub fn copy_setup_files(
    source_path: &Path,
    target_path: &Path,
    config: &GroveConfig,
) -> Result<()> {
    for source_file in collect_setup_files(source_path, config)? {
        let relative_path = source_file.strip_prefix(source_path)?;
        let target_file = target_path.join(relative_path);

        if let Some(parent) = target_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if source_file.is_dir() {
            copy_tree(&source_file, &target_file)?;
            println!("  Copied directory: {}", relative_path.display());
        } else {
            std::fs::copy(&source_file, &target_file)
                .with_context(|| format!("Failed to copy {}", relative_path.display()))?;
            println!("  Copied: {}", relative_path.display());
        }
    }

    Ok(())
}

/// Resolves the copy patterns against the repository root, dropping anything
/// an exclude rule matches.
fn collect_setup_files(base_path: &Path, config: &GroveConfig) -> Result<Vec<PathBuf>> {
    let excludes = compile_excludes(&config.exclude_patterns())?;
    let mut files = Vec::new();

    for pattern in config.copy_patterns() {
        let candidates: Vec<PathBuf> = if pattern.contains('*') {
            glob::glob(&base_path.join(&pattern).to_string_lossy())?
                .collect::<Result<_, _>>()?
        } else {
            let path = base_path.join(&pattern);
            if path.exists() { vec![path] } else { Vec::new() }
        };

        for candidate in candidates {
            let relative = candidate.strip_prefix(base_path)?;
            if !is_excluded(relative, &excludes) {
                files.push(candidate);
            }
        }
    }

    Ok(files)
}

/// A trailing slash marks a directory rule that excludes any path containing
/// that component; everything else matches as a glob against the file name.
enum ExcludeRule {
    Directory(String),
    Name(glob::Pattern),
}

fn compile_excludes(patterns: &[String]) -> Result<Vec<ExcludeRule>> {
    patterns
        .iter()
        .map(|pattern| match pattern.strip_suffix('/') {
            Some(dir) => Ok(ExcludeRule::Directory(dir.to_string())),
            None => Ok(ExcludeRule::Name(glob::Pattern::new(pattern)?)),
        })
        .collect()
}

fn is_excluded(relative: &Path, rules: &[ExcludeRule]) -> bool {
    rules.iter().any(|rule| match rule {
        ExcludeRule::Directory(dir) => relative
            .components()
            .any(|c| c.as_os_str() == std::ffi::OsStr::new(dir)),
        ExcludeRule::Name(pattern) => relative
            .file_name()
            .is_some_and(|name| pattern.matches(&name.to_string_lossy())),
    })
}

fn copy_tree(source: &Path, target: &Path) -> Result<()> {
    let mut pending = vec![(source.to_path_buf(), target.to_path_buf())];

    while let Some((from, to)) = pending.pop() {
        std::fs::create_dir_all(&to)?;
        for entry in std::fs::read_dir(&from)? {
            let entry = entry?;
            let dest = to.join(entry.file_name());
            if entry.file_type()?.is_dir() {
                pending.push((entry.path(), dest));
            } else {
                std::fs::copy(entry.path(), &dest)?;
            }
        }
    }

    Ok(())
}

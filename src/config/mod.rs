//! Configuration loading for `.grove.toml`.
//!
//! Everything is optional. A missing, empty, or invalid file falls back to
//! defaults so a bad config never blocks a worktree operation.
//!
//! # Configuration Example
//!
//! ```toml
//! main-branch = "trunk"
//!
//! [setup]
//! copy = [".env*", "*.local.json"]
//! exclude = ["node_modules/"]
//! ```
//!
//! `main-branch` overrides the branch `grove push` merges into (otherwise
//! `main` then `master` is auto-detected). `[setup]` lists gitignored files
//! copied into every freshly created worktree; custom patterns are merged
//! additively with the defaults.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILE: &str = ".grove.toml";

/// Per-repository configuration loaded from `.grove.toml`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GroveConfig {
    /// Branch `grove push` merges into. Auto-detected when absent.
    #[serde(rename = "main-branch", default)]
    pub main_branch: Option<String>,

    /// Files copied into new worktrees after creation.
    #[serde(default)]
    pub setup: SetupPatterns,
}

/// Glob patterns for the post-create copy step.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SetupPatterns {
    /// Patterns to copy (merged with defaults).
    #[serde(default)]
    pub copy: Option<Vec<String>>,

    /// Patterns never copied (merged with defaults).
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
}

impl GroveConfig {
    fn default_copy_patterns() -> Vec<String> {
        vec![".env*".to_string(), "*.local.json".to_string()]
    }

    fn default_exclude_patterns() -> Vec<String> {
        vec![
            "node_modules/".to_string(),
            "target/".to_string(),
            ".git/".to_string(),
            "*.log".to_string(),
            "*.tmp".to_string(),
        ]
    }

    /// Loads configuration from a repository root, falling back to defaults
    /// when the file is missing, empty, or invalid TOML.
    ///
    /// # Errors
    /// Returns an error only if the file exists but cannot be read.
    pub fn load_from_repo(repo_path: &Path) -> Result<Self> {
        let config_path = repo_path.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        match toml::from_str::<GroveConfig>(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                eprintln!("⚠ Warning: invalid {}: {}; using defaults", CONFIG_FILE, e);
                Ok(Self::default())
            }
        }
    }

    /// Effective copy patterns: defaults plus any custom additions.
    #[must_use]
    pub fn copy_patterns(&self) -> Vec<String> {
        let mut patterns = Self::default_copy_patterns();
        if let Some(custom) = &self.setup.copy {
            for pattern in custom {
                if !patterns.contains(pattern) {
                    patterns.push(pattern.clone());
                }
            }
        }
        patterns
    }

    /// Effective exclude patterns: defaults plus any custom additions.
    #[must_use]
    pub fn exclude_patterns(&self) -> Vec<String> {
        let mut patterns = Self::default_exclude_patterns();
        if let Some(custom) = &self.setup.exclude {
            for pattern in custom {
                if !patterns.contains(pattern) {
                    patterns.push(pattern.clone());
                }
            }
        }
        patterns
    }
}

//! Configuration loading and management
//!
//! Handles parsing of `.gitlet/config.toml`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};

/// File name of the config inside the repository directory
pub const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Working-tree scanning
    #[serde(default)]
    pub worktree: WorktreeConfig,

    /// Repository lock behaviour
    #[serde(default)]
    pub lock: LockConfig,
}

/// Working-tree configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreeConfig {
    /// Glob patterns never reported as untracked and never deleted by checkout
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// Lock configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockConfig {
    /// How long a command waits for the repository lock
    #[serde(default = "default_lock_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl WorktreeConfig {
    /// Compile the ignore globs.
    pub fn ignore_patterns(&self) -> Result<Vec<glob::Pattern>> {
        self.ignore
            .iter()
            .map(|raw| {
                glob::Pattern::new(raw).map_err(|err| {
                    Error::InvalidConfig(format!("worktree.ignore: invalid pattern '{raw}': {err}"))
                })
            })
            .collect()
    }
}

impl Config {
    /// Load configuration from a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a repository directory, or return defaults
    pub fn load_from_dir(gitlet_dir: &Path) -> Result<Self> {
        let config_path = gitlet_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        lock::write_atomic_str(path, &content)
    }

    fn validate(&self) -> Result<()> {
        self.worktree.ignore_patterns()?;
        if self.lock.timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "lock.timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

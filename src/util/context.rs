//! Global context for Berth operations.
//!
//! Provides centralized access to configuration, paths, and environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::recipe::{find_recipe, RecipeNotFound};
use crate::util::config::{global_config_dir, load_config, project_config_path, Config};

/// Environment variable overriding the Berth home directory.
pub const BERTH_HOME_ENV: &str = "BERTH_HOME";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global Berth data (~/.berth/)
    home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = match std::env::var_os(BERTH_HOME_ENV) {
            Some(home) if !home.is_empty() => PathBuf::from(home),
            _ => global_config_dir().unwrap_or_else(|| PathBuf::from(".berth")),
        };

        Ok(GlobalContext {
            cwd,
            home,
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Replace the home directory.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = home;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Default package store root.
    pub fn default_store_dir(&self) -> PathBuf {
        self.home.join("store")
    }

    /// Load the merged configuration for a project rooted at `project_root`.
    pub fn load_config(&self, project_root: &Path) -> Config {
        load_config(&self.config_path(), &project_config_path(project_root))
    }

    /// Store root: the configured path, relative paths resolved against the
    /// project root, else the default under the home directory.
    pub fn store_dir(&self, config: &Config, project_root: &Path) -> PathBuf {
        match &config.store.path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => project_root.join(path),
            None => self.default_store_dir(),
        }
    }

    /// Find the recipe file starting from cwd and searching upward.
    pub fn find_recipe(&self) -> Result<PathBuf, RecipeNotFound> {
        find_recipe(&self.cwd)
    }
}

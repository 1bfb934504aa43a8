//! Configuration file support for Berth.
//!
//! Berth supports two configuration file locations:
//! - Global: `~/.berth/config.toml` - User-wide defaults
//! - Project: `.berth/config.toml` next to the recipe - Project overrides
//!
//! Project config takes precedence over global config.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Berth configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default value per settings axis (e.g. `build_type = "Debug"`)
    pub settings: BTreeMap<String, String>,

    /// Build settings
    pub build: BuildConfig,

    /// Package store settings
    pub store: StoreConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Default number of parallel jobs (None = let the build tool decide)
    pub jobs: Option<usize>,

    /// Explicit path to the cmake executable
    pub cmake: Option<PathBuf>,

    /// CMake generator passed as `-G`
    pub generator: Option<String>,
}

/// Store-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Package store root (default `~/.berth/store`)
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Settings merge per axis
        self.settings.extend(other.settings);

        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.cmake.is_some() {
            self.build.cmake = other.build.cmake;
        }
        if other.build.generator.is_some() {
            self.build.generator = other.build.generator;
        }

        if other.store.path.is_some() {
            self.store.path = other.store.path;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.berth/config.toml)
/// 2. Global config (~/.berth/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}

/// Get the global berth directory (~/.berth).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".berth"))
}

/// Get the project config path (.berth/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".berth").join("config.toml")
}

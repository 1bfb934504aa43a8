//! Consumer info - the linkage metadata a package publishes.
//!
//! The record is written as `package_info.toml` at the package root. A
//! downstream recipe's resolver reads it back from the dependency's install
//! prefix to learn which libraries to link and where headers live.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::copy_rule::ensure_contained;
use crate::util::fs::write_string;

/// File name of the consumer info record inside a package.
pub const PACKAGE_INFO_FILE: &str = "package_info.toml";

/// Default header directory in the package layout.
pub const INCLUDE_DIR: &str = "include";

/// Default library directory in the package layout.
pub const LIB_DIR: &str = "lib";

/// Default runtime (DLL) directory in the package layout.
pub const BIN_DIR: &str = "bin";

/// Linkage metadata for consumers of a package.
///
/// Directories are relative to the package root so a package stays valid
/// wherever it is installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerInfo {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// Fingerprint of the configuration this package was built with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,

    /// Libraries to link, in link order
    #[serde(default)]
    pub libs: Vec<String>,

    /// Header search directories
    #[serde(default = "default_include_dirs")]
    pub include_dirs: Vec<String>,

    /// Library search directories
    #[serde(default = "default_lib_dirs")]
    pub lib_dirs: Vec<String>,

    /// Runtime directories
    #[serde(default = "default_bin_dirs")]
    pub bin_dirs: Vec<String>,
}

pub(crate) fn default_include_dirs() -> Vec<String> {
    vec![INCLUDE_DIR.to_string()]
}

pub(crate) fn default_lib_dirs() -> Vec<String> {
    vec![LIB_DIR.to_string()]
}

pub(crate) fn default_bin_dirs() -> Vec<String> {
    vec![BIN_DIR.to_string()]
}

impl ConsumerInfo {
    /// Info for a package that publishes no record: default layout, no libs.
    pub fn bare(name: impl Into<String>, version: impl Into<String>) -> Self {
        ConsumerInfo {
            name: name.into(),
            version: version.into(),
            package_id: None,
            libs: Vec::new(),
            include_dirs: default_include_dirs(),
            lib_dirs: default_lib_dirs(),
            bin_dirs: default_bin_dirs(),
        }
    }

    /// Load the record from a package root.
    pub fn load(package_root: &Path) -> Result<Self> {
        let path = package_root.join(PACKAGE_INFO_FILE);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read consumer info: {}", path.display()))?;
        let info: ConsumerInfo = toml::from_str(&content)
            .with_context(|| format!("failed to parse consumer info: {}", path.display()))?;

        for dir in info
            .include_dirs
            .iter()
            .chain(&info.lib_dirs)
            .chain(&info.bin_dirs)
        {
            ensure_contained("consumer info directory", Path::new(dir))
                .with_context(|| format!("invalid consumer info: {}", path.display()))?;
        }
        Ok(info)
    }

    /// Load the record if present, otherwise fall back to [`ConsumerInfo::bare`].
    pub fn load_or_bare(package_root: &Path, name: &str, version: &str) -> Result<Self> {
        if package_root.join(PACKAGE_INFO_FILE).is_file() {
            Self::load(package_root)
        } else {
            Ok(Self::bare(name, version))
        }
    }

    /// Write the record into a package root.
    pub fn save(&self, package_root: &Path) -> Result<PathBuf> {
        let path = package_root.join(PACKAGE_INFO_FILE);
        let content =
            toml::to_string_pretty(self).context("failed to serialize consumer info")?;
        write_string(&path, &content)?;
        Ok(path)
    }

    /// Absolute header directories for a package installed at `prefix`.
    pub fn include_paths(&self, prefix: &Path) -> Vec<PathBuf> {
        self.include_dirs.iter().map(|d| prefix.join(d)).collect()
    }

    /// Absolute library directories for a package installed at `prefix`.
    pub fn lib_paths(&self, prefix: &Path) -> Vec<PathBuf> {
        self.lib_dirs.iter().map(|d| prefix.join(d)).collect()
    }
}

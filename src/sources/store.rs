//! Local package store - previously created packages on disk.
//!
//! Layout: `<root>/<name>/<version>/` holds one package (headers, binaries and
//! `package_info.toml`). Lookups only read. Installing stages the package in a
//! sibling temp directory and renames it into place, so readers never observe
//! a half-written package.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::package_info::PACKAGE_INFO_FILE;
use crate::core::{ConsumerInfo, Requirement};
use crate::resolver::ResolveMode;
use crate::sources::{PackageService, ServiceError};
use crate::util::fs::{copy_dir_all, ensure_dir, remove_dir_all_if_exists};

/// Directory-backed package store.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at `root`. The directory need not exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalStore { root: root.into() }
    }

    /// Install prefix for a `(name, version)` pair.
    pub fn prefix(&self, name: &str, version: &str) -> PathBuf {
        self.root.join(name).join(version)
    }

    /// Whether a complete package exists for the pair.
    pub fn contains(&self, name: &str, version: &str) -> bool {
        self.prefix(name, version).join(PACKAGE_INFO_FILE).is_file()
    }

    /// Read a stored package's consumer info.
    pub fn info(&self, req: &Requirement) -> Result<ConsumerInfo> {
        let prefix = self.prefix(req.name(), req.version());
        ConsumerInfo::load(&prefix).with_context(|| format!("`{}` is not in the store", req))
    }

    /// Publish a finished package into the store, replacing any previous copy.
    pub fn install(&self, package_root: &Path, info: &ConsumerInfo) -> Result<PathBuf> {
        let parent = self.root.join(&info.name);
        ensure_dir(&parent)?;

        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&parent)
            .with_context(|| format!("failed to create staging dir in {}", parent.display()))?;

        copy_dir_all(package_root, staging.path())?;
        info.save(staging.path())?;

        let dest = self.prefix(&info.name, &info.version);
        remove_dir_all_if_exists(&dest)?;
        std::fs::rename(staging.path(), &dest).with_context(|| {
            format!(
                "failed to move {} into {}",
                staging.path().display(),
                dest.display()
            )
        })?;

        tracing::info!("installed {}/{} into {}", info.name, info.version, dest.display());
        Ok(dest)
    }
}

impl PackageService for LocalStore {
    fn name(&self) -> &str {
        "local store"
    }

    fn materialize(&self, req: &Requirement, mode: ResolveMode) -> Result<PathBuf, ServiceError> {
        tracing::debug!("looking up {} ({:?} mode) in {}", req, mode, self.root.display());

        if self.contains(req.name(), req.version()) {
            Ok(self.prefix(req.name(), req.version()))
        } else {
            Err(ServiceError::NotFound {
                name: req.name().to_string(),
                version: req.version().to_string(),
                service: format!("store at {}", self.root.display()),
            })
        }
    }
}

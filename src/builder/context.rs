//! Build context - everything one evaluation hands to the build tool.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::core::Settings;
use crate::resolver::Resolve;

/// Name of the generators folder inside the build folder.
pub const GENERATORS_DIR: &str = "generators";

/// Resolved inputs and folders for one build.
///
/// Immutable once constructed; the build driver, generators and packager
/// only read from it.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// One value per declared settings axis
    pub settings: Settings,

    /// One value per declared option
    pub options: BTreeMap<String, String>,

    /// Resolved dependencies, in declaration order
    pub dependencies: Resolve,

    /// Folder the build tool configures from
    pub source_dir: PathBuf,

    /// Folder the build tool writes into
    pub build_dir: PathBuf,

    /// Package root populated by the packager
    pub package_dir: PathBuf,

    /// Fingerprint of this configuration
    pub package_id: String,

    /// Parallel job count (None = let the build tool decide)
    pub jobs: Option<usize>,
}

impl BuildContext {
    /// Folder generator files are materialized into.
    pub fn generators_dir(&self) -> PathBuf {
        self.build_dir.join(GENERATORS_DIR)
    }

    /// The `build_type` setting, defaulting to `Release` when the recipe
    /// does not declare the axis.
    pub fn build_type(&self) -> &str {
        self.settings.build_type().unwrap_or("Release")
    }

    /// The `shared` option, when the recipe declares it.
    pub fn shared(&self) -> Option<bool> {
        self.options.get("shared").map(|v| v == "true")
    }

    /// `name/version` of the package being built.
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

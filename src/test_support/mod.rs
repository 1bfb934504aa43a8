//! Test utilities and fakes for Berth unit tests.
//!
//! [`MemoryService`] stands in for a package store and [`ScriptedTool`] for
//! an external build system, so the whole evaluation pipeline can be
//! exercised without cmake or a populated store.

pub mod fixtures;

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Result};
use tempfile::TempDir;

use crate::builder::tool::{BuildTool, ToolOutput};
use crate::builder::BuildContext;
use crate::core::{BuildStep, ConsumerInfo, Recipe, Requirement};
use crate::resolver::{resolve, Resolve, ResolveMode};
use crate::sources::{PackageService, ServiceError};

pub use fixtures::*;

/// Package service backed by a temporary directory.
///
/// Packages are registered up front; every request is recorded.
pub struct MemoryService {
    root: TempDir,
    packages: BTreeSet<(String, String)>,
    aliases: HashMap<(String, String), (String, String)>,
    requested: Mutex<Vec<String>>,
}

impl MemoryService {
    pub fn new() -> Self {
        MemoryService {
            root: TempDir::new().expect("failed to create service root"),
            packages: BTreeSet::new(),
            aliases: HashMap::new(),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Register a package with an empty default layout and no record.
    pub fn with_package(mut self, name: &str, version: &str) -> Self {
        let prefix = self.prefix(name, version);
        std::fs::create_dir_all(prefix.join("include")).expect("failed to create package");
        self.packages.insert((name.to_string(), version.to_string()));
        self
    }

    /// Write a consumer info record into the package's prefix.
    pub fn publish(&self, info: &ConsumerInfo) {
        info.save(&self.prefix(&info.name, &info.version))
            .expect("failed to publish consumer info");
    }

    /// Serve requests for `name/version` from another package's prefix.
    pub fn alias(&mut self, name: &str, version: &str, to_name: &str, to_version: &str) {
        self.aliases.insert(
            (name.to_string(), version.to_string()),
            (to_name.to_string(), to_version.to_string()),
        );
    }

    /// Install prefix of a registered package.
    pub fn prefix(&self, name: &str, version: &str) -> PathBuf {
        self.root.path().join(name).join(version)
    }

    /// Every `name/version` requested so far, in request order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl Default for MemoryService {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageService for MemoryService {
    fn name(&self) -> &str {
        "memory"
    }

    fn materialize(&self, req: &Requirement, _mode: ResolveMode) -> Result<PathBuf, ServiceError> {
        self.requested.lock().unwrap().push(req.to_string());

        let key = (req.name().to_string(), req.version().to_string());
        if let Some((name, version)) = self.aliases.get(&key) {
            return Ok(self.prefix(name, version));
        }
        if self.packages.contains(&key) {
            return Ok(self.prefix(req.name(), req.version()));
        }

        Err(ServiceError::NotFound {
            name: key.0,
            version: key.1,
            service: "memory service".to_string(),
        })
    }
}

/// Build tool that follows a script instead of running anything.
#[derive(Default)]
pub struct ScriptedTool {
    steps: Mutex<Vec<BuildStep>>,
    generator_files: Mutex<Vec<PathBuf>>,
    failure: Option<(BuildStep, i32, String)>,
    artifacts: Vec<(PathBuf, String)>,
    unavailable: bool,
}

impl ScriptedTool {
    /// A tool whose steps all succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// A tool that cannot be started.
    pub fn unavailable() -> Self {
        ScriptedTool {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Exit with `status` and `stderr` at `step`.
    pub fn failing_at(mut self, step: BuildStep, status: i32, stderr: &str) -> Self {
        self.failure = Some((step, status, stderr.to_string()));
        self
    }

    /// Write a file (relative to the build folder) during the build step.
    pub fn with_artifact(mut self, path: &str, contents: &str) -> Self {
        self.artifacts.push((PathBuf::from(path), contents.to_string()));
        self
    }

    /// Steps run so far.
    pub fn steps(&self) -> Vec<BuildStep> {
        self.steps.lock().unwrap().clone()
    }

    /// Generator files present when configure ran, relative to the
    /// generators folder.
    pub fn generator_files(&self) -> Vec<PathBuf> {
        self.generator_files.lock().unwrap().clone()
    }
}

impl BuildTool for ScriptedTool {
    fn name(&self) -> &str {
        "scripted"
    }

    fn run(&self, step: BuildStep, ctx: &BuildContext) -> Result<ToolOutput> {
        if self.unavailable {
            bail!("failed to spawn `scripted`: No such file or directory");
        }
        self.steps.lock().unwrap().push(step);

        if step == BuildStep::Configure {
            let dir = ctx.generators_dir();
            if dir.is_dir() {
                let files = crate::util::fs::relative_files(&dir, &[])?;
                *self.generator_files.lock().unwrap() = files;
            }
        }

        if let Some((fail_step, status, stderr)) = &self.failure {
            if *fail_step == step {
                return Ok(ToolOutput::failure(*status, stderr.clone()));
            }
        }

        if step == BuildStep::Build {
            for (path, contents) in &self.artifacts {
                crate::util::fs::write_string(&ctx.build_dir.join(path), contents)?;
            }
        }

        Ok(ToolOutput::success())
    }
}

/// Parse a recipe from text, located at a virtual path.
pub fn recipe_from(content: &str) -> Recipe {
    Recipe::parse(content, Path::new("/virtual/recipe/berth.toml")).expect("invalid test recipe")
}

/// A context for `beyond-core/0.0.2` with folders under `dir` and no
/// dependencies.
pub fn context_in(dir: &Path, settings: &[(&str, &str)], options: &[(&str, &str)]) -> BuildContext {
    context_from(dir, Resolve::default(), settings, options)
}

/// A context whose dependencies are resolved from `service`.
pub fn context_with_deps(
    dir: &Path,
    service: &MemoryService,
    requires: &[&str],
    settings: &[(&str, &str)],
    options: &[(&str, &str)],
) -> BuildContext {
    let specs: Vec<String> = requires.iter().map(|r| format!("\"{}\"", r)).collect();
    let recipe = recipe_from(&format!(
        "[package]\nname = \"beyond-core\"\nversion = \"0.0.2\"\nrequires = [{}]\n",
        specs.join(", ")
    ));
    let deps = resolve(&recipe, ResolveMode::Build, service).expect("failed to resolve");
    context_from(dir, deps, settings, options)
}

fn context_from(
    dir: &Path,
    dependencies: Resolve,
    settings: &[(&str, &str)],
    options: &[(&str, &str)],
) -> BuildContext {
    BuildContext {
        name: "beyond-core".to_string(),
        version: "0.0.2".to_string(),
        settings: settings.iter().copied().collect(),
        options: options
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        dependencies,
        source_dir: dir.join("source"),
        build_dir: dir.join("build"),
        package_dir: dir.join("package"),
        package_id: "0".repeat(64),
        jobs: None,
    }
}

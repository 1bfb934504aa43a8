//! berth.toml recipe parsing and schema.
//!
//! A recipe declares one native library's identity, the settings axes and
//! options its binaries depend on, its pinned requirements, the generators to
//! run before building, and how build outputs are staged into a package.
//! Parsing is pure: it validates the declaration and builds an immutable
//! [`Recipe`], it never touches the build or package folders.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::core::copy_rule::{ensure_contained, CopyRule};
use crate::core::dialect::{self, Dialect, RawGenerators};
use crate::core::errors::EvalError;
use crate::core::options::{option_value, validate_defaults};
use crate::core::package_info::{default_bin_dirs, default_include_dirs, default_lib_dirs};
use crate::core::requirement::{validate_component, Requirement};

/// Canonical recipe file name.
pub const RECIPE_FILE: &str = "berth.toml";

/// A build-tool integration materialized before the build step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorKind {
    /// Toolchain file carrying settings, options and dependency prefixes.
    CMakeToolchain,
    /// One `<name>-config.cmake` package config per dependency.
    CMakeDeps,
}

impl GeneratorKind {
    /// The generator's canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratorKind::CMakeToolchain => "CMakeToolchain",
            GeneratorKind::CMakeDeps => "CMakeDeps",
        }
    }
}

impl FromStr for GeneratorKind {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CMakeToolchain" => Ok(GeneratorKind::CMakeToolchain),
            "CMakeDeps" => Ok(GeneratorKind::CMakeDeps),
            other => Err(EvalError::malformed(format!(
                "unknown generator `{}` (expected CMakeToolchain or CMakeDeps)",
                other
            ))),
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for GeneratorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Consumer info declared by the recipe (`[package_info]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageInfoDecl {
    /// Libraries published to consumers, in link order
    pub libs: Vec<String>,
    /// Header directories relative to the package root
    pub include_dirs: Vec<String>,
    /// Library directories relative to the package root
    pub lib_dirs: Vec<String>,
    /// Runtime directories relative to the package root
    pub bin_dirs: Vec<String>,
}

/// A parsed, validated recipe.
#[derive(Debug, Clone, Serialize)]
pub struct Recipe {
    pub name: String,
    pub version: String,
    pub license: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub topics: Vec<String>,

    /// Settings axes, in declaration order
    pub settings: Vec<String>,

    /// Option name to allowed values
    pub options: BTreeMap<String, Vec<String>>,

    /// Option name to default value
    pub default_options: BTreeMap<String, String>,

    pub requires: Vec<Requirement>,
    pub test_requires: Vec<Requirement>,
    pub generators: Vec<GeneratorKind>,

    /// Globs (relative to the recipe directory) snapshotted as the build's
    /// source folder; empty means the recipe directory itself is used.
    pub exports_sources: Vec<String>,

    pub copy_rules: Vec<CopyRule>,
    pub package_info: PackageInfoDecl,

    /// Directory containing the recipe file
    #[serde(skip)]
    pub recipe_dir: PathBuf,

    #[serde(skip)]
    pub dialect: Dialect,
}

/// Raw recipe as deserialized from TOML.
#[derive(Debug, Default, Deserialize)]
struct RawRecipe {
    #[serde(default)]
    package: RawPackage,

    #[serde(default)]
    options: BTreeMap<String, Vec<toml::Value>>,

    #[serde(default)]
    default_options: BTreeMap<String, toml::Value>,

    #[serde(default, rename = "copy")]
    copy_rules: Vec<RawCopyRule>,

    #[serde(default)]
    package_info: RawPackageInfo,
}

#[derive(Debug, Default, Deserialize)]
struct RawPackage {
    name: Option<String>,
    version: Option<String>,
    license: Option<String>,
    author: Option<String>,
    url: Option<String>,
    description: Option<String>,

    #[serde(default)]
    topics: Vec<String>,

    #[serde(default)]
    settings: Vec<String>,

    #[serde(default)]
    generators: RawGenerators,

    #[serde(default)]
    exports_sources: Vec<String>,

    #[serde(default)]
    requires: Vec<String>,

    #[serde(default)]
    test_requires: Vec<String>,

    /// Legacy spelling of `test_requires`.
    #[serde(default)]
    build_requires: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawCopyRule {
    pattern: String,
    dst: PathBuf,

    #[serde(default)]
    src: Option<PathBuf>,

    #[serde(default = "default_true")]
    keep_path: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
struct RawPackageInfo {
    #[serde(default)]
    libs: Vec<String>,
    include_dirs: Option<Vec<String>>,
    lib_dirs: Option<Vec<String>>,
    bin_dirs: Option<Vec<String>>,
}

impl Recipe {
    /// Load a recipe from a file path.
    pub fn load(path: &Path) -> Result<Self, EvalError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EvalError::malformed(format!("failed to read recipe: {}", e)).at_path(path)
        })?;

        Self::parse(&content, path)
    }

    /// Parse recipe content. `path` locates the recipe directory.
    pub fn parse(content: &str, path: &Path) -> Result<Self, EvalError> {
        Self::parse_inner(content, path).map_err(|e| e.at_path(path))
    }

    fn parse_inner(content: &str, path: &Path) -> Result<Self, EvalError> {
        let raw: RawRecipe = toml::from_str(content)
            .map_err(|e| EvalError::malformed(format!("invalid TOML: {}", e.message())))?;

        let recipe_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let pkg = raw.package;

        let name = required_field("name", pkg.name)?;
        let version = required_field("version", pkg.version)?;
        validate_component("package name", &name)?;
        validate_component("version", &version)?;

        let settings = validate_settings(pkg.settings)?;

        let mut options = BTreeMap::new();
        for (option, values) in &raw.options {
            let allowed = values
                .iter()
                .map(|v| option_value(option, v))
                .collect::<Result<Vec<_>, _>>()?;
            options.insert(option.clone(), allowed);
        }

        let mut default_options = BTreeMap::new();
        for (option, value) in &raw.default_options {
            default_options.insert(option.clone(), option_value(option, value)?);
        }
        validate_defaults(&options, &default_options)?;

        let (generators, generators_dialect) = dialect::translate_generators(&pkg.generators)?;
        let (test_specs, requires_dialect) =
            dialect::merge_test_requires(pkg.test_requires, pkg.build_requires);

        let requires = parse_requirements(&pkg.requires)?;
        let test_requires = parse_requirements(&test_specs)?;
        check_conflicting_pins(&requires, &test_requires)?;

        let copy_rules = raw
            .copy_rules
            .into_iter()
            .map(|r| CopyRule::new(r.pattern, r.dst, r.src, r.keep_path))
            .collect::<Result<Vec<_>, _>>()?;

        for pattern in &pkg.exports_sources {
            glob::Pattern::new(pattern).map_err(|e| {
                EvalError::malformed(format!("invalid exports_sources pattern `{}`: {}", pattern, e))
            })?;
        }

        let package_info = package_info_decl(raw.package_info)?;

        let dialect = if generators_dialect == Dialect::Legacy || requires_dialect == Dialect::Legacy
        {
            tracing::debug!("translating legacy recipe dialect for `{}`", name);
            Dialect::Legacy
        } else {
            Dialect::Current
        };

        Ok(Recipe {
            name,
            version,
            license: pkg.license,
            author: pkg.author,
            url: pkg.url,
            description: pkg.description,
            topics: pkg.topics,
            settings,
            options,
            default_options,
            requires,
            test_requires,
            generators,
            exports_sources: pkg.exports_sources,
            copy_rules,
            package_info,
            recipe_dir,
            dialect,
        })
    }

    /// The `name/version` reference of this recipe.
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

fn required_field(field: &str, value: Option<String>) -> Result<String, EvalError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(EvalError::malformed(format!(
            "missing required field `package.{}`",
            field
        ))),
    }
}

fn validate_settings(settings: Vec<String>) -> Result<Vec<String>, EvalError> {
    let mut seen = Vec::with_capacity(settings.len());
    for axis in settings {
        if axis.trim().is_empty() {
            return Err(EvalError::malformed("settings contain an empty axis name"));
        }
        if seen.contains(&axis) {
            return Err(EvalError::malformed(format!(
                "setting `{}` is declared more than once",
                axis
            )));
        }
        seen.push(axis);
    }
    Ok(seen)
}

fn parse_requirements(specs: &[String]) -> Result<Vec<Requirement>, EvalError> {
    specs.iter().map(|s| Requirement::parse(s)).collect()
}

/// A package may be pinned to only one version across both requirement lists.
fn check_conflicting_pins(
    requires: &[Requirement],
    test_requires: &[Requirement],
) -> Result<(), EvalError> {
    let mut pins: HashMap<&str, &str> = HashMap::new();
    for req in requires.iter().chain(test_requires) {
        match pins.get(req.name()) {
            Some(&version) if version != req.version() => {
                return Err(EvalError::malformed(format!(
                    "`{}` is pinned to both `{}` and `{}`",
                    req.name(),
                    version,
                    req.version()
                )));
            }
            _ => {
                pins.insert(req.name(), req.version());
            }
        }
    }
    Ok(())
}

fn package_info_decl(raw: RawPackageInfo) -> Result<PackageInfoDecl, EvalError> {
    let decl = PackageInfoDecl {
        libs: raw.libs,
        include_dirs: raw.include_dirs.unwrap_or_else(default_include_dirs),
        lib_dirs: raw.lib_dirs.unwrap_or_else(default_lib_dirs),
        bin_dirs: raw.bin_dirs.unwrap_or_else(default_bin_dirs),
    };

    if decl.libs.iter().any(|lib| lib.trim().is_empty()) {
        return Err(EvalError::malformed("package_info.libs contains an empty name"));
    }

    for dir in decl
        .include_dirs
        .iter()
        .chain(&decl.lib_dirs)
        .chain(&decl.bin_dirs)
    {
        ensure_contained("package_info directory", Path::new(dir))?;
    }

    Ok(decl)
}

/// Error returned when no recipe file is found.
#[derive(Debug, Error)]
#[error("no berth.toml found in `{}` or any parent directory", .dir.display())]
pub struct RecipeNotFound {
    pub dir: PathBuf,
}

/// Find the recipe file, starting at `start` and searching upward.
pub fn find_recipe(start: &Path) -> Result<PathBuf, RecipeNotFound> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(RECIPE_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(RecipeNotFound {
                dir: start.to_path_buf(),
            });
        }
    }
}

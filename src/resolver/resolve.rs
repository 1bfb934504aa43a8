//! Requirement resolution against a package service.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::core::{ConsumerInfo, EvalError, Recipe, Requirement};
use crate::resolver::ResolveMode;
use crate::sources::PackageService;

/// A materialized dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    pub requirement: Requirement,

    /// Where the package service installed the dependency
    pub install_prefix: PathBuf,

    /// The dependency's published consumer info
    pub info: ConsumerInfo,
}

impl ResolvedDependency {
    pub fn name(&self) -> &str {
        self.requirement.name()
    }

    pub fn version(&self) -> &str {
        self.requirement.version()
    }

    /// Absolute header directories of this dependency.
    pub fn include_paths(&self) -> Vec<PathBuf> {
        self.info.include_paths(&self.install_prefix)
    }

    /// Absolute library directories of this dependency.
    pub fn lib_paths(&self) -> Vec<PathBuf> {
        self.info.lib_paths(&self.install_prefix)
    }
}

/// The resolved dependency set, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolve {
    deps: Vec<ResolvedDependency>,
}

impl Resolve {
    /// Iterate in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedDependency> {
        self.deps.iter()
    }

    /// Look up a dependency by name.
    pub fn get(&self, name: &str) -> Option<&ResolvedDependency> {
        self.deps.iter().find(|d| d.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    /// Install prefixes in declaration order.
    pub fn prefixes(&self) -> Vec<&Path> {
        self.deps.iter().map(|d| d.install_prefix.as_path()).collect()
    }
}

/// Requirements that apply in `mode`, de-duplicated in declaration order.
///
/// `test_requires` only participate in test mode.
pub fn requirements_for(recipe: &Recipe, mode: ResolveMode) -> Vec<Requirement> {
    let test = match mode {
        ResolveMode::Build => &[][..],
        ResolveMode::Test => recipe.test_requires.as_slice(),
    };

    let mut seen = HashSet::new();
    recipe
        .requires
        .iter()
        .chain(test)
        .filter(|req| seen.insert((*req).clone()))
        .cloned()
        .collect()
}

/// Resolve every applicable requirement of `recipe`.
///
/// Independent lookups run in parallel, but the outcome is deterministic:
/// the result keeps declaration order and, when several requirements fail,
/// the first failing one in declaration order is reported.
pub fn resolve(
    recipe: &Recipe,
    mode: ResolveMode,
    service: &dyn PackageService,
) -> Result<Resolve, EvalError> {
    let requirements = requirements_for(recipe, mode);

    tracing::info!(
        "resolving {} requirement(s) for {} ({} mode) via {}",
        requirements.len(),
        recipe.reference(),
        mode,
        service.name()
    );

    let results: Vec<Result<ResolvedDependency, EvalError>> = requirements
        .par_iter()
        .map(|req| resolve_one(req, mode, service))
        .collect();

    let deps = results.into_iter().collect::<Result<Vec<_>, _>>()?;

    Ok(Resolve { deps })
}

fn resolve_one(
    req: &Requirement,
    mode: ResolveMode,
    service: &dyn PackageService,
) -> Result<ResolvedDependency, EvalError> {
    let unresolved = |reason: String| EvalError::UnresolvedDependency {
        specifier: req.to_string(),
        reason,
    };

    let install_prefix = service
        .materialize(req, mode)
        .map_err(|e| unresolved(e.to_string()))?;

    let info = ConsumerInfo::load_or_bare(&install_prefix, req.name(), req.version())
        .map_err(|e| unresolved(format!("{:#}", e)))?;

    if info.name != req.name() || info.version != req.version() {
        return Err(unresolved(format!(
            "package at {} describes itself as `{}/{}`",
            install_prefix.display(),
            info.name,
            info.version
        )));
    }

    tracing::debug!("resolved {} -> {}", req, install_prefix.display());

    Ok(ResolvedDependency {
        requirement: req.clone(),
        install_prefix,
        info,
    })
}

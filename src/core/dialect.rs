//! Recipe dialects.
//!
//! Recipes written against older tool versions name things differently:
//! generators were a single string (`generators = "cmake"`), used
//! build-system-specific legacy generator names, and test-only requirements
//! were spelled `build_requires`. This module translates those shapes into the
//! current model so the rest of the engine only ever sees one dialect.

use serde::Deserialize;

use crate::core::errors::EvalError;
use crate::core::recipe::GeneratorKind;

/// Which dialect a recipe was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Current field names and generator names.
    Current,
    /// Older field names or generator names that need translation.
    Legacy,
}

/// Generators as written in a recipe: a single name or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawGenerators {
    /// `generators = "cmake"`
    Single(String),
    /// `generators = ["CMakeToolchain", "CMakeDeps"]`
    List(Vec<String>),
}

impl Default for RawGenerators {
    fn default() -> Self {
        RawGenerators::List(Vec::new())
    }
}

impl RawGenerators {
    fn names(&self) -> Vec<&str> {
        match self {
            RawGenerators::Single(name) => vec![name.as_str()],
            RawGenerators::List(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// Translate a legacy generator name into its current equivalents.
///
/// Returns `None` when the name is not a legacy name.
fn legacy_generator(name: &str) -> Option<&'static [GeneratorKind]> {
    match name {
        "cmake" => Some(&[GeneratorKind::CMakeToolchain, GeneratorKind::CMakeDeps]),
        "cmake_find_package" | "cmake_find_package_multi" => Some(&[GeneratorKind::CMakeDeps]),
        "cmake_paths" => Some(&[GeneratorKind::CMakeToolchain]),
        _ => None,
    }
}

/// Translate generators into the current model, de-duplicated in order.
pub fn translate_generators(raw: &RawGenerators) -> Result<(Vec<GeneratorKind>, Dialect), EvalError> {
    let mut dialect = match raw {
        RawGenerators::Single(_) => Dialect::Legacy,
        RawGenerators::List(_) => Dialect::Current,
    };

    let mut generators = Vec::new();
    for name in raw.names() {
        let kinds: Vec<GeneratorKind> = if let Some(kinds) = legacy_generator(name) {
            dialect = Dialect::Legacy;
            kinds.to_vec()
        } else {
            vec![name.parse()?]
        };

        for kind in kinds {
            if !generators.contains(&kind) {
                generators.push(kind);
            }
        }
    }

    Ok((generators, dialect))
}

/// Merge legacy `build_requires` into `test_requires`.
///
/// Entries already present in `test_requires` are not repeated.
pub fn merge_test_requires(
    test_requires: Vec<String>,
    build_requires: Vec<String>,
) -> (Vec<String>, Dialect) {
    if build_requires.is_empty() {
        return (test_requires, Dialect::Current);
    }

    let mut merged = test_requires;
    for spec in build_requires {
        if !merged.contains(&spec) {
            merged.push(spec);
        }
    }
    (merged, Dialect::Legacy)
}

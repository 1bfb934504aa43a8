//! Dependency resolution.
//!
//! Requirements are exact `name/version` pins, so there is no version solving:
//! each pin is materialized by a [`PackageService`](crate::sources::PackageService)
//! and its consumer info is read from the returned install prefix.

pub mod resolve;

pub use resolve::{requirements_for, resolve, Resolve, ResolvedDependency};

use std::fmt;

/// Which requirement lists participate in resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveMode {
    /// Production build: `requires` only.
    #[default]
    Build,
    /// Test build: `requires` plus `test_requires`.
    Test,
}

impl fmt::Display for ResolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveMode::Build => f.write_str("build"),
            ResolveMode::Test => f.write_str("test"),
        }
    }
}

//! Berth - a package-recipe evaluator for native libraries
//!
//! A `berth.toml` recipe declares a library's identity, build settings,
//! pinned requirements and packaging rules. Berth resolves the requirements
//! against a package store, drives an external build tool, assembles the
//! package layout and exports linkage metadata for consumers.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod sources;
pub mod util;

/// Test utilities and fakes for Berth unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scripted build tool and an in-memory
/// package service.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{ConsumerInfo, EvalError, Recipe, Requirement};
pub use builder::{BuildTool, CMakeTool};
pub use ops::{evaluate, EvalOptions, Evaluation, Stage};
pub use resolver::{Resolve, ResolveMode};
pub use sources::{LocalStore, PackageService};
pub use util::context::GlobalContext;

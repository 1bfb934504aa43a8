//! High-level operations.
//!
//! This module contains the implementation of Berth commands.

pub mod evaluate;
pub mod package;
pub mod package_info;
pub mod source_export;

pub use evaluate::{evaluate, evaluate_with, EvalOptions, Evaluation, Lifecycle, Stage};
pub use package::{package, PackageReport};
pub use package_info::{consumer_info, export_info};
pub use source_export::export_sources;

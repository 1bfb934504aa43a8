//! Core data structures for berth.
//!
//! This module contains the recipe model and the types every lifecycle stage
//! shares:
//! - Recipes, their dialects, options and settings
//! - Requirement pins and copy rules
//! - Consumer info records
//! - The evaluation error taxonomy

pub mod copy_rule;
pub mod dialect;
pub mod errors;
pub mod options;
pub mod package_info;
pub mod recipe;
pub mod requirement;
pub mod settings;

pub use copy_rule::CopyRule;
pub use errors::{BuildStep, EvalError};
pub use package_info::ConsumerInfo;
pub use recipe::{find_recipe, GeneratorKind, Recipe, RECIPE_FILE};
pub use requirement::Requirement;
pub use settings::Settings;

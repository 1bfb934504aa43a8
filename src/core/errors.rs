//! Recipe evaluation error taxonomy.
//!
//! Every lifecycle stage fails with exactly one of these variants. Errors are
//! never recovered from inside the engine; they surface to the caller as-is so
//! the user sees the failing stage and the specifier, path, or exit code that
//! caused it.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// A step of the build stage, used to report where a build failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStep {
    /// Snapshot the recipe's exported sources.
    Export,
    /// Materialize generator glue files.
    Generate,
    /// Configure the external build tool.
    Configure,
    /// Run the external build tool.
    Build,
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStep::Export => write!(f, "source export"),
            BuildStep::Generate => write!(f, "generate"),
            BuildStep::Configure => write!(f, "configure"),
            BuildStep::Build => write!(f, "build"),
        }
    }
}

/// Error raised while evaluating a recipe.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum EvalError {
    /// Recipe data is invalid; the build is never reached.
    #[error("malformed recipe: {message}")]
    #[diagnostic(code(berth::recipe::malformed))]
    MalformedRecipe {
        message: String,
        path: Option<PathBuf>,
    },

    /// A `requires`/`test_requires` entry could not be satisfied.
    #[error("unresolved dependency `{specifier}`: {reason}")]
    #[diagnostic(
        code(berth::resolve::unresolved),
        help("create the dependency first with `berth create --install`")
    )]
    UnresolvedDependency { specifier: String, reason: String },

    /// The external build tool (or a step preparing for it) failed.
    #[error("{tool} failed during {step} ({})", describe_status(.status))]
    #[diagnostic(code(berth::build::tool_failed))]
    BuildTool {
        tool: String,
        step: BuildStep,
        status: Option<i32>,
        output: String,
    },

    /// A copy rule or the consumer info record could not be staged.
    #[error("packaging failed at {}: {message}", .path.display())]
    #[diagnostic(code(berth::package::failed))]
    Packaging { message: String, path: PathBuf },
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {}", code),
        None => "no exit status".to_string(),
    }
}

impl EvalError {
    /// Create a malformed-recipe error with no file location.
    pub fn malformed(message: impl Into<String>) -> Self {
        EvalError::MalformedRecipe {
            message: message.into(),
            path: None,
        }
    }

    /// Create a packaging error for the given path.
    pub fn packaging(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        EvalError::Packaging {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Attach a recipe file location to a malformed-recipe error.
    pub fn at_path(self, recipe_path: impl Into<PathBuf>) -> Self {
        match self {
            EvalError::MalformedRecipe { message, path: None } => EvalError::MalformedRecipe {
                message,
                path: Some(recipe_path.into()),
            },
            other => other,
        }
    }

    /// Name of the lifecycle stage this error aborts.
    pub fn stage(&self) -> &'static str {
        match self {
            EvalError::MalformedRecipe { .. } => "parse",
            EvalError::UnresolvedDependency { .. } => "resolve",
            EvalError::BuildTool { .. } => "build",
            EvalError::Packaging { .. } => "package",
        }
    }

    /// Convert to a user-facing diagnostic with context and suggestions.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            EvalError::MalformedRecipe { message, path } => {
                let mut diag = Diagnostic::error(format!("malformed recipe: {}", message));
                if let Some(path) = path {
                    diag = diag.with_location(path);
                }
                diag.with_suggestion(suggestions::CHECK_RECIPE)
            }

            EvalError::UnresolvedDependency { specifier, reason } => {
                Diagnostic::error(format!("could not resolve `{}`", specifier))
                    .with_context(reason.clone())
                    .with_context("no build tool was invoked")
                    .with_suggestion(suggestions::CREATE_DEPENDENCY)
                    .with_suggestion(suggestions::CHECK_STORE)
            }

            EvalError::BuildTool {
                tool,
                step,
                status,
                output,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "{} failed during {} ({})",
                    tool,
                    step,
                    describe_status(status)
                ));
                for line in output.lines().filter(|l| !l.trim().is_empty()) {
                    diag = diag.with_context(line.to_string());
                }
                diag.with_context("nothing was packaged")
                    .with_suggestion(suggestions::BUILD_FAILED)
            }

            EvalError::Packaging { message, path } => {
                Diagnostic::error(format!("packaging failed: {}", message))
                    .with_location(path)
                    .with_context("consumer info was not exported")
                    .with_suggestion(suggestions::CHECK_COPY_RULES)
            }
        }
    }
}

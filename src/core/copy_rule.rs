//! Copy rules - how build and source files are staged into a package.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use serde::Serialize;

use crate::core::errors::EvalError;

/// Match options shared by copy rules and source exports.
///
/// `*` is allowed to cross directory separators, so `*.hpp` matches headers
/// at any depth below the rule's root.
pub const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A glob-based instruction for staging files into the package layout.
#[derive(Debug, Clone, Serialize)]
pub struct CopyRule {
    /// Glob matched against paths relative to the rule's root.
    pub pattern: String,

    /// Destination directory under the package root.
    pub dst: PathBuf,

    /// Source directory under the source folder; `None` copies from the
    /// build folder.
    pub src: Option<PathBuf>,

    /// Preserve the matched file's relative path instead of flattening.
    pub keep_path: bool,

    #[serde(skip)]
    matcher: Pattern,
}

impl CopyRule {
    /// Create a validated copy rule.
    pub fn new(
        pattern: impl Into<String>,
        dst: impl Into<PathBuf>,
        src: Option<PathBuf>,
        keep_path: bool,
    ) -> Result<Self, EvalError> {
        let pattern = pattern.into();
        let dst = dst.into();

        let matcher = Pattern::new(&pattern).map_err(|e| {
            EvalError::malformed(format!("invalid copy pattern `{}`: {}", pattern, e))
        })?;

        ensure_contained("copy destination", &dst)?;
        if let Some(ref src) = src {
            ensure_contained("copy source", src)?;
        }

        Ok(CopyRule {
            pattern,
            dst,
            src,
            keep_path,
            matcher,
        })
    }

    /// Check whether a root-relative path matches this rule.
    pub fn matches(&self, relative: &Path) -> bool {
        self.matcher.matches_path_with(relative, MATCH_OPTIONS)
    }
}

impl fmt::Display for CopyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.src {
            Some(src) => write!(f, "{}/{}", src.display(), self.pattern)?,
            None => write!(f, "<build>/{}", self.pattern)?,
        }
        write!(f, " -> {}", self.dst.display())?;
        if self.keep_path {
            f.write_str(" (keep path)")?;
        }
        Ok(())
    }
}

/// Reject absolute paths and paths that climb out of their root.
pub fn ensure_contained(what: &str, path: &Path) -> Result<(), EvalError> {
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(EvalError::malformed(format!(
                    "{} `{}` escapes the package root",
                    what,
                    path.display()
                )))
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(EvalError::malformed(format!(
                    "{} `{}` must be a relative path",
                    what,
                    path.display()
                )))
            }
        }
    }
    Ok(())
}

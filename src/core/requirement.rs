//! Dependency requirements - `name/version` pins.
//!
//! Requirements are exact pins. There are no ranges, channels, or remotes:
//! `fmt/9.1.0` asks for exactly version `9.1.0` of `fmt`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::core::errors::EvalError;

/// Allowed shape of a package name or version component.
static COMPONENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_+.\-]*$").unwrap());

/// An exact `name/version` dependency pin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Requirement {
    name: String,
    version: String,
}

impl Requirement {
    /// Parse a `name/version` specifier, splitting on the first `/`.
    pub fn parse(spec: &str) -> Result<Self, EvalError> {
        let (name, version) = spec.split_once('/').ok_or_else(|| {
            EvalError::malformed(format!(
                "dependency `{}` is not of the form `name/version`",
                spec
            ))
        })?;

        if name.is_empty() || version.is_empty() {
            return Err(EvalError::malformed(format!(
                "dependency `{}` has an empty name or version",
                spec
            )));
        }

        if version.contains('/') || version.contains('@') {
            return Err(EvalError::malformed(format!(
                "dependency `{}` must be exactly `name/version` (user/channel references are not supported)",
                spec
            )));
        }

        validate_component("package name", name)?;
        validate_component("version", version)?;

        Ok(Requirement {
            name: name.to_string(),
            version: version.to_string(),
        })
    }

    /// Create a requirement from already-validated parts.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Requirement {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pinned version.
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Check a package name or version against the allowed character set.
pub fn validate_component(what: &str, value: &str) -> Result<(), EvalError> {
    if COMPONENT.is_match(value) {
        Ok(())
    } else {
        Err(EvalError::malformed(format!(
            "invalid {} `{}`: expected letters, digits, `_`, `+`, `.` or `-`",
            what, value
        )))
    }
}

impl FromStr for Requirement {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Requirement::parse(s)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

impl Serialize for Requirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

//! Settings axes and their per-invocation values.
//!
//! A recipe declares which axes affect its binaries (`os`, `compiler`,
//! `build_type`, `arch`, ...). Each evaluation binds every declared axis to
//! exactly one value, taken from the first layer that provides one:
//! explicit overrides, then configured defaults, then host detection.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::errors::EvalError;
use crate::util::process::find_executable;

/// Resolved setting values, in the recipe's declared axis order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Settings {
    values: Vec<(String, String)>,
}

impl Settings {
    /// Get the value bound to an axis.
    pub fn get(&self, axis: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name == axis)
            .map(|(_, value)| value.as_str())
    }

    /// The `build_type` value, if the recipe declares that axis.
    pub fn build_type(&self) -> Option<&str> {
        self.get("build_type")
    }

    /// Iterate over `(axis, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of bound axes.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no axis is bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Settings {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Bind every declared axis to a value.
pub fn resolve_settings(
    axes: &[String],
    overrides: &BTreeMap<String, String>,
    defaults: &BTreeMap<String, String>,
) -> Result<Settings, EvalError> {
    for axis in overrides.keys() {
        if !axes.contains(axis) {
            tracing::debug!("ignoring value for setting `{}` not declared by the recipe", axis);
        }
    }

    let mut values = Vec::with_capacity(axes.len());
    for axis in axes {
        let value = overrides
            .get(axis)
            .or_else(|| defaults.get(axis))
            .cloned()
            .or_else(|| host_default(axis));

        match value {
            Some(value) if !value.is_empty() => values.push((axis.clone(), value)),
            _ => {
                return Err(EvalError::malformed(format!(
                    "setting `{}` has no value; pass `-s {}=<value>` or set it in config",
                    axis, axis
                )))
            }
        }
    }

    Ok(Settings { values })
}

/// Detect a host value for well-known axes.
pub fn host_default(axis: &str) -> Option<String> {
    match axis {
        "os" => Some(host_os().to_string()),
        "arch" => Some(host_arch().to_string()),
        "build_type" => Some("Release".to_string()),
        "compiler" => detect_compiler().map(str::to_string),
        _ => None,
    }
}

fn host_os() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "Macos",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        other => other,
    }
}

fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "aarch64" => "armv8",
        "arm" => "armv7",
        other => other,
    }
}

fn detect_compiler() -> Option<&'static str> {
    if cfg!(target_os = "windows") && find_executable("cl").is_some() {
        return Some("msvc");
    }
    if cfg!(target_os = "macos") && find_executable("clang").is_some() {
        return Some("apple-clang");
    }
    if find_executable("gcc").is_some() {
        return Some("gcc");
    }
    if find_executable("clang").is_some() {
        return Some("clang");
    }
    None
}

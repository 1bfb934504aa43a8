//! Package id - a fingerprint of the configuration a package is built with.
//!
//! Two evaluations that agree on name, version, settings, options and
//! `requires` pins produce the same id. Test-only requirements never reach
//! the package, so they do not participate.

use std::collections::BTreeMap;

use crate::core::{Requirement, Settings};
use crate::util::hash::Fingerprint;

/// Compute the package id for a configuration.
pub fn package_id(
    name: &str,
    version: &str,
    settings: &Settings,
    options: &BTreeMap<String, String>,
    requires: &[Requirement],
) -> String {
    let mut fp = Fingerprint::new();
    fp.section("package").update_str(name).update_str(version);

    // Axis order is not significant.
    let sorted: BTreeMap<&str, &str> = settings.iter().collect();
    fp.section("settings");
    for (axis, value) in sorted {
        fp.update_pair(axis, value);
    }

    fp.section("options");
    for (option, value) in options {
        fp.update_pair(option, value);
    }

    fp.section("requires");
    for req in requires {
        fp.update_str(&req.to_string());
    }

    fp.finish()
}

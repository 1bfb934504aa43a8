//! Packager - stage build and source files into the package layout.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::{CopyRule, EvalError};
use crate::ops::source_export::SKIPPED_DIRS;
use crate::util::fs::{copy_file, ensure_dir, relative_files, remove_dir_all_if_exists};

/// What a packaging run copied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageReport {
    /// Files written, relative to the package root, in copy order
    pub files: Vec<PathBuf>,

    /// Indexes of rules that matched nothing
    pub empty_rules: Vec<usize>,
}

/// Rebuild `package_dir` from the copy rules.
///
/// The package root is emptied first, so running twice over the same inputs
/// yields the same tree. Rules run in declaration order; a later rule
/// overwrites files written by an earlier one.
pub fn package(
    rules: &[CopyRule],
    source_dir: &Path,
    build_dir: &Path,
    package_dir: &Path,
) -> Result<PackageReport, EvalError> {
    remove_dir_all_if_exists(package_dir)
        .and_then(|_| ensure_dir(package_dir))
        .map_err(|e| EvalError::packaging(format!("{:#}", e), package_dir))?;

    let mut report = PackageReport::default();

    for (index, rule) in rules.iter().enumerate() {
        let root = match rule.src {
            Some(ref src) => source_dir.join(src),
            None => build_dir.to_path_buf(),
        };

        let copied = apply_rule(rule, &root, package_dir)?;
        if copied.is_empty() {
            tracing::info!(
                "copy rule `{}` -> {} matched no files in {}",
                rule.pattern,
                rule.dst.display(),
                root.display()
            );
            report.empty_rules.push(index);
        }
        report.files.extend(copied);
    }

    tracing::info!(
        "packaged {} file(s) into {}",
        report.files.len(),
        package_dir.display()
    );
    Ok(report)
}

fn apply_rule(rule: &CopyRule, root: &Path, package_dir: &Path) -> Result<Vec<PathBuf>, EvalError> {
    if !root.is_dir() {
        return Err(EvalError::packaging(
            format!("source directory for copy rule `{}` does not exist", rule.pattern),
            root,
        ));
    }

    let candidates = relative_files(root, SKIPPED_DIRS)
        .map_err(|e| EvalError::packaging(format!("{:#}", e), root))?;

    // Flattened destination -> the source that last claimed it
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
    let mut copied = Vec::new();

    for relative in candidates.iter().filter(|p| rule.matches(p)) {
        let dest = if rule.keep_path {
            rule.dst.join(relative)
        } else {
            match relative.file_name() {
                Some(name) => rule.dst.join(name),
                None => continue,
            }
        };

        if let Some(previous) = claimed.insert(dest.clone(), relative.clone()) {
            tracing::warn!(
                "{} and {} both flatten to {}; keeping {}",
                previous.display(),
                relative.display(),
                dest.display(),
                relative.display()
            );
            copied.retain(|p| p != &dest);
        }

        tracing::debug!("copying {} -> {}", relative.display(), dest.display());
        let target = package_dir.join(&dest);
        copy_file(&root.join(relative), &target)
            .map_err(|e| EvalError::packaging(format!("{:#}", e), &target))?;
        copied.push(dest);
    }

    Ok(copied)
}

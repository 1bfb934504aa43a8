//! Snapshot a recipe's exported sources into a clean source folder.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;

use crate::core::copy_rule::MATCH_OPTIONS;
use crate::core::{BuildStep, EvalError, Recipe};
use crate::util::fs::{copy_file, ensure_dir, relative_files, remove_dir_all_if_exists};

/// Directories never exported: berth's own output and VCS metadata.
pub const SKIPPED_DIRS: &[&str] = &[".berth", ".git"];

/// Produce the source folder for a build.
///
/// Without `exports_sources` the recipe directory is used in place. Otherwise
/// every file under the recipe directory matching one of the globs is copied,
/// keeping its relative path, into a freshly emptied `dest`.
pub fn export_sources(recipe: &Recipe, dest: &Path) -> Result<PathBuf, EvalError> {
    if recipe.exports_sources.is_empty() {
        return Ok(recipe.recipe_dir.clone());
    }

    let copied = snapshot(recipe, dest).map_err(|e| EvalError::BuildTool {
        tool: "berth".to_string(),
        step: BuildStep::Export,
        status: None,
        output: format!("{:#}", e),
    })?;

    if copied == 0 {
        tracing::warn!(
            "exports_sources of {} matched no files in {}",
            recipe.reference(),
            recipe.recipe_dir.display()
        );
    } else {
        tracing::info!("exported {} source file(s) into {}", copied, dest.display());
    }

    Ok(dest.to_path_buf())
}

fn snapshot(recipe: &Recipe, dest: &Path) -> Result<usize> {
    let patterns = recipe
        .exports_sources
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("invalid exports_sources pattern `{}`", p)))
        .collect::<Result<Vec<_>>>()?;

    remove_dir_all_if_exists(dest)?;
    ensure_dir(dest)?;

    let mut copied = 0;
    for relative in relative_files(&recipe.recipe_dir, SKIPPED_DIRS)? {
        if patterns
            .iter()
            .any(|p| p.matches_path_with(&relative, MATCH_OPTIONS))
        {
            tracing::debug!("exporting {}", relative.display());
            copy_file(&recipe.recipe_dir.join(&relative), &dest.join(&relative))?;
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{write_beyond_core, recipe_from};
    use tempfile::TempDir;

    #[test]
    fn test_exports_declared_globs_only() {
        let tmp = TempDir::new().unwrap();
        let recipe_path = write_beyond_core(tmp.path());
        std::fs::write(tmp.path().join("notes.md"), "not exported").unwrap();
        std::fs::create_dir_all(tmp.path().join(".berth/old")).unwrap();
        std::fs::write(tmp.path().join(".berth/old/CMakeLists.txt"), "stale").unwrap();

        let recipe = Recipe::load(&recipe_path).unwrap();
        let dest = tmp.path().join(".berth/source");
        let source = export_sources(&recipe, &dest).unwrap();

        assert_eq!(source, dest);
        assert!(dest.join("CMakeLists.txt").is_file());
        assert!(dest.join("include/beyond/core/math/vector.hpp").is_file());
        assert!(dest.join("src/core.cpp").is_file());
        assert!(!dest.join("notes.md").exists());
        assert!(!dest.join("berth.toml").exists());
        assert!(!dest.join(".berth").exists());
    }

    #[test]
    fn test_export_starts_from_empty_folder() {
        let tmp = TempDir::new().unwrap();
        let recipe_path = write_beyond_core(tmp.path());
        let recipe = Recipe::load(&recipe_path).unwrap();

        let dest = tmp.path().join("out/source");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("leftover.cpp"), "").unwrap();

        export_sources(&recipe, &dest).unwrap();
        assert!(!dest.join("leftover.cpp").exists());
    }

    #[test]
    fn test_without_exports_uses_recipe_dir() {
        let recipe = recipe_from("[package]\nname = \"core\"\nversion = \"1.0\"\n");
        let source = export_sources(&recipe, Path::new("/unused")).unwrap();
        assert_eq!(source, recipe.recipe_dir);
    }
}

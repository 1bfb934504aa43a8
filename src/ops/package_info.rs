//! Consumer info exporter.

use std::path::Path;

use crate::core::{ConsumerInfo, EvalError, Recipe};

/// Project the recipe's declared linkage metadata into a consumer info record.
pub fn consumer_info(recipe: &Recipe, package_id: Option<&str>) -> ConsumerInfo {
    let decl = &recipe.package_info;
    ConsumerInfo {
        name: recipe.name.clone(),
        version: recipe.version.clone(),
        package_id: package_id.map(str::to_string),
        libs: decl.libs.clone(),
        include_dirs: decl.include_dirs.clone(),
        lib_dirs: decl.lib_dirs.clone(),
        bin_dirs: decl.bin_dirs.clone(),
    }
}

/// Write the consumer info record into the package root.
pub fn export_info(
    recipe: &Recipe,
    package_id: Option<&str>,
    package_dir: &Path,
) -> Result<ConsumerInfo, EvalError> {
    let info = consumer_info(recipe, package_id);
    let path = info
        .save(package_dir)
        .map_err(|e| EvalError::packaging(format!("{:#}", e), package_dir))?;

    tracing::debug!("wrote consumer info to {}", path.display());
    Ok(info)
}

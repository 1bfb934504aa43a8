//! `berth install` command

use anyhow::Result;

use crate::cli::InstallArgs;
use crate::commands::Project;
use berth::core::Recipe;
use berth::resolver::{resolve, ResolveMode};
use berth::sources::LocalStore;

pub fn execute(args: InstallArgs) -> Result<()> {
    let project = Project::locate(args.path.as_deref())?;
    let recipe = Recipe::load(&project.recipe_path)?;

    let mode = if args.test {
        ResolveMode::Test
    } else {
        ResolveMode::Build
    };
    let store = LocalStore::new(project.store_dir(args.store));

    let resolve = resolve(&recipe, mode, &store)?;

    if resolve.is_empty() {
        eprintln!("    {} has no requirements", recipe.reference());
    }
    for dep in resolve.iter() {
        println!("{} {}", dep.requirement, dep.install_prefix.display());
    }

    Ok(())
}

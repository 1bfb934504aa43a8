//! `berth inspect` command

use anyhow::{Context, Result};

use crate::cli::InspectArgs;
use crate::commands::Project;
use berth::core::dialect::Dialect;
use berth::core::Recipe;

pub fn execute(args: InspectArgs) -> Result<()> {
    let project = Project::locate(args.path.as_deref())?;
    let recipe = Recipe::load(&project.recipe_path)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&recipe).context("failed to render recipe")?
        );
        return Ok(());
    }

    println!("{}", recipe.reference());
    if let Some(description) = &recipe.description {
        println!("  description: {}", description);
    }
    if let Some(license) = &recipe.license {
        println!("  license: {}", license);
    }
    if recipe.dialect == Dialect::Legacy {
        println!("  dialect: legacy (translated)");
    }

    println!("  settings: {}", list(recipe.settings.iter()));
    if !recipe.options.is_empty() {
        println!("  options:");
        for (name, values) in &recipe.options {
            let default = recipe
                .default_options
                .get(name)
                .map(String::as_str)
                .unwrap_or("-");
            println!("    {} = {} [{}]", name, default, values.join(", "));
        }
    }
    println!("  requires: {}", list(recipe.requires.iter()));
    println!("  test_requires: {}", list(recipe.test_requires.iter()));
    println!("  generators: {}", list(recipe.generators.iter()));

    if !recipe.copy_rules.is_empty() {
        println!("  package:");
        for rule in &recipe.copy_rules {
            println!("    {}", rule);
        }
    }
    println!("  libs: {}", list(recipe.package_info.libs.iter()));

    Ok(())
}

fn list<T: std::fmt::Display>(items: impl Iterator<Item = T>) -> String {
    let items: Vec<String> = items.map(|i| i.to_string()).collect();
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

//! `berth create` command

use anyhow::{Context, Result};

use crate::cli::CreateArgs;
use crate::commands::{parse_pairs, spinner, GlobalArgs, Project};
use berth::builder::CMakeTool;
use berth::ops::{evaluate_with, EvalOptions, Lifecycle, Stage};
use berth::resolver::ResolveMode;
use berth::sources::LocalStore;

pub fn execute(args: CreateArgs, global: &GlobalArgs) -> Result<()> {
    let project = Project::locate(args.path.as_deref())?;
    let config = &project.config;

    let opts = EvalOptions {
        mode: if args.test {
            ResolveMode::Test
        } else {
            ResolveMode::Build
        },
        setting_overrides: parse_pairs(&args.settings, "setting")?,
        setting_defaults: config.settings.clone(),
        option_overrides: parse_pairs(&args.options, "option")?,
        output_dir: args.output_dir,
        // Jobs: CLI > config > None (let the build tool decide)
        jobs: args.jobs.or(config.build.jobs),
    };

    let store = LocalStore::new(project.store_dir(args.store));
    let tool = CMakeTool::new()
        .with_program(args.cmake.or_else(|| config.build.cmake.clone()))
        .with_generator(config.build.generator.clone());

    let pb = spinner(global)?;
    pb.set_message("parsing recipe");
    let result = evaluate_with(&project.recipe_path, &opts, &store, &tool, |state| {
        let next = match state {
            Lifecycle::Reached(Stage::Parsed) => "resolving dependencies",
            Lifecycle::Reached(Stage::DependenciesResolved) => "building",
            Lifecycle::Reached(Stage::Built) => "packaging",
            Lifecycle::Reached(Stage::Packaged) => "exporting consumer info",
            Lifecycle::Reached(Stage::InfoExported) => "done",
            Lifecycle::Failed { .. } | Lifecycle::Pending => "failed",
        };
        pb.set_message(next);
    });
    pb.finish_and_clear();
    let evaluation = result?;

    eprintln!(
        "    Finished {} -> {}",
        evaluation.recipe.reference(),
        evaluation.package_dir.display()
    );

    if args.install {
        let prefix = store
            .install(&evaluation.package_dir, &evaluation.info)
            .with_context(|| format!("failed to install {}", evaluation.recipe.reference()))?;
        eprintln!(
            "   Installed {} -> {}",
            evaluation.recipe.reference(),
            prefix.display()
        );
    }

    print!(
        "{}",
        toml::to_string_pretty(&evaluation.info).context("failed to render consumer info")?
    );

    Ok(())
}

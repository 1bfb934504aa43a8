//! Berth CLI - evaluate native library recipes into packages

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use berth::core::recipe::RecipeNotFound;
use berth::util::diagnostic::{emit, suggestions};
use berth::util::Diagnostic;
use berth::EvalError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        if let Some(eval) = e.downcast_ref::<EvalError>() {
            emit(&eval.to_diagnostic(), color);
        } else if let Some(missing) = e.downcast_ref::<RecipeNotFound>() {
            let diag =
                Diagnostic::error(missing.to_string()).with_suggestion(suggestions::NO_RECIPE);
            emit(&diag, color);
        } else {
            eprintln!("error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("berth=debug")
    } else {
        EnvFilter::new("berth=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let global = commands::GlobalArgs {
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Create(args) => commands::create::execute(args, &global),
        Commands::Install(args) => commands::install::execute(args),
        Commands::Inspect(args) => commands::inspect::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Berth - evaluate native library recipes into distributable packages
#[derive(Parser)]
#[command(name = "berth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve, build and package a recipe
    Create(CreateArgs),

    /// Resolve a recipe's requirements without building
    Install(InstallArgs),

    /// Show a parsed recipe
    Inspect(InspectArgs),

    /// Show the consumer info of a stored package
    Info(InfoArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct CreateArgs {
    /// Recipe file or the directory containing it (default: search upward)
    pub path: Option<PathBuf>,

    /// Set a settings axis (repeatable)
    #[arg(short = 's', long = "setting", value_name = "AXIS=VALUE")]
    pub settings: Vec<String>,

    /// Set an option (repeatable)
    #[arg(short = 'o', long = "option", value_name = "OPTION=VALUE")]
    pub options: Vec<String>,

    /// Include test-only requirements
    #[arg(long)]
    pub test: bool,

    /// Publish the finished package into the store
    #[arg(long)]
    pub install: bool,

    /// Root for the source, build and package folders
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Package store root
    #[arg(long, env = "BERTH_STORE")]
    pub store: Option<PathBuf>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Path to the cmake executable
    #[arg(long)]
    pub cmake: Option<PathBuf>,
}

#[derive(Args)]
pub struct InstallArgs {
    /// Recipe file or the directory containing it (default: search upward)
    pub path: Option<PathBuf>,

    /// Include test-only requirements
    #[arg(long)]
    pub test: bool,

    /// Package store root
    #[arg(long, env = "BERTH_STORE")]
    pub store: Option<PathBuf>,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Recipe file or the directory containing it (default: search upward)
    pub path: Option<PathBuf>,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Package reference (`name/version`)
    pub reference: String,

    /// Package store root
    #[arg(long, env = "BERTH_STORE")]
    pub store: Option<PathBuf>,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

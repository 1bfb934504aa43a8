//! Command implementations.

pub mod completions;
pub mod create;
pub mod info;
pub mod inspect;
pub mod install;

use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};

use berth::core::RECIPE_FILE;
use berth::util::{Config, GlobalContext};

/// Flags shared by every command.
pub struct GlobalArgs {
    pub verbose: bool,
}

/// A located recipe and the configuration that applies to it.
pub struct Project {
    pub ctx: GlobalContext,
    pub recipe_path: PathBuf,
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    /// Locate the recipe from an explicit path (file or directory) or by
    /// searching upward from the current directory.
    pub fn locate(path: Option<&Path>) -> Result<Self> {
        let ctx = GlobalContext::new()?;

        let recipe_path = match path {
            Some(p) if p.is_dir() => ctx.cwd().join(p).join(RECIPE_FILE),
            Some(p) => ctx.cwd().join(p),
            None => ctx.find_recipe()?,
        };
        if !recipe_path.is_file() {
            bail!("recipe not found: {}", recipe_path.display());
        }

        let root = match recipe_path.parent() {
            Some(parent) => parent.to_path_buf(),
            None => ctx.cwd().to_path_buf(),
        };
        let config = ctx.load_config(&root);

        Ok(Project {
            ctx,
            recipe_path,
            root,
            config,
        })
    }

    /// Store root: CLI flag, then config, then `~/.berth/store`.
    pub fn store_dir(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.unwrap_or_else(|| self.ctx.store_dir(&self.config, &self.root))
    }
}

/// Parse repeated `KEY=VALUE` flags.
pub fn parse_pairs(values: &[String], what: &str) -> Result<BTreeMap<String, String>> {
    let mut pairs = BTreeMap::new();
    for value in values {
        match value.split_once('=') {
            Some((key, val)) if !key.trim().is_empty() && !val.trim().is_empty() => {
                pairs.insert(key.trim().to_string(), val.trim().to_string());
            }
            _ => bail!("invalid {} `{}`: expected KEY=VALUE", what, value),
        }
    }
    Ok(pairs)
}

/// A spinner on stderr, hidden when stderr is not a terminal or verbose
/// logging would interleave with it.
pub fn spinner(global: &GlobalArgs) -> Result<ProgressBar> {
    if global.verbose || !std::io::stderr().is_terminal() {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

//! `berth info` command

use anyhow::{Context, Result};

use crate::cli::InfoArgs;
use berth::core::Requirement;
use berth::sources::LocalStore;
use berth::util::{Config, GlobalContext};

pub fn execute(args: InfoArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let req = Requirement::parse(&args.reference)?;

    // No recipe is involved, so only the global config applies.
    let config = Config::load_or_default(&ctx.config_path());
    let store = LocalStore::new(
        args.store
            .unwrap_or_else(|| ctx.store_dir(&config, ctx.cwd())),
    );

    let info = store.info(&req)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&info).context("failed to render consumer info")?
        );
    } else {
        println!("# {}", store.prefix(req.name(), req.version()).display());
        print!(
            "{}",
            toml::to_string_pretty(&info).context("failed to render consumer info")?
        );
    }

    Ok(())
}

use std::path::Path;

use anyhow::{bail, Result};
use gridframe_cli::cli::ConfigCommands;
use gridframe_cli::config::GridframeConfig;

pub fn handle(command: &ConfigCommands, config: &GridframeConfig, explicit: Option<&Path>) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            print!("{}", toml::to_string_pretty(config)?);
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = GridframeConfig::target_path(explicit)?;
            if path.exists() && !force {
                bail!("{} already exists; pass --force to overwrite", path.display());
            }
            GridframeConfig::default().save_to(&path)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}

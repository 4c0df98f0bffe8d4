use std::io::{self, Write};

use anyhow::Result;
use gridframe_cli::cli::VariantCommands;
use gridframe_cli::config::Settings;
use tabwriter::TabWriter;

use super::{open_network, persist};

pub fn handle(command: &VariantCommands, settings: &Settings) -> Result<()> {
    match command {
        VariantCommands::List { network } => {
            let network = open_network(network, settings)?;
            let working = network.get_working_variant_id()?;

            let mut writer = TabWriter::new(io::stdout());
            writeln!(writer, "VARIANT\tWORKING")?;
            for id in network.get_variant_ids()? {
                let marker = if id == working { "*" } else { "" };
                writeln!(writer, "{}\t{}", id, marker)?;
            }
            writer.flush()?;
            Ok(())
        }
        VariantCommands::Clone {
            network,
            src,
            target,
            overwrite,
            select,
            output,
        } => {
            let mut network = open_network(network, settings)?;
            network.clone_variant(src, target, *overwrite)?;
            if *select {
                network.set_working_variant(target)?;
            }
            println!("Cloned {} into {}", src, target);
            persist(&network, output.as_deref())
        }
        VariantCommands::Remove {
            network,
            id,
            output,
        } => {
            let mut network = open_network(network, settings)?;
            network.remove_variant(id)?;
            println!("Removed {}", id);
            persist(&network, output.as_deref())
        }
    }
}

pub mod catalog;
pub mod config;
pub mod elements;
pub mod variants;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use gridframe::{ElementCategory, ElementTable, Network};
use gridframe_cli::config::Settings;
use gridframe_cli::source::{save_snapshot, NetworkSource};
use gridframe_engine::MemoryEngine;
use tabwriter::TabWriter;
use tracing::warn;

pub fn parse_category(raw: &str) -> Result<ElementCategory> {
    raw.parse().map_err(anyhow::Error::msg)
}

/// Open `source` in a fresh engine with the invocation's per-unit settings.
pub fn open_network(source: &str, settings: &Settings) -> Result<Network<MemoryEngine>> {
    let engine = Arc::new(MemoryEngine::new());
    let mut network = NetworkSource::parse(source).open(engine)?;
    network.set_power_base(settings.power_base)?;
    if settings.per_unit {
        network.activate_per_unit();
    }
    Ok(network)
}

/// Save when an output path was given.
pub fn persist(network: &Network<MemoryEngine>, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        save_snapshot(network, path)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

pub fn warn_missing_bases(network: &Network<MemoryEngine>) {
    let diagnostics = network.last_diagnostics();
    if !diagnostics.has_issues() {
        return;
    }
    warn!("per-unit conversion: {}", diagnostics.summary());
    for issue in &diagnostics.issues {
        warn!("{}", issue);
    }
}

pub fn print_table(table: &ElementTable, composite: bool, decimal_places: usize) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    let mut header = vec!["ID"];
    if composite {
        header.push("NUM");
    }
    header.extend(table.column_names());
    writeln!(writer, "{}", header.join("\t"))?;

    for (row, key) in table.index().iter().enumerate() {
        let mut cells = vec![key.id.clone()];
        if composite {
            cells.push(key.num.map(|n| n.to_string()).unwrap_or_default());
        }
        for series in table.columns() {
            let cell = series
                .data
                .get(row)
                .map(|value| format!("{:.*}", decimal_places, value))
                .unwrap_or_default();
            cells.push(cell);
        }
        writeln!(writer, "{}", cells.join("\t"))?;
    }
    writer.flush()?;
    Ok(())
}

//! Commands that describe what is available rather than a given network.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use gridframe::rules::rules_for;
use gridframe::{ElementCategory, Network, NetworkEngine};
use gridframe_engine::{fixtures, MemoryEngine};
use tabwriter::TabWriter;

use super::parse_category;

pub fn categories() -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "CATEGORY\tKEY\tCONVERTED COLUMNS")?;
    for category in ElementCategory::ALL {
        let key = if category.has_composite_key() {
            "id, num"
        } else {
            "id"
        };
        writeln!(writer, "{}\t{}\t{}", category, key, rules_for(category).len())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn columns(category: &str) -> Result<()> {
    let category = parse_category(category)?;
    let rules = rules_for(category);
    let engine = MemoryEngine::new();

    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "COLUMN\tTYPE\tWRITABLE\tPER-UNIT")?;
    for spec in engine.columns(category) {
        let dimension = rules
            .iter()
            .find(|rule| rule.column == spec.name)
            .map(|rule| format!("{:?}", rule.dimension).to_lowercase())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            spec.name,
            spec.series_type.as_str(),
            if spec.writable { "yes" } else { "no" },
            dimension
        )?;
    }
    writer.flush()?;
    Ok(())
}

pub fn demo() -> Result<()> {
    let engine = Arc::new(MemoryEngine::new());

    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "NAME\tID\tCASE DATE\tSUBSTATIONS\tGENERATORS\tLOADS\tLINES")?;
    for name in fixtures::FIXTURES {
        let Some(handle) = fixtures::by_name(&engine, name) else {
            continue;
        };
        let network = Network::from_handle(Arc::clone(&engine), handle?);
        let metadata = network.metadata()?;
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            name,
            metadata.id,
            metadata.case_date.format("%Y-%m-%d %H:%M"),
            network.get_substations()?.len(),
            network.get_generators()?.len(),
            network.get_loads()?.len(),
            network.get_lines()?.len(),
        )?;
    }
    writer.flush()?;
    Ok(())
}

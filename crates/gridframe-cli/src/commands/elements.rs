//! Commands that read or modify the elements of one network.

use std::collections::HashSet;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use gridframe::{ElementFilter, RowKey};
use gridframe_cli::assignment::{update_tables, Assignment};
use gridframe_cli::cli::{OutputFormat, ToggleAction};
use gridframe_cli::config::Settings;
use tracing::info;

use super::{open_network, parse_category, persist, print_table, warn_missing_bases};

pub fn show(
    source: &str,
    category: &str,
    columns: &[String],
    variant: Option<&str>,
    format: OutputFormat,
    settings: &Settings,
) -> Result<()> {
    let category = parse_category(category)?;
    let mut network = open_network(source, settings)?;
    if let Some(variant) = variant {
        network.set_working_variant(variant)?;
    }

    let mut table = network.get_elements(category)?;
    warn_missing_bases(&network);
    if !columns.is_empty() {
        let names: Vec<&str> = columns.iter().map(String::as_str).collect();
        table = table.select(&names)?;
    }

    match format {
        OutputFormat::Plain => {
            print_table(&table, category.has_composite_key(), settings.decimal_places)
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(io::stdout(), &table)
                .context("serializing element table to JSON")?;
            println!();
            Ok(())
        }
    }
}

pub fn ids(
    source: &str,
    category: &str,
    nominal_v: &[f64],
    countries: &[String],
    settings: &Settings,
) -> Result<()> {
    let category = parse_category(category)?;
    let network = open_network(source, settings)?;
    let filter = ElementFilter {
        nominal_voltages: (!nominal_v.is_empty()).then(|| nominal_v.to_vec()),
        countries: (!countries.is_empty()).then(|| countries.to_vec()),
    };
    for id in network.get_elements_ids(category, &filter)? {
        println!("{}", id);
    }
    Ok(())
}

pub fn update(
    source: &str,
    category: &str,
    assignments: &[String],
    variant: Option<&str>,
    output: Option<&Path>,
    settings: &Settings,
) -> Result<()> {
    let category = parse_category(category)?;
    let assignments = assignments
        .iter()
        .map(|raw| raw.parse::<Assignment>())
        .collect::<Result<Vec<_>>>()?;

    let mut network = open_network(source, settings)?;
    if let Some(variant) = variant {
        network.set_working_variant(variant)?;
    }

    let tables = update_tables(category, &network.columns(category), &assignments)?;
    for table in &tables {
        network.update_elements(category, table)?;
    }
    info!(%category, cells = assignments.len(), "elements updated");

    let keys: HashSet<&RowKey> = assignments.iter().map(|a| &a.key).collect();
    let mut names: Vec<&str> = Vec::new();
    for assignment in &assignments {
        if !names.contains(&assignment.column.as_str()) {
            names.push(&assignment.column);
        }
    }
    let updated = network
        .get_elements(category)?
        .filter_rows(|key| keys.contains(key))
        .select(&names)?;
    print_table(&updated, category.has_composite_key(), settings.decimal_places)?;

    persist(&network, output)
}

pub fn toggle(
    source: &str,
    action: ToggleAction,
    id: &str,
    output: Option<&Path>,
    settings: &Settings,
) -> Result<()> {
    let mut network = open_network(source, settings)?;
    let (changed, verb) = match action {
        ToggleAction::Open => (network.open_switch(id)?, "opened"),
        ToggleAction::Close => (network.close_switch(id)?, "closed"),
        ToggleAction::Connect => (network.connect(id)?, "connected"),
        ToggleAction::Disconnect => (network.disconnect(id)?, "disconnected"),
    };
    if changed {
        println!("{} {}", id, verb);
    } else {
        println!("{} already {}", id, verb);
    }
    persist(&network, output)
}

pub fn dump(source: &str, output: Option<&Path>, settings: &Settings) -> Result<()> {
    let network = open_network(source, settings)?;
    match output {
        Some(_) => persist(&network, output),
        None => {
            println!("{}", network.dump_to_string()?);
            Ok(())
        }
    }
}

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    /// Configuration file (defaults to ~/.gridframe/config.toml)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Express physical quantities in per-unit
    #[arg(long, global = true)]
    pub per_unit: bool,

    /// Base apparent power in MVA used for per-unit conversion
    #[arg(long, global = true)]
    pub power_base: Option<f64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List element categories
    Categories,
    /// List the columns of a category with their types
    Columns {
        /// Element category, e.g. `generator` or `two_windings_transformer`
        category: String,
    },
    /// List the built-in networks
    Demo,
    /// Print the elements of one category
    Show {
        /// Built-in network name or snapshot file
        #[arg(value_hint = ValueHint::FilePath)]
        network: String,
        /// Element category
        category: String,
        /// Only print these columns
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
        /// Read from this variant instead of the working one
        #[arg(long)]
        variant: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
    /// List element ids, optionally filtered
    Ids {
        /// Built-in network name or snapshot file
        #[arg(value_hint = ValueHint::FilePath)]
        network: String,
        /// Element category
        category: String,
        /// Keep elements attached to these nominal voltages (kV)
        #[arg(long = "nominal-v", value_delimiter = ',')]
        nominal_v: Vec<f64>,
        /// Keep elements located in these countries
        #[arg(long = "country", value_delimiter = ',')]
        countries: Vec<String>,
    },
    /// Write attribute values and print the updated rows
    Update {
        /// Built-in network name or snapshot file
        #[arg(value_hint = ValueHint::FilePath)]
        network: String,
        /// Element category
        category: String,
        /// Assignment `ID.COLUMN=VALUE`, or `ID[NUM].COLUMN=VALUE` for steps and points
        #[arg(long = "set", required = true)]
        assignments: Vec<String>,
        /// Apply the update to this variant
        #[arg(long)]
        variant: Option<String>,
        /// Save the updated network as a snapshot
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
    /// Open or close a switch, connect or disconnect an element
    Toggle {
        /// Built-in network name or snapshot file
        #[arg(value_hint = ValueHint::FilePath)]
        network: String,
        #[arg(value_enum)]
        action: ToggleAction,
        /// Switch or connectable id
        id: String,
        /// Save the updated network as a snapshot
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
    /// Write a network snapshot
    Dump {
        /// Built-in network name or snapshot file
        #[arg(value_hint = ValueHint::FilePath)]
        network: String,
        /// Destination file; stdout when omitted
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
    /// Variant management
    Variants {
        #[command(subcommand)]
        command: VariantCommands,
    },
    /// Configuration file management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum VariantCommands {
    /// List variants, marking the working one
    List {
        #[arg(value_hint = ValueHint::FilePath)]
        network: String,
    },
    /// Copy a variant
    Clone {
        #[arg(value_hint = ValueHint::FilePath)]
        network: String,
        /// Source variant
        src: String,
        /// Target variant
        target: String,
        /// Replace the target if it already exists
        #[arg(long)]
        overwrite: bool,
        /// Make the target the working variant
        #[arg(long)]
        select: bool,
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
    /// Remove a variant other than the working one
    Remove {
        #[arg(value_hint = ValueHint::FilePath)]
        network: String,
        id: String,
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ToggleAction {
    Open,
    Close,
    Connect,
    Disconnect,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "gridframe-cli",
            "show",
            "eurostag_example",
            "load",
            "--per-unit",
            "--power-base",
            "100",
            "--columns",
            "p0,q0",
        ])
        .unwrap();
        assert!(cli.per_unit);
        assert_eq!(cli.power_base, Some(100.0));
        match cli.command {
            Some(Commands::Show { columns, .. }) => assert_eq!(columns, vec!["p0", "q0"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn update_requires_an_assignment() {
        assert!(Cli::try_parse_from(["gridframe-cli", "update", "dangling_line", "load"]).is_err());
    }
}

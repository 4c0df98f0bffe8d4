use std::io;

use anyhow::Result;
use clap::Parser;
use gridframe_cli::cli::{build_cli_command, Cli, Commands, ConfigCommands};
use gridframe_cli::config::GridframeConfig;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod commands;

/// `RUST_LOG`, when set, wins over `--log-level`.
fn init_tracing(level: tracing::Level) -> Result<()> {
    let builder = FmtSubscriber::builder().with_writer(io::stderr);
    if std::env::var_os("RUST_LOG").is_some() {
        let subscriber = builder.with_env_filter(EnvFilter::from_default_env()).finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = builder.with_max_level(level).finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level)?;

    // `config init` must work before any file exists
    let config = match &cli.command {
        Some(Commands::Config {
            command: ConfigCommands::Init { .. },
        }) => GridframeConfig::default(),
        _ => GridframeConfig::resolve(cli.config.as_deref())?,
    };
    let settings = config.settings(cli.per_unit, cli.power_base);

    match &cli.command {
        Some(Commands::Categories) => commands::catalog::categories(),
        Some(Commands::Columns { category }) => commands::catalog::columns(category),
        Some(Commands::Demo) => commands::catalog::demo(),
        Some(Commands::Show {
            network,
            category,
            columns,
            variant,
            format,
        }) => commands::elements::show(
            network,
            category,
            columns,
            variant.as_deref(),
            *format,
            &settings,
        ),
        Some(Commands::Ids {
            network,
            category,
            nominal_v,
            countries,
        }) => commands::elements::ids(network, category, nominal_v, countries, &settings),
        Some(Commands::Update {
            network,
            category,
            assignments,
            variant,
            output,
        }) => commands::elements::update(
            network,
            category,
            assignments,
            variant.as_deref(),
            output.as_deref(),
            &settings,
        ),
        Some(Commands::Toggle {
            network,
            action,
            id,
            output,
        }) => commands::elements::toggle(network, *action, id, output.as_deref(), &settings),
        Some(Commands::Dump { network, output }) => {
            commands::elements::dump(network, output.as_deref(), &settings)
        }
        Some(Commands::Variants { command }) => commands::variants::handle(command, &settings),
        Some(Commands::Config { command }) => {
            commands::config::handle(command, &config, cli.config.as_deref())
        }
        None => {
            build_cli_command().print_help()?;
            println!();
            Ok(())
        }
    }
}

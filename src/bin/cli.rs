#![cfg(not(tarpaulin_include))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use specs::export::export_specs;
use specs::google::GoogleClient;
use specs::logger::setup_logger;
use specs::sync::{SyncConfig, Synchronizer};
use specs::{Config, Result};

#[derive(Parser, Debug)]
#[command(
    name = "specs-cli",
    about = "Maintain the specs tracking spreadsheet and its local export"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rebuild the tracking sheet from every team folder in Drive
    UpdateSpreadsheet,
    /// Save the live tracking sheet to SPECS_FILE as JSON lines
    ExportSpecs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    setup_logger(&config);

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: &Config) -> Result<()> {
    let client = GoogleClient::from_config(config)?;

    match command {
        Command::UpdateSpreadsheet => {
            let report = Synchronizer::new(&client, &client, SyncConfig::from(config)).run()?;
            if report.failed > 0 {
                log::warn!("{} documents could not be parsed", report.failed);
            }
        }
        Command::ExportSpecs => {
            export_specs(&client, config)?;
        }
    }

    Ok(())
}

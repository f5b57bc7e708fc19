//! fgairports CLI - Command-line interface
//!
//! Builds the airport digest from FlightGear apt.dat files and queries it.

mod commands;
mod error;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use fgairports::logging::{init_logging, LoggingGuard};

use commands::common::load_config;
use error::CliError;

#[derive(Parser)]
#[command(name = "fgairports")]
#[command(version = fgairports::VERSION)]
#[command(about = "Index and query FlightGear apt.dat airport data", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.fgairports/config.ini)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the airport digest if any apt.dat file changed
    Build {
        /// Rebuild even when the digest is up to date
        #[arg(long)]
        force: bool,
    },
    /// Show the digest location, freshness and source files
    Status,
    /// Show full detail of one airport
    Show {
        /// Airport identifier (case-insensitive)
        icao: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List airports from the digest
    List {
        /// Only airports whose identifier or name contains this text
        #[arg(long)]
        filter: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Create the configuration file with default settings
    Init,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();

    if let Commands::Init = cli.command {
        return commands::init::run(config_path);
    }

    let _logging = start_logging(config_path)?;
    tracing::debug!(version = fgairports::VERSION, "fgairports starting");

    match cli.command {
        Commands::Build { force } => commands::build::run(config_path, force),
        Commands::Status => commands::status::run(config_path),
        Commands::Show { icao, json } => commands::show::run(config_path, &icao, json),
        Commands::List { filter, json } => {
            commands::list::run(config_path, filter.as_deref(), json)
        }
        Commands::Init => commands::init::run(config_path),
    }
}

fn start_logging(config_path: Option<&Path>) -> Result<LoggingGuard, CliError> {
    let config = load_config(config_path)?;
    init_logging(&config.logging.directory, &config.logging.file)
        .map_err(|e| CliError::LoggingInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_show() {
        let cli = Cli::try_parse_from(["fgairports", "show", "lfbo", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Show { ref icao, json: true } if icao == "lfbo"
        ));
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli =
            Cli::try_parse_from(["fgairports", "list", "--config", "/tmp/x.ini"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/x.ini")));
    }
}

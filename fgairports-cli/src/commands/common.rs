//! Common helpers shared across CLI commands.

use std::path::Path;

use fgairports::config::{config_file_path, ConfigFile};
use fgairports::database::DatabaseConfig;
use serde::Serialize;

use crate::error::CliError;

/// Load the configuration from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);
    Ok(ConfigFile::load_from(&path)?)
}

/// Resolve the database settings, failing when no apt.dat file is known.
pub fn database_config(config: &ConfigFile) -> Result<DatabaseConfig, CliError> {
    let db_config = config.database_config();
    if db_config.apt_dat_paths.is_empty() {
        return Err(CliError::NoAptDatFiles);
    }
    Ok(db_config)
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format a length in metres with a feet equivalent.
pub fn format_length(metres: f64) -> String {
    format!("{:.0} m ({:.0} ft)", metres, metres / fgairports::geodesy::METERS_PER_FOOT)
}

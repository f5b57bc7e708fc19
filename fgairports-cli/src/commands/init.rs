//! Init command - initialize configuration file.

use std::path::{Path, PathBuf};

use fgairports::config::{config_file_path, ConfigFile};
use fgairports::flightgear::{default_apt_dat_path, FG_ROOT_ENV};

use crate::error::CliError;

/// Run the init command.
pub fn run(config_path: Option<&Path>) -> Result<(), CliError> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);

    // Keep existing settings, only fill in what is missing
    let mut config = ConfigFile::load_from(&path).unwrap_or_default();
    if config.apt_dat.fg_root.is_none() {
        config.apt_dat.fg_root = detect_fg_root();
    }
    config.save_to(&path)?;

    match &config.apt_dat.fg_root {
        Some(root) => {
            println!("FlightGear data directory:");
            println!("  {}", root.display());
        }
        None => {
            println!("FlightGear data directory not detected.");
            println!("Set fg_root or list apt.dat files in the config file.");
        }
    }
    println!();
    println!("Configuration file: {}", path.display());
    println!();
    println!("Edit this file to add scenery paths or explicit apt.dat files.");
    Ok(())
}

/// `$FG_ROOT` when it points at a directory with the default apt.dat.
fn detect_fg_root() -> Option<PathBuf> {
    let root = PathBuf::from(std::env::var_os(FG_ROOT_ENV)?);
    default_apt_dat_path(&root).is_file().then_some(root)
}

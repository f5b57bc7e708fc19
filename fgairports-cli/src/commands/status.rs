//! Status command - show digest location, freshness and source files.

use std::path::Path;

use chrono::{DateTime, Local};
use fgairports::digest::{check_freshness, read_digest, DigestReadMode, Freshness};

use super::common::{database_config, load_config};
use crate::error::CliError;

/// Run the status command.
pub fn run(config_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let db_config = database_config(&config)?;

    println!("Airport digest: {}", db_config.digest_path.display());

    let freshness = check_freshness(&db_config.digest_path, &db_config.apt_dat_paths)?;
    match &freshness {
        Freshness::Fresh => println!("  Status: up to date"),
        Freshness::Stale(reason) => println!("  Status: needs rebuild ({})", reason),
    }

    if freshness.is_fresh() {
        let contents = read_digest(&db_config.digest_path, DigestReadMode::HeaderOnly)?;
        println!();
        println!("Indexed apt.dat files (highest priority first):");
        for (index, info) in contents.files.iter().enumerate() {
            println!("  [{}] {}", index, info.path.display());
            println!(
                "      {} bytes, {} uncompressed, modified {}",
                info.size,
                info.uncompressed_size,
                format_timestamp(info.timestamp)
            );
        }
    } else {
        println!();
        println!("Configured apt.dat files (highest priority first):");
        for (index, path) in db_config.apt_dat_paths.iter().enumerate() {
            println!("  [{}] {}", index, path.display());
        }
        println!();
        println!("Run 'fgairports build' to rebuild the digest.");
    }
    Ok(())
}

fn format_timestamp(seconds: f64) -> String {
    DateTime::from_timestamp(seconds.trunc() as i64, 0)
        .map(|utc| {
            utc.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| format!("{}", seconds))
}

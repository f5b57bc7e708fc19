//! Build command - rebuild the airport digest from the apt.dat files.

use std::path::Path;
use std::sync::Arc;

use fgairports::digest::{
    check_freshness, DigestBuildPhase, DigestBuildProgress, DigestBuilder, DigestProgressCallback,
    Freshness,
};
use indicatif::{ProgressBar, ProgressStyle};

use super::common::{database_config, load_config};
use crate::error::CliError;

const BYTES_TEMPLATE: &str =
    "{spinner:.green} {msg:30!} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})";
const ITEMS_TEMPLATE: &str = "{spinner:.green} {msg:30!} [{bar:40.cyan/blue}] {pos}/{len}";

/// Run the build command.
pub fn run(config_path: Option<&Path>, force: bool) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let db_config = database_config(&config)?;

    if !force {
        match check_freshness(&db_config.digest_path, &db_config.apt_dat_paths)? {
            Freshness::Fresh => {
                println!(
                    "Airport digest is up to date: {}",
                    db_config.digest_path.display()
                );
                println!("Use --force to rebuild it anyway.");
                return Ok(());
            }
            Freshness::Stale(reason) => println!("Rebuilding airport digest: {}", reason),
        }
    }

    println!("Indexing {} apt.dat files:", db_config.apt_dat_paths.len());
    for path in &db_config.apt_dat_paths {
        println!("  {}", path.display());
    }
    println!();

    let bar = ProgressBar::new(0);
    let report = DigestBuilder::new(db_config.digest.clone())
        .with_progress(progress_callback(bar.clone()))
        .build(&db_config.apt_dat_paths, &db_config.digest_path)?;
    bar.finish_and_clear();

    println!(
        "Indexed {} airports in {:.1}s",
        report.airport_count,
        report.elapsed.as_secs_f64()
    );
    if report.duplicate_count > 0 {
        println!(
            "  {} duplicate definitions ignored (first file wins)",
            report.duplicate_count
        );
    }
    if report.skipped_count > 0 {
        println!(
            "  {} airports without any position skipped",
            report.skipped_count
        );
    }
    println!("Digest written to {}", report.digest_path.display());
    Ok(())
}

/// Drive `bar` from digest build progress, switching units per phase.
fn progress_callback(bar: ProgressBar) -> DigestProgressCallback {
    Arc::new(move |progress: DigestBuildProgress| {
        match progress.phase {
            DigestBuildPhase::ReadingSources => {
                if bar.length() != Some(progress.total) {
                    bar.set_style(style(BYTES_TEMPLATE));
                    bar.set_length(progress.total);
                }
                let file = progress
                    .current_file
                    .as_deref()
                    .and_then(Path::file_name)
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                bar.set_message(file);
            }
            DigestBuildPhase::WritingOutput => {
                if progress.done == 0 {
                    bar.set_style(style(ITEMS_TEMPLATE));
                    bar.set_length(progress.total);
                    bar.set_message(progress.phase.to_string());
                }
            }
            DigestBuildPhase::Complete => {}
        }
        bar.set_position(progress.done);
    })
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

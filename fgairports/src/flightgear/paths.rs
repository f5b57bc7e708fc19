//! Discovery of apt.dat files in a FlightGear installation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::AptDatSettings;

/// Well-known FlightGear subdirectories.
pub mod subdirs {
    /// apt.dat files inside a scenery directory.
    pub const NAVDATA_APT: &str = "NavData/apt";
    /// Airports directory inside FG_ROOT.
    pub const AIRPORTS: &str = "Airports";
    /// Default airport database inside `Airports`.
    pub const DEFAULT_APT_DAT: &str = "apt.dat.gz";
}

/// Environment variable naming the FlightGear data directory.
pub const FG_ROOT_ENV: &str = "FG_ROOT";

/// apt.dat files to index, highest priority first.
///
/// Explicitly configured files are used as given. Otherwise each scenery
/// path contributes its `NavData/apt/*.dat` and `*.dat.gz` files, followed by
/// the default `Airports/apt.dat.gz` of FG_ROOT. Duplicates are dropped.
pub fn resolve_apt_dat_paths(settings: &AptDatSettings) -> Vec<PathBuf> {
    if !settings.files.is_empty() {
        return dedup(settings.files.clone());
    }

    let mut paths = Vec::new();
    for scenery in &settings.scenery_paths {
        paths.extend(scenery_apt_dat_files(scenery));
    }

    match fg_root(settings) {
        Some(root) => {
            let default = default_apt_dat_path(&root);
            if default.is_file() {
                paths.push(default);
            } else {
                tracing::warn!(
                    path = %default.display(),
                    "Default apt.dat not found in FG_ROOT"
                );
            }
        }
        None if paths.is_empty() => {
            tracing::warn!("No apt.dat files configured and FG_ROOT is not set");
        }
        None => {}
    }

    dedup(paths)
}

/// `<fg_root>/Airports/apt.dat.gz`
pub fn default_apt_dat_path(fg_root: &Path) -> PathBuf {
    fg_root
        .join(subdirs::AIRPORTS)
        .join(subdirs::DEFAULT_APT_DAT)
}

/// apt.dat files under `<scenery>/NavData/apt`, sorted by name.
pub fn scenery_apt_dat_files(scenery: &Path) -> Vec<PathBuf> {
    let dir = scenery.join(subdirs::NAVDATA_APT);
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());

    let mut files = Vec::new();
    for suffix in ["*.dat", "*.dat.gz"] {
        let pattern = format!("{}/{}", escaped, suffix);
        match glob::glob(&pattern) {
            Ok(entries) => files.extend(entries.flatten().filter(|p| p.is_file())),
            Err(e) => {
                tracing::warn!(pattern = %pattern, error = %e, "Invalid apt.dat search pattern");
            }
        }
    }
    files.sort();

    tracing::debug!(
        scenery = %scenery.display(),
        count = files.len(),
        "Found apt.dat files in scenery path"
    );
    files
}

fn fg_root(settings: &AptDatSettings) -> Option<PathBuf> {
    settings.fg_root.clone().or_else(|| {
        std::env::var_os(FG_ROOT_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    })
}

fn dedup(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

//! Configuration structs, one per INI section.

use std::path::PathBuf;

/// Complete contents of `config.ini`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub apt_dat: AptDatSettings,
    pub digest: DigestSettings,
    pub lookup: LookupSettings,
    pub logging: LoggingSettings,
}

/// `[apt_dat]`: where airport data comes from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AptDatSettings {
    /// Explicit apt.dat files in priority order. When set, nothing is
    /// discovered.
    pub files: Vec<PathBuf>,
    /// Scenery directories searched for `NavData/apt/*.dat[.gz]`.
    pub scenery_paths: Vec<PathBuf>,
    /// FlightGear data directory; `$FG_ROOT` when unset.
    pub fg_root: Option<PathBuf>,
}

/// `[digest]`
#[derive(Debug, Clone, PartialEq)]
pub struct DigestSettings {
    pub path: PathBuf,
    pub progress_line_interval: u64,
    pub progress_airport_interval: usize,
}

/// `[lookup]`
#[derive(Debug, Clone, PartialEq)]
pub struct LookupSettings {
    pub cache_capacity: usize,
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}

//! Default values for all configuration settings.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::digest::{DEFAULT_PROGRESS_AIRPORT_INTERVAL, DEFAULT_PROGRESS_LINE_INTERVAL};
use crate::lookup::DEFAULT_CACHE_CAPACITY;

/// File name of the digest inside the config directory.
pub const DEFAULT_DIGEST_FILE_NAME: &str = "apt_digest";

pub const DEFAULT_LOG_FILE: &str = "fgairports.log";

pub fn default_digest_path() -> PathBuf {
    config_directory().join(DEFAULT_DIGEST_FILE_NAME)
}

pub fn default_log_directory() -> PathBuf {
    config_directory().join("logs")
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            apt_dat: AptDatSettings::default(),
            digest: DigestSettings::default(),
            lookup: LookupSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for DigestSettings {
    fn default() -> Self {
        Self {
            path: default_digest_path(),
            progress_line_interval: DEFAULT_PROGRESS_LINE_INTERVAL,
            progress_airport_interval: DEFAULT_PROGRESS_AIRPORT_INTERVAL,
        }
    }
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

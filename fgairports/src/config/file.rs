//! Configuration file handling for ~/.fgairports/config.ini.
//!
//! Settings structs live in [`super::settings`], defaults in
//! [`super::defaults`], parsing in [`super::parser`] and serialization in
//! [`super::writer`].

use ini::{Ini, ParseOption};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use super::defaults::*;
pub use super::settings::*;

use crate::database::DatabaseConfig;
use crate::digest::DigestConfig;
use crate::flightgear::resolve_apt_dat_paths;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

/// Backslashes are path separators on Windows, not escapes.
fn parse_option() -> ParseOption {
    ParseOption {
        enabled_escape: false,
        ..Default::default()
    }
}

#[cfg(test)]
pub(super) fn load_ini_str(content: &str) -> Result<Ini, ini::ParseError> {
    Ini::load_from_str_opt(content, parse_option())
}

impl ConfigFile {
    /// Load configuration from the default path (~/.fgairports/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file_opt(path, parse_option())?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to the default path (~/.fgairports/config.ini).
    pub fn save(&self) -> Result<(), ConfigFileError> {
        let path = config_file_path();
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create the default config file if it doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }

    /// Database settings with the apt.dat file list resolved.
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            apt_dat_paths: resolve_apt_dat_paths(&self.apt_dat),
            digest_path: self.digest.path.clone(),
            digest: DigestConfig {
                progress_line_interval: self.digest.progress_line_interval,
                progress_airport_interval: self.digest.progress_airport_interval,
            },
            cache_capacity: self.lookup.cache_capacity,
        }
    }
}

/// Get the path to the config directory (~/.fgairports).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fgairports")
}

/// Get the path to the config file (~/.fgairports/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

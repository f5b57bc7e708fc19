//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use fgairports::apt_dat::AptDatError;
use fgairports::config::ConfigFileError;
use fgairports::database::DatabaseError;
use fgairports::digest::DigestError;
use fgairports::lookup::LookupError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be read or written
    Config(ConfigFileError),
    /// No apt.dat file was configured or found
    NoAptDatFiles,
    /// Building or reading the digest failed
    Digest(DigestError),
    /// Opening the database or loading airport detail failed
    Database(DatabaseError),
    /// Failed to serialize output
    Output(serde_json::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::NoAptDatFiles => {
                eprintln!();
                eprintln!("Set one of these in the [apt_dat] section of config.ini:");
                eprintln!("  file = /path/to/apt.dat.gz");
                eprintln!("  scenery_path = /path/to/TerraSync");
                eprintln!("  fg_root = /path/to/fgdata");
                eprintln!("or export FG_ROOT. Run 'fgairports init' to create the file.");
            }
            CliError::Database(DatabaseError::Lookup(e)) if e.is_index_mismatch() => {
                eprintln!();
                eprintln!("The apt.dat files changed since the digest was built.");
                eprintln!("Run 'fgairports build' to refresh it.");
            }
            _ => {}
        }

        process::exit(1)
    }

    /// apt.dat parse error (one with a line number) behind this error.
    fn apt_dat_error(&self) -> Option<&AptDatError> {
        let source = match self {
            CliError::Digest(DigestError::Source(e))
            | CliError::Database(DatabaseError::Digest(DigestError::Source(e)))
            | CliError::Database(DatabaseError::Lookup(LookupError::Source(e))) => e,
            _ => return None,
        };
        source.line().map(|_| source)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(e) = self.apt_dat_error() {
            return write!(f, "Failed to parse apt.dat: {}", e);
        }
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::NoAptDatFiles => write!(f, "No apt.dat files found"),
            CliError::Digest(e) => write!(f, "Airport digest error: {}", e),
            CliError::Database(e) => write!(f, "{}", e),
            CliError::Output(e) => write!(f, "Failed to write output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Digest(e) => Some(e),
            CliError::Database(e) => Some(e),
            CliError::Output(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<DigestError> for CliError {
    fn from(e: DigestError) -> Self {
        CliError::Digest(e)
    }
}

impl From<DatabaseError> for CliError {
    fn from(e: DatabaseError) -> Self {
        CliError::Database(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e)
    }
}

//! User configuration stored in `~/.fgairports/config.ini`.
//!
//! # Example
//!
//! ```no_run
//! use fgairports::config::ConfigFile;
//!
//! let config = ConfigFile::load()?;
//! let database = config.database_config();
//! println!("{} apt.dat files", database.apt_dat_paths.len());
//! # Ok::<(), fgairports::config::ConfigFileError>(())
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFile, ConfigFileError};
pub use defaults::{
    default_digest_path, default_log_directory, DEFAULT_DIGEST_FILE_NAME, DEFAULT_LOG_FILE,
};
pub use settings::{AptDatSettings, DigestSettings, LoggingSettings, LookupSettings};

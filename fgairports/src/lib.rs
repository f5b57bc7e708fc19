//! fgairports - FlightGear airport database engine
//!
//! Parses X-Plane/FlightGear `apt.dat` files (plain or gzip-compressed),
//! reduces them to a compact on-disk digest with one line per airport, and
//! reads full airport detail back on demand by byte offset.
//!
//! # High-Level API
//!
//! The [`database`] module ties everything together:
//!
//! ```no_run
//! use fgairports::config::ConfigFile;
//! use fgairports::database::AirportDatabase;
//!
//! let config = ConfigFile::load()?;
//! let mut db = AirportDatabase::open(config.database_config(), None)?;
//!
//! for stub in db.search("Toulouse") {
//!     println!("{} {}", stub.icao, stub.name);
//! }
//! let airport = db.airport("LFBO")?;
//! println!("{} runways", airport.runways().len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod airport;
pub mod apt_dat;
pub mod config;
pub mod database;
pub mod digest;
pub mod flightgear;
pub mod geodesy;
pub mod logging;
pub mod lookup;

/// Version of the fgairports library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

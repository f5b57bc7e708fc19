//! Reading X-Plane/FlightGear `apt.dat` airport files.
//!
//! # Format
//!
//! An apt.dat file starts with a one-character platform line (`I` or `A`)
//! and a line beginning with the format version. Every following line is a
//! record introduced by an integer row code:
//!
//! ```text
//! I
//! 1000 Version - data cycle 2013.10
//!
//! 1   499 0 0 LFBO Toulouse Blagnac
//! 100 45.00 1 0 0.25 1 2 1 14R 43.64 1.35 0.00 120.00 3 0 1 0 32L 43.61 1.37 ...
//! 1300 43.62 1.36 90.0 gate jets Gate 10
//! 99
//! ```
//!
//! Rows 1, 16 and 17 start an airport; everything up to the next such row
//! (or row 99) belongs to it. Files ending in `.gz` are read through a
//! gzip decoder.
//!
//! # Example
//!
//! ```ignore
//! use fgairports::apt_dat::{extract_stub, AptDatReader};
//!
//! let mut reader = AptDatReader::open("apt.dat.gz")?;
//! while let Some(raw) = reader.next_airport(0)? {
//!     if let Some(stub) = extract_stub(&raw, reader.path())? {
//!         println!("{} {:.4} {:.4}", stub.icao, stub.lat, stub.lon);
//!     }
//! }
//! ```

mod error;
mod extractor;
mod file_info;
mod raw;
mod reader;

pub use error::{AptDatError, FieldKind};
pub use extractor::{extract_airport, extract_stub};
pub use file_info::AptDatFileInfo;
pub use raw::{RawAirportInfo, RawLine, Row, RowCode};
pub use reader::{AptDatReader, MAX_SUPPORTED_VERSION};

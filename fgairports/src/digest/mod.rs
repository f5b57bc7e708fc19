//! The airport digest: a compact on-disk index of every airport.
//!
//! Parsing all apt.dat files takes a while, so the result is reduced to one
//! [`AirportStub`](crate::airport::AirportStub) line per airport and saved.
//! The header records the size and modification time of every apt.dat file
//! used, which is how a stale digest is detected.
//!
//! # Lifecycle
//!
//! ```text
//! check_freshness() ──stale──► DigestBuilder::build() ──► digest file
//!        │                                                    │
//!        └──fresh──────────────► read_digest() ◄──────────────┘
//! ```

mod builder;
mod error;
mod format;
mod freshness;
mod progress;
mod reader;

pub use builder::{
    DigestBuildReport, DigestBuilder, DigestConfig, DEFAULT_PROGRESS_AIRPORT_INTERVAL,
    DEFAULT_PROGRESS_LINE_INTERVAL,
};
pub use error::DigestError;
pub use format::{DIGEST_BANNER, FORMAT_VERSION, MAGIC_NUMBER};
pub use freshness::{check_freshness, is_fresh, Freshness, StaleReason};
pub use progress::{DigestBuildPhase, DigestBuildProgress, DigestProgressCallback};
pub use reader::{read_digest, DigestContents, DigestReadMode};

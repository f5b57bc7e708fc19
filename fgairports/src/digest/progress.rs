//! Progress reporting for digest building.
//!
//! Progress is reported via a callback that can be wired to a progress bar
//! or to logging.

use std::path::PathBuf;
use std::sync::Arc;

/// Progress callback for digest building.
pub type DigestProgressCallback = Arc<dyn Fn(DigestBuildProgress) + Send + Sync>;

/// Phase of digest building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestBuildPhase {
    /// Scanning apt.dat files. Units are bytes on disk.
    ReadingSources,
    /// Writing the digest file. Units are airports.
    WritingOutput,
    Complete,
}

impl std::fmt::Display for DigestBuildPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DigestBuildPhase::ReadingSources => "Reading apt.dat files",
            DigestBuildPhase::WritingOutput => "Writing airport digest",
            DigestBuildPhase::Complete => "Complete",
        })
    }
}

/// Progress information during digest building.
#[derive(Debug, Clone)]
pub struct DigestBuildProgress {
    pub phase: DigestBuildPhase,

    /// apt.dat file being read (reading phase only).
    pub current_file: Option<PathBuf>,

    /// Work done so far, in the unit of the phase.
    pub done: u64,

    /// Total work for the phase.
    pub total: u64,

    /// Airports collected so far.
    pub airports: usize,
}

impl DigestBuildProgress {
    pub fn reading(file: PathBuf, done: u64, total: u64, airports: usize) -> Self {
        Self {
            phase: DigestBuildPhase::ReadingSources,
            current_file: Some(file),
            done: done.min(total),
            total,
            airports,
        }
    }

    pub fn writing(written: usize, airports: usize) -> Self {
        Self {
            phase: DigestBuildPhase::WritingOutput,
            current_file: None,
            done: written as u64,
            total: airports as u64,
            airports,
        }
    }

    pub fn complete(airports: usize) -> Self {
        Self {
            phase: DigestBuildPhase::Complete,
            current_file: None,
            done: airports as u64,
            total: airports as u64,
            airports,
        }
    }

    /// Progress of the current phase as a fraction (0.0 to 1.0).
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.done as f64 / self.total as f64
        }
    }
}

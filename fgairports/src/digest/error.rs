//! Digest error types.

use std::path::PathBuf;

use crate::apt_dat::AptDatError;

/// Errors raised while building or reading the airport digest.
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("I/O error on digest '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' is not an airport digest (line {line}): {reason}", .path.display())]
    UnrecognizedFormat {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error(
        "'{}' has magic number {found}, expected {expected}",
        .path.display()
    )]
    MagicNumberMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error(
        "'{}' has digest format version {found}, expected {expected}",
        .path.display()
    )]
    VersionMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("malformed line {line} in digest '{}': {reason}", .path.display())]
    MalformedLine {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error(transparent)]
    Source(#[from] AptDatError),
}

impl DigestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DigestError::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the digest file itself is unusable and must be rebuilt.
    ///
    /// I/O errors and apt.dat errors are not fixed by rebuilding.
    pub fn requires_rebuild(&self) -> bool {
        matches!(
            self,
            DigestError::UnrecognizedFormat { .. }
                | DigestError::MagicNumberMismatch { .. }
                | DigestError::VersionMismatch { .. }
                | DigestError::MalformedLine { .. }
        )
    }
}

//! Errors raised while reading apt.dat files.

use std::fmt;
use std::path::PathBuf;

/// Kind of value a field was expected to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Latitude,
    Longitude,
    Heading,
    Length,
    Width,
    Elevation,
    Smoothness,
    SurfaceCode,
    ShoulderCode,
    MarkingsCode,
    LightingCode,
    /// `dddd.dddd` pair of per-end distances in legacy runway records.
    LegacyDistancePair,
    /// Generic integer flag or code.
    Integer,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::Latitude => "a latitude",
            FieldKind::Longitude => "a longitude",
            FieldKind::Heading => "a heading",
            FieldKind::Length => "a length",
            FieldKind::Width => "a width",
            FieldKind::Elevation => "an elevation",
            FieldKind::Smoothness => "a smoothness value",
            FieldKind::SurfaceCode => "a surface type code",
            FieldKind::ShoulderCode => "a shoulder type code",
            FieldKind::MarkingsCode => "a runway markings code",
            FieldKind::LightingCode => "a lighting code",
            FieldKind::LegacyDistancePair => "a pair of distances (dddd.dddd)",
            FieldKind::Integer => "an integer",
        };
        f.write_str(s)
    }
}

/// Error type for apt.dat parsing and random access.
///
/// Every variant tied to file content carries the file path and, where
/// meaningful, the 1-based line number so that non-conformant scenery data
/// can be located and repaired.
#[derive(Debug, thiserror::Error)]
pub enum AptDatError {
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse the header of '{}' at line {line}: {reason}", .path.display())]
    HeaderUnparseable {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("invalid record in '{}' at line {line}: {content:?}", .path.display())]
    InvalidRecord {
        path: PathBuf,
        line: u64,
        content: String,
    },

    #[error(
        "'{}', line {line}: cannot parse {raw_value:?} as {expected}",
        .path.display()
    )]
    FieldParseFailure {
        path: PathBuf,
        line: u64,
        raw_value: String,
        expected: FieldKind,
    },

    #[error(
        "'{}', line {line}: row code {row_code} needs at least {expected} fields, found {found}",
        .path.display()
    )]
    InsufficientFields {
        path: PathBuf,
        line: u64,
        row_code: u32,
        expected: usize,
        found: usize,
    },

    #[error(
        "'{}' changed since the airport digest was built: expected airport {expected:?} at byte {byte_offset}, found {}",
        .path.display(),
        describe_found(.found)
    )]
    IndexMismatch {
        path: PathBuf,
        byte_offset: u64,
        expected: String,
        found: Option<String>,
    },
}

fn describe_found(found: &Option<String>) -> String {
    match found {
        Some(icao) => format!("{:?}", icao),
        None => "no airport header".to_string(),
    }
}

impl AptDatError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AptDatError::Io {
            path: path.into(),
            source,
        }
    }

    /// Line number the error refers to, if any.
    pub fn line(&self) -> Option<u64> {
        match self {
            AptDatError::HeaderUnparseable { line, .. }
            | AptDatError::InvalidRecord { line, .. }
            | AptDatError::FieldParseFailure { line, .. }
            | AptDatError::InsufficientFields { line, .. } => Some(*line),
            AptDatError::Io { .. } | AptDatError::IndexMismatch { .. } => None,
        }
    }

    /// True when the apt.dat file no longer matches the digest.
    pub fn is_index_mismatch(&self) -> bool {
        matches!(self, AptDatError::IndexMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_parse_failure_display_names_file_and_line() {
        let err = AptDatError::FieldParseFailure {
            path: PathBuf::from("/scenery/apt.dat"),
            line: 42,
            raw_value: "4x.5".to_string(),
            expected: FieldKind::Latitude,
        };
        let msg = err.to_string();
        assert!(msg.contains("/scenery/apt.dat"));
        assert!(msg.contains("line 42"));
        assert!(msg.contains("\"4x.5\""));
        assert!(msg.contains("a latitude"));
        assert_eq!(err.line(), Some(42));
    }

    #[test]
    fn test_index_mismatch_display() {
        let err = AptDatError::IndexMismatch {
            path: PathBuf::from("apt.dat"),
            byte_offset: 1234,
            expected: "LFBO".to_string(),
            found: None,
        };
        assert!(err.is_index_mismatch());
        assert!(err.to_string().contains("no airport header"));

        let err = AptDatError::IndexMismatch {
            path: PathBuf::from("apt.dat"),
            byte_offset: 1234,
            expected: "LFBO".to_string(),
            found: Some("LFBD".to_string()),
        };
        assert!(err.to_string().contains("\"LFBD\""));
    }
}

//! Loads the airport digest.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::airport::AirportStub;
use crate::apt_dat::AptDatFileInfo;

use super::error::DigestError;
use super::format::{
    parse_airport_line, parse_file_line, DIGEST_BANNER, FILE_PREFIX, FORMAT_VERSION,
    MAGIC_NUMBER, MAGIC_PREFIX, VERSION_PREFIX,
};

/// How much of the digest to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestReadMode {
    /// Only the provenance header (recorded apt.dat files).
    HeaderOnly,
    Full,
}

/// Parsed digest content.
#[derive(Debug, Clone, Default)]
pub struct DigestContents {
    /// apt.dat files in priority order; airport source indices refer to
    /// positions in this list.
    pub files: Vec<AptDatFileInfo>,
    /// Empty in [`DigestReadMode::HeaderOnly`].
    pub airports: BTreeMap<String, AirportStub>,
}

/// Read a digest file.
///
/// The magic number and the format version must match exactly. Any other
/// problem is reported as [`DigestError::UnrecognizedFormat`] in the header
/// or [`DigestError::MalformedLine`] in the airport list; nothing is
/// returned from a partially valid digest.
pub fn read_digest(path: &Path, mode: DigestReadMode) -> Result<DigestContents, DigestError> {
    let file = File::open(path).map_err(|e| DigestError::io(path, e))?;
    let mut lines = BufReader::new(file).lines();
    let mut line_number: u64 = 0;

    let mut next_line = |line_number: &mut u64| -> Result<Option<String>, DigestError> {
        match lines.next() {
            None => Ok(None),
            Some(Ok(line)) => {
                *line_number += 1;
                Ok(Some(line))
            }
            Some(Err(e)) if e.kind() == std::io::ErrorKind::InvalidData => {
                *line_number += 1;
                Err(DigestError::MalformedLine {
                    path: path.to_path_buf(),
                    line: *line_number,
                    reason: "not valid UTF-8".to_string(),
                })
            }
            Some(Err(e)) => Err(DigestError::io(path, e)),
        }
    };
    let unrecognized = |line: u64, reason: String| DigestError::UnrecognizedFormat {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let banner = next_line(&mut line_number)?.unwrap_or_default();
    if banner != DIGEST_BANNER {
        return Err(unrecognized(1, format!("unexpected first line {:?}", banner)));
    }

    let magic_line = next_line(&mut line_number)?.unwrap_or_default();
    let magic = magic_line
        .strip_prefix(MAGIC_PREFIX)
        .and_then(|m| m.trim().parse::<u32>().ok())
        .ok_or_else(|| unrecognized(2, format!("expected magic number, found {:?}", magic_line)))?;
    if magic != MAGIC_NUMBER {
        return Err(DigestError::MagicNumberMismatch {
            path: path.to_path_buf(),
            found: magic,
            expected: MAGIC_NUMBER,
        });
    }

    let version_line = next_line(&mut line_number)?.unwrap_or_default();
    let version = version_line
        .strip_prefix(VERSION_PREFIX)
        .and_then(|v| v.trim().parse::<u32>().ok())
        .ok_or_else(|| {
            unrecognized(3, format!("expected format version, found {:?}", version_line))
        })?;
    if version != FORMAT_VERSION {
        return Err(DigestError::VersionMismatch {
            path: path.to_path_buf(),
            found: version,
            expected: FORMAT_VERSION,
        });
    }

    let mut contents = DigestContents::default();
    loop {
        let Some(line) = next_line(&mut line_number)? else {
            return Err(unrecognized(
                line_number,
                "header is not terminated by a blank line".to_string(),
            ));
        };
        if line.is_empty() {
            break;
        }
        let info = line
            .strip_prefix(FILE_PREFIX)
            .ok_or_else(|| format!("expected an apt.dat file line, found {:?}", line))
            .and_then(parse_file_line)
            .map_err(|reason| unrecognized(line_number, reason))?;
        contents.files.push(info);
    }

    if mode == DigestReadMode::HeaderOnly {
        return Ok(contents);
    }

    let malformed = |line: u64, reason: String| DigestError::MalformedLine {
        path: path.to_path_buf(),
        line,
        reason,
    };
    while let Some(line) = next_line(&mut line_number)? {
        let stub = parse_airport_line(&line).map_err(|reason| malformed(line_number, reason))?;
        if stub.source.file_index >= contents.files.len() {
            return Err(malformed(
                line_number,
                format!("unknown apt.dat file index {}", stub.source.file_index),
            ));
        }
        if contents.airports.contains_key(&stub.icao) {
            return Err(malformed(
                line_number,
                format!("duplicate airport {}", stub.icao),
            ));
        }
        contents.airports.insert(stub.icao.clone(), stub);
    }

    tracing::debug!(
        path = %path.display(),
        files = contents.files.len(),
        airports = contents.airports.len(),
        "Loaded airport digest"
    );
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DIGEST: &str = "FlightGear airport digest file (fgairports)\n\
Magic number: 1781945362\n\
Format version: 1\n\
apt.dat file: /s/apt.dat\x0010 bytes\x0010 uncompressed\x00timestamp 12.5\n\
\n\
KJFK\x00John F Kennedy Intl\x001\x0040.63980000\x00-73.77890000\x008;0;0\x002560.0000;4423.0000\x000;100;5\n\
LFBO\x00Toulouse Blagnac\x001\x0043.62900000\x001.36380000\x004;0;0\x003000.0000;3500.0000\x000;20;2\n";

    fn write(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("apt_digest");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_full_and_header_only() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, DIGEST);

        let full = read_digest(&path, DigestReadMode::Full).unwrap();
        assert_eq!(full.files.len(), 1);
        assert_eq!(full.files[0].timestamp, 12.5);
        assert_eq!(full.airports.len(), 2);
        assert_eq!(full.airports["KJFK"].land_runway_count, 8);

        let header = read_digest(&path, DigestReadMode::HeaderOnly).unwrap();
        assert_eq!(header.files, full.files);
        assert!(header.airports.is_empty());
    }

    #[test]
    fn test_header_errors() {
        let dir = TempDir::new().unwrap();

        let path = write(&dir, "something else\n");
        assert!(matches!(
            read_digest(&path, DigestReadMode::Full),
            Err(DigestError::UnrecognizedFormat { line: 1, .. })
        ));

        let path = write(&dir, &DIGEST.replace("1781945362", "1781945363"));
        assert!(matches!(
            read_digest(&path, DigestReadMode::HeaderOnly),
            Err(DigestError::MagicNumberMismatch {
                found: 1_781_945_363,
                ..
            })
        ));

        let path = write(&dir, &DIGEST.replace("Format version: 1", "Format version: 0"));
        assert!(matches!(
            read_digest(&path, DigestReadMode::HeaderOnly),
            Err(DigestError::VersionMismatch { found: 0, .. })
        ));

        let truncated: String = DIGEST.lines().take(4).map(|l| format!("{}\n", l)).collect();
        let path = write(&dir, &truncated);
        assert!(matches!(
            read_digest(&path, DigestReadMode::HeaderOnly),
            Err(DigestError::UnrecognizedFormat { .. })
        ));
    }

    #[test]
    fn test_body_errors() {
        let dir = TempDir::new().unwrap();

        let path = write(&dir, &DIGEST.replace("\x000;20;2", ""));
        let err = read_digest(&path, DigestReadMode::Full).unwrap_err();
        assert!(matches!(err, DigestError::MalformedLine { line: 7, .. }));
        assert!(err.requires_rebuild());

        // Header-only reads do not look at the body
        assert!(read_digest(&path, DigestReadMode::HeaderOnly).is_ok());

        let path = write(&dir, &DIGEST.replace("0;20;2", "3;20;2"));
        let err = read_digest(&path, DigestReadMode::Full).unwrap_err();
        assert!(err.to_string().contains("unknown apt.dat file index 3"));
    }

    #[test]
    fn test_missing_digest_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = read_digest(&dir.path().join("none"), DigestReadMode::Full).unwrap_err();
        assert!(matches!(err, DigestError::Io { .. }));
        assert!(!err.requires_rebuild());
    }
}

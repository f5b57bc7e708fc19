//! Size and modification time of apt.dat files, recorded in the digest.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use super::error::AptDatError;

/// Identity of one apt.dat file at the time it was indexed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AptDatFileInfo {
    pub path: PathBuf,
    /// Size on disk in bytes.
    pub size: u64,
    /// Size of the decompressed content. For gzip files this comes from the
    /// trailer and is only correct modulo 2^32.
    pub uncompressed_size: u64,
    /// Modification time in seconds since the Unix epoch.
    pub timestamp: f64,
}

impl AptDatFileInfo {
    /// Read the current size and modification time of `path`.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<Self, AptDatError> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|e| AptDatError::io(path, e))?;
        let modified = metadata.modified().map_err(|e| AptDatError::io(path, e))?;
        let size = metadata.len();

        let uncompressed_size = if path.extension().is_some_and(|ext| ext == "gz") {
            gzip_uncompressed_size(path).map_err(|e| AptDatError::io(path, e))?
        } else {
            size
        };

        Ok(Self {
            path: path.to_path_buf(),
            size,
            uncompressed_size,
            timestamp: seconds_since_epoch(modified),
        })
    }

    /// True when both describe the same file content (path, size and
    /// modification time).
    pub fn same_file_state(&self, other: &AptDatFileInfo) -> bool {
        self.path == other.path && self.size == other.size && self.timestamp == other.timestamp
    }
}

fn seconds_since_epoch(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

/// ISIZE field of the gzip trailer (last four bytes, little-endian).
fn gzip_uncompressed_size(path: &Path) -> std::io::Result<u64> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::End(-4))?;
    let mut trailer = [0u8; 4];
    file.read_exact(&mut trailer)?;
    Ok(u64::from(u32::from_le_bytes(trailer)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::TempDir;

    #[test]
    fn test_probe_plain_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("apt.dat");
        std::fs::write(&path, "I\n1000 Version\n99\n").unwrap();
        filetime::set_file_mtime(&path, filetime::FileTime::from_unix_time(1_600_000_000, 0))
            .unwrap();

        let info = AptDatFileInfo::probe(&path).unwrap();
        assert_eq!(info.size, 18);
        assert_eq!(info.uncompressed_size, 18);
        assert_eq!(info.timestamp, 1_600_000_000.0);
    }

    #[test]
    fn test_probe_gzip_reads_trailer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("apt.dat.gz");
        let content = "I\n1000 Version\n".repeat(100);
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::best());
        encoder.write_all(content.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let info = AptDatFileInfo::probe(&path).unwrap();
        assert_eq!(info.uncompressed_size, content.len() as u64);
        assert!(info.size < info.uncompressed_size);
    }

    #[test]
    fn test_probe_missing_file() {
        let err = AptDatFileInfo::probe("/nonexistent/apt.dat").unwrap_err();
        assert!(matches!(err, AptDatError::Io { .. }));
    }

    #[test]
    fn test_same_file_state() {
        let a = AptDatFileInfo {
            path: PathBuf::from("apt.dat"),
            size: 10,
            uncompressed_size: 10,
            timestamp: 5.5,
        };
        let mut b = a.clone();
        assert!(a.same_file_state(&b));
        b.timestamp = 5.6;
        assert!(!a.same_file_state(&b));
    }
}

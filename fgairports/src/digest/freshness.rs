//! Decides whether the digest still matches the apt.dat files on disk.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::apt_dat::AptDatFileInfo;

use super::error::DigestError;
use super::reader::{read_digest, DigestReadMode};

/// Why the digest has to be rebuilt.
#[derive(Debug, Clone, PartialEq)]
pub enum StaleReason {
    DigestMissing,
    /// The digest exists but cannot be parsed.
    DigestUnreadable(String),
    FileCountChanged { recorded: usize, current: usize },
    FileListChanged { index: usize, recorded: PathBuf, current: PathBuf },
    /// Size or modification time differ.
    FileModified { path: PathBuf },
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::DigestMissing => write!(f, "no digest has been built yet"),
            StaleReason::DigestUnreadable(reason) => write!(f, "digest is unreadable: {}", reason),
            StaleReason::FileCountChanged { recorded, current } => write!(
                f,
                "{} apt.dat files configured, digest was built from {}",
                current, recorded
            ),
            StaleReason::FileListChanged {
                index,
                recorded,
                current,
            } => write!(
                f,
                "apt.dat file #{} is now '{}' instead of '{}'",
                index,
                current.display(),
                recorded.display()
            ),
            StaleReason::FileModified { path } => {
                write!(f, "'{}' changed since the digest was built", path.display())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Freshness {
    Fresh,
    Stale(StaleReason),
}

impl Freshness {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Freshness::Fresh)
    }
}

/// Compare the digest header with the current state of `apt_dat_paths`.
///
/// A missing or structurally invalid digest is stale. Errors probing the
/// apt.dat files themselves are returned.
pub fn check_freshness(
    digest_path: &Path,
    apt_dat_paths: &[PathBuf],
) -> Result<Freshness, DigestError> {
    let recorded = match read_digest(digest_path, DigestReadMode::HeaderOnly) {
        Ok(contents) => contents.files,
        Err(DigestError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
            return Ok(Freshness::Stale(StaleReason::DigestMissing));
        }
        Err(e) if e.requires_rebuild() => {
            return Ok(Freshness::Stale(StaleReason::DigestUnreadable(e.to_string())));
        }
        Err(e) => return Err(e),
    };

    if recorded.len() != apt_dat_paths.len() {
        return Ok(Freshness::Stale(StaleReason::FileCountChanged {
            recorded: recorded.len(),
            current: apt_dat_paths.len(),
        }));
    }

    for (index, (old, path)) in recorded.iter().zip(apt_dat_paths).enumerate() {
        if old.path != *path {
            return Ok(Freshness::Stale(StaleReason::FileListChanged {
                index,
                recorded: old.path.clone(),
                current: path.clone(),
            }));
        }
        let current = AptDatFileInfo::probe(path)?;
        if !old.same_file_state(&current) {
            return Ok(Freshness::Stale(StaleReason::FileModified { path: path.clone() }));
        }
    }

    Ok(Freshness::Fresh)
}

/// Shorthand for `check_freshness(..)?.is_fresh()`.
pub fn is_fresh(digest_path: &Path, apt_dat_paths: &[PathBuf]) -> Result<bool, DigestError> {
    Ok(check_freshness(digest_path, apt_dat_paths)?.is_fresh())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::{DigestBuilder, DigestConfig};
    use tempfile::TempDir;

    const APT: &str = "I\n1000 Version\n17 0 0 0 XHEL Heliport\n102 H1 40.0 -74.0 90.00 20 20 1 0 0 0.25 0\n99\n";

    #[test]
    fn test_missing_and_garbage_digest_are_stale() {
        let dir = TempDir::new().unwrap();
        let apt = dir.path().join("apt.dat");
        std::fs::write(&apt, APT).unwrap();
        let digest = dir.path().join("digest");

        assert_eq!(
            check_freshness(&digest, &[apt.clone()]).unwrap(),
            Freshness::Stale(StaleReason::DigestMissing)
        );

        std::fs::write(&digest, "garbage\n").unwrap();
        assert!(matches!(
            check_freshness(&digest, &[apt]).unwrap(),
            Freshness::Stale(StaleReason::DigestUnreadable(_))
        ));
    }

    #[test]
    fn test_file_list_changes() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.dat");
        let b = dir.path().join("b.dat");
        std::fs::write(&a, APT).unwrap();
        std::fs::write(&b, APT).unwrap();
        let digest = dir.path().join("digest");

        DigestBuilder::new(DigestConfig::default())
            .build(&[a.clone()], &digest)
            .unwrap();
        assert!(is_fresh(&digest, &[a.clone()]).unwrap());

        assert!(matches!(
            check_freshness(&digest, &[a.clone(), b.clone()]).unwrap(),
            Freshness::Stale(StaleReason::FileCountChanged {
                recorded: 1,
                current: 2
            })
        ));
        assert!(matches!(
            check_freshness(&digest, &[b]).unwrap(),
            Freshness::Stale(StaleReason::FileListChanged { index: 0, .. })
        ));
    }

    #[test]
    fn test_vanished_source_propagates() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.dat");
        std::fs::write(&a, APT).unwrap();
        let digest = dir.path().join("digest");
        DigestBuilder::new(DigestConfig::default())
            .build(&[a.clone()], &digest)
            .unwrap();

        std::fs::remove_file(&a).unwrap();
        assert!(matches!(
            check_freshness(&digest, &[a]),
            Err(DigestError::Source(_))
        ));
    }
}

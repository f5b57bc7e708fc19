//! Full airport detail by random access into apt.dat files.
//!
//! The digest records where each airport starts. Looking an airport up
//! re-opens that file, seeks to the recorded offset, checks that the header
//! found there is the expected airport and runs the full extractor on that
//! block only.

mod cache;

use std::path::PathBuf;
use std::sync::Arc;

use crate::airport::{Airport, SourceIndex};
use crate::apt_dat::{extract_airport, AptDatError, AptDatReader};

pub use cache::BoundedCache;

/// Default number of airports kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("apt.dat file index {file_index} is out of range ({file_count} files configured)")]
    UnknownSourceFile { file_index: usize, file_count: usize },

    #[error("airport {icao} no longer has a position in its apt.dat file")]
    NoPosition { icao: String },

    #[error(transparent)]
    Source(#[from] AptDatError),
}

impl LookupError {
    /// True when the apt.dat file changed since the offset was recorded.
    pub fn is_index_mismatch(&self) -> bool {
        matches!(self, LookupError::Source(e) if e.is_index_mismatch())
    }
}

/// Loads and caches full airport detail.
#[derive(Debug)]
pub struct AirportLookup {
    apt_dat_paths: Vec<PathBuf>,
    cache: BoundedCache<String, Arc<Airport>>,
}

impl AirportLookup {
    /// `apt_dat_paths` must be the file list the source indices refer to,
    /// in the same order.
    pub fn new(apt_dat_paths: Vec<PathBuf>, capacity: usize) -> Self {
        Self {
            apt_dat_paths,
            cache: BoundedCache::new(capacity),
        }
    }

    pub fn apt_dat_paths(&self) -> &[PathBuf] {
        &self.apt_dat_paths
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Full detail for `icao`, read from `source`.
    pub fn airport(&mut self, icao: &str, source: SourceIndex) -> Result<Arc<Airport>, LookupError> {
        let key = icao.to_uppercase();
        if let Some(airport) = self.cache.get(&key).filter(|a| a.source == source) {
            return Ok(Arc::clone(airport));
        }

        let path = self
            .apt_dat_paths
            .get(source.file_index)
            .ok_or(LookupError::UnknownSourceFile {
                file_index: source.file_index,
                file_count: self.apt_dat_paths.len(),
            })?;

        let mut reader = AptDatReader::open(path)?;
        let raw = reader.read_airport_at(
            source.file_index,
            source.byte_offset,
            source.line_number,
            &key,
        )?;
        let airport = extract_airport(&raw, path)?
            .map(Arc::new)
            .ok_or_else(|| LookupError::NoPosition { icao: key.clone() })?;

        tracing::debug!(
            icao = %key,
            path = %path.display(),
            offset = source.byte_offset,
            runways = airport.land_runways.len() + airport.water_runways.len(),
            helipads = airport.helipads.len(),
            "Loaded airport detail"
        );

        self.cache.insert(key, Arc::clone(&airport));
        Ok(airport)
    }

    /// Drop all cached airports, e.g. after the digest was rebuilt.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const APT: &str = "I\n1000 Version\n\
17 0 0 0 XONE Heliport One\n102 H1 40.0 -74.0 90.00 20 20 1 0 0 0.25 0\n\
17 0 0 0 XTWO Heliport Two\n102 H1 41.0 -74.0 90.00 20 20 1 0 0 0.25 0\n99\n";

    fn setup() -> (TempDir, AirportLookup, Vec<SourceIndex>) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("apt.dat");
        std::fs::write(&path, APT).unwrap();

        let mut reader = AptDatReader::open(&path).unwrap();
        let mut sources = Vec::new();
        while let Some(raw) = reader.next_airport(0).unwrap() {
            sources.push(raw.source_index());
        }
        (dir, AirportLookup::new(vec![path], 1), sources)
    }

    #[test]
    fn test_lookup_and_cache() {
        let (_dir, mut lookup, sources) = setup();

        let one = lookup.airport("xone", sources[0]).unwrap();
        assert_eq!(one.icao, "XONE");
        let again = lookup.airport("XONE", sources[0]).unwrap();
        assert!(Arc::ptr_eq(&one, &again));

        let two = lookup.airport("XTWO", sources[1]).unwrap();
        assert!((two.lat - 41.0).abs() < 1e-9);
        // Capacity 1: XONE was evicted and is read again
        let one_again = lookup.airport("XONE", sources[0]).unwrap();
        assert!(!Arc::ptr_eq(&one, &one_again));
        assert_eq!(*one, *one_again);
        assert_eq!(lookup.cached_count(), 1);
    }

    #[test]
    fn test_wrong_offset_is_index_mismatch() {
        let (_dir, mut lookup, sources) = setup();
        let err = lookup.airport("XONE", sources[1]).unwrap_err();
        assert!(err.is_index_mismatch());

        let mut shifted = sources[0];
        shifted.byte_offset += 3;
        assert!(lookup.airport("XONE", shifted).unwrap_err().is_index_mismatch());
    }

    #[test]
    fn test_unknown_file_index() {
        let (_dir, mut lookup, sources) = setup();
        let mut bad = sources[0];
        bad.file_index = 4;
        assert!(matches!(
            lookup.airport("XONE", bad),
            Err(LookupError::UnknownSourceFile {
                file_index: 4,
                file_count: 1
            })
        ));
    }
}

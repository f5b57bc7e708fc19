//! Airport database facade.
//!
//! Ties the digest and the random-access lookup together: on open, the
//! digest is rebuilt if it is stale, then loaded; airport detail is then
//! read on demand from the apt.dat files.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::airport::{Airport, AirportStub, AirportUsage};
use crate::apt_dat::AptDatFileInfo;
use crate::digest::{
    check_freshness, read_digest, DigestBuildReport, DigestBuilder, DigestConfig, DigestError,
    DigestProgressCallback, DigestReadMode, Freshness,
};
use crate::lookup::{AirportLookup, LookupError, DEFAULT_CACHE_CAPACITY};

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error(transparent)]
    Digest(#[from] DigestError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("unknown airport: {0}")]
    UnknownAirport(String),
}

/// Where the database reads from and writes to.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// apt.dat files in priority order.
    pub apt_dat_paths: Vec<PathBuf>,
    pub digest_path: PathBuf,
    pub digest: DigestConfig,
    pub cache_capacity: usize,
}

impl DatabaseConfig {
    pub fn new(apt_dat_paths: Vec<PathBuf>, digest_path: PathBuf) -> Self {
        Self {
            apt_dat_paths,
            digest_path,
            digest: DigestConfig::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// All airports of the configured apt.dat files.
pub struct AirportDatabase {
    config: DatabaseConfig,
    files: Vec<AptDatFileInfo>,
    airports: BTreeMap<String, AirportStub>,
    lookup: AirportLookup,
    /// Report of the build done while opening, if any.
    last_build: Option<DigestBuildReport>,
}

impl AirportDatabase {
    /// Open the database, rebuilding the digest first when it is stale.
    ///
    /// If the digest turns out to be unreadable while loading, it is rebuilt
    /// and loaded once more; a second failure is returned.
    pub fn open(
        config: DatabaseConfig,
        progress: Option<DigestProgressCallback>,
    ) -> Result<Self, DatabaseError> {
        let mut last_build = None;

        match check_freshness(&config.digest_path, &config.apt_dat_paths)? {
            Freshness::Fresh => {
                tracing::debug!(digest = %config.digest_path.display(), "Airport digest is up to date");
            }
            Freshness::Stale(reason) => {
                tracing::info!(
                    digest = %config.digest_path.display(),
                    reason = %reason,
                    "Rebuilding airport digest"
                );
                last_build = Some(build(&config, progress.clone())?);
            }
        }

        let contents = match read_digest(&config.digest_path, DigestReadMode::Full) {
            Ok(contents) => contents,
            Err(e) if e.requires_rebuild() => {
                tracing::warn!(
                    digest = %config.digest_path.display(),
                    error = %e,
                    "Airport digest is unreadable, rebuilding it"
                );
                last_build = Some(build(&config, progress)?);
                read_digest(&config.digest_path, DigestReadMode::Full)?
            }
            Err(e) => return Err(e.into()),
        };

        let paths = contents.files.iter().map(|f| f.path.clone()).collect();
        let lookup = AirportLookup::new(paths, config.cache_capacity);

        tracing::info!(
            airports = contents.airports.len(),
            files = contents.files.len(),
            "Airport database loaded"
        );

        Ok(Self {
            config,
            files: contents.files,
            airports: contents.airports,
            lookup,
            last_build,
        })
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// apt.dat files the loaded digest was built from.
    pub fn files(&self) -> &[AptDatFileInfo] {
        &self.files
    }

    pub fn last_build(&self) -> Option<&DigestBuildReport> {
        self.last_build.as_ref()
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    /// All airport summaries, ordered by identifier.
    pub fn airports(&self) -> &BTreeMap<String, AirportStub> {
        &self.airports
    }

    pub fn stub(&self, icao: &str) -> Option<&AirportStub> {
        self.airports.get(&icao.to_uppercase())
    }

    /// Airports whose identifier or name contains `text`.
    pub fn search<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a AirportStub> + 'a {
        self.airports.values().filter(move |stub| stub.matches(text))
    }

    /// Full detail of one airport, read from its apt.dat file.
    pub fn airport(&mut self, icao: &str) -> Result<Arc<Airport>, DatabaseError> {
        let key = icao.to_uppercase();
        let source = self
            .airports
            .get(&key)
            .map(|stub| stub.source)
            .ok_or_else(|| DatabaseError::UnknownAirport(key.clone()))?;
        Ok(self.lookup.airport(&key, source)?)
    }

    /// Store usage statistics for an airport. Returns false for unknown
    /// identifiers.
    pub fn attach_usage(&mut self, icao: &str, usage: AirportUsage) -> bool {
        match self.airports.get_mut(&icao.to_uppercase()) {
            Some(stub) => {
                stub.attach_usage(usage);
                true
            }
            None => false,
        }
    }
}

fn build(
    config: &DatabaseConfig,
    progress: Option<DigestProgressCallback>,
) -> Result<DigestBuildReport, DigestError> {
    let mut builder = DigestBuilder::new(config.digest.clone());
    if let Some(callback) = progress {
        builder = builder.with_progress(callback);
    }
    builder.build(&config.apt_dat_paths, &config.digest_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    const APT: &str = "I\n1000 Version\n\
1 100 0 0 ktst Test Field\n\
100 30.00 1 0 0.25 0 0 0 09 40.00000000 -74.01000000 0 0 0 0 0 0 27 40.00000000 -73.99000000 0 0 0 0 0 0\n\
17 0 0 0 XHEL Heliport\n102 H1 41.0 -74.0 90.00 20 20 1 0 0 0.25 0\n99\n";

    fn config(dir: &TempDir) -> DatabaseConfig {
        let apt = dir.path().join("apt.dat");
        std::fs::write(&apt, APT).unwrap();
        DatabaseConfig::new(vec![apt], dir.path().join("digest"))
    }

    #[test]
    fn test_open_builds_then_reuses_digest() {
        let dir = TempDir::new().unwrap();
        let db = AirportDatabase::open(config(&dir), None).unwrap();
        assert!(db.last_build().is_some());
        assert_eq!(db.len(), 2);
        assert!(db.stub("ktst").is_some());

        let db = AirportDatabase::open(config_without_write(&dir), None).unwrap();
        assert!(db.last_build().is_none());
        assert_eq!(db.search("heli").count(), 1);
    }

    fn config_without_write(dir: &TempDir) -> DatabaseConfig {
        DatabaseConfig::new(vec![dir.path().join("apt.dat")], dir.path().join("digest"))
    }

    #[test]
    fn test_corrupt_body_is_rebuilt_once() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir);
        AirportDatabase::open(cfg.clone(), None).unwrap();

        // Header intact (so the digest looks fresh), body broken
        let digest = std::fs::read_to_string(&cfg.digest_path).unwrap();
        std::fs::write(&cfg.digest_path, format!("{}broken line\n", digest)).unwrap();

        let db = AirportDatabase::open(cfg, None).unwrap();
        assert!(db.last_build().is_some());
        assert_eq!(db.len(), 2);
    }

    #[test]
    fn test_airport_detail_and_usage() {
        let dir = TempDir::new().unwrap();
        let mut db = AirportDatabase::open(config(&dir), None).unwrap();

        let airport = db.airport("KTST").unwrap();
        assert_eq!(airport.land_runways.len(), 2);
        assert_eq!(airport.name, "Test Field");

        assert!(matches!(
            db.airport("NONE"),
            Err(DatabaseError::UnknownAirport(_))
        ));

        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(db.attach_usage("ktst", AirportUsage::from_dates(vec![today], today, 30)));
        assert_eq!(db.stub("KTST").unwrap().usage.recent_use_count, 1);
        assert!(!db.attach_usage("NONE", AirportUsage::default()));
    }
}

//! Builds the airport digest from apt.dat files.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::airport::{AirportStub, SourceIndex};
use crate::apt_dat::{extract_stub, AptDatFileInfo, AptDatReader};

use super::error::DigestError;
use super::format::{
    format_airport_line, format_file_line, DIGEST_BANNER, FORMAT_VERSION, MAGIC_NUMBER,
    MAGIC_PREFIX, VERSION_PREFIX,
};
use super::progress::{DigestBuildProgress, DigestProgressCallback};

/// Default number of apt.dat lines between progress reports.
pub const DEFAULT_PROGRESS_LINE_INTERVAL: u64 = 1000;

/// Default number of written airports between progress reports.
pub const DEFAULT_PROGRESS_AIRPORT_INTERVAL: usize = 300;

/// Digest builder settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestConfig {
    pub progress_line_interval: u64,
    pub progress_airport_interval: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            progress_line_interval: DEFAULT_PROGRESS_LINE_INTERVAL,
            progress_airport_interval: DEFAULT_PROGRESS_AIRPORT_INTERVAL,
        }
    }
}

/// Outcome of a digest build.
#[derive(Debug, Clone)]
pub struct DigestBuildReport {
    pub digest_path: PathBuf,
    pub files: Vec<AptDatFileInfo>,
    pub airport_count: usize,
    /// Definitions ignored because an earlier one had the same identifier.
    pub duplicate_count: usize,
    /// Airports without any position.
    pub skipped_count: usize,
    pub elapsed: Duration,
}

/// Scans apt.dat files and writes the digest.
///
/// Files are read in priority order; when an identifier appears more than
/// once, the first definition wins.
///
/// # Example
///
/// ```ignore
/// use fgairports::digest::{DigestBuilder, DigestConfig};
///
/// let report = DigestBuilder::new(DigestConfig::default())
///     .build(&apt_dat_paths, Path::new("/home/user/.fgairports/apt_digest"))?;
/// println!("{} airports", report.airport_count);
/// ```
pub struct DigestBuilder {
    config: DigestConfig,
    progress: Option<DigestProgressCallback>,
}

impl DigestBuilder {
    pub fn new(config: DigestConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    pub fn with_progress(mut self, callback: DigestProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    fn report(&self, progress: DigestBuildProgress) {
        if let Some(callback) = &self.progress {
            callback(progress);
        }
    }

    pub fn build(
        &self,
        apt_dat_paths: &[PathBuf],
        digest_path: &Path,
    ) -> Result<DigestBuildReport, DigestError> {
        let start = Instant::now();

        let files = apt_dat_paths
            .iter()
            .map(AptDatFileInfo::probe)
            .collect::<Result<Vec<_>, _>>()?;

        let mut stubs: BTreeMap<String, AirportStub> = BTreeMap::new();
        let mut first_definitions: HashMap<String, SourceIndex> = HashMap::new();
        let mut duplicate_count = 0;
        let mut skipped_count = 0;

        let total_bytes: u64 = files.iter().map(|f| f.size).sum();
        let mut bytes_before_file = 0;
        let line_interval = self.config.progress_line_interval.max(1);

        for (file_index, info) in files.iter().enumerate() {
            let mut reader = AptDatReader::open(&info.path)?;
            let mut next_report = line_interval;
            self.report(DigestBuildProgress::reading(
                info.path.clone(),
                bytes_before_file,
                total_bytes,
                stubs.len(),
            ));

            while let Some(raw) = reader.next_airport(file_index)? {
                if reader.line_number() >= next_report {
                    self.report(DigestBuildProgress::reading(
                        info.path.clone(),
                        bytes_before_file + reader.approximate_position(),
                        total_bytes,
                        stubs.len(),
                    ));
                    next_report = (reader.line_number() / line_interval + 1) * line_interval;
                }

                // An identifier is claimed by its first definition, even one
                // that gets skipped for lack of a position
                let icao = raw.icao();
                if let Some(first) = first_definitions.get(&icao) {
                    tracing::info!(
                        icao = %icao,
                        path = %info.path.display(),
                        line = raw.start_line_number,
                        first_file = first.file_index,
                        first_line = first.line_number,
                        "Skipping duplicate airport definition"
                    );
                    duplicate_count += 1;
                    continue;
                }
                first_definitions.insert(icao.clone(), raw.source_index());

                match extract_stub(&raw, &info.path)? {
                    Some(stub) => {
                        stubs.insert(icao, stub);
                    }
                    None => skipped_count += 1,
                }
            }

            tracing::debug!(
                path = %info.path.display(),
                version = reader.version(),
                lines = reader.line_number(),
                "Finished reading apt.dat file"
            );
            bytes_before_file += info.size;
        }

        self.write_digest(digest_path, &files, &stubs)?;
        self.report(DigestBuildProgress::complete(stubs.len()));

        let report = DigestBuildReport {
            digest_path: digest_path.to_path_buf(),
            files,
            airport_count: stubs.len(),
            duplicate_count,
            skipped_count,
            elapsed: start.elapsed(),
        };

        tracing::info!(
            digest = %digest_path.display(),
            files = report.files.len(),
            airports = report.airport_count,
            duplicates = report.duplicate_count,
            skipped = report.skipped_count,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Airport digest built"
        );

        Ok(report)
    }

    fn write_digest(
        &self,
        digest_path: &Path,
        files: &[AptDatFileInfo],
        stubs: &BTreeMap<String, AirportStub>,
    ) -> Result<(), DigestError> {
        if let Some(parent) = digest_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DigestError::io(parent, e))?;
        }

        // Write to a temp file first, then rename into place
        let temp_path = temp_path_for(digest_path);
        let io_err = |e| DigestError::io(&temp_path, e);
        let mut writer = BufWriter::new(File::create(&temp_path).map_err(io_err)?);

        writeln!(writer, "{DIGEST_BANNER}").map_err(io_err)?;
        writeln!(writer, "{MAGIC_PREFIX}{MAGIC_NUMBER}").map_err(io_err)?;
        writeln!(writer, "{VERSION_PREFIX}{FORMAT_VERSION}").map_err(io_err)?;
        for info in files {
            writeln!(writer, "{}", format_file_line(info)).map_err(io_err)?;
        }
        writeln!(writer).map_err(io_err)?;

        let total = stubs.len();
        let interval = self.config.progress_airport_interval.max(1);
        self.report(DigestBuildProgress::writing(0, total));
        for (written, stub) in stubs.values().enumerate() {
            writeln!(writer, "{}", format_airport_line(stub)).map_err(io_err)?;
            if (written + 1) % interval == 0 {
                self.report(DigestBuildProgress::writing(written + 1, total));
            }
        }

        writer.flush().map_err(io_err)?;
        drop(writer);

        std::fs::rename(&temp_path, digest_path).map_err(|e| DigestError::io(digest_path, e))?;
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

//! Streaming record reader for apt.dat files.
//!
//! The reader decodes lines as Latin-1 (every byte maps to one character, so
//! decoding never fails), skips blank lines and `##` comments, and tracks the
//! byte offset and line number of every row. Offsets always refer to the
//! uncompressed stream so they can be used for random access into both
//! plain and gzip-compressed files.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use flate2::read::GzDecoder;
use regex::Regex;

use super::error::AptDatError;
use super::raw::{RawAirportInfo, RawLine, Row, RowCode, AIRPORT_HEADER_MIN_FIELDS};

/// Highest apt.dat format version whose semantics are fully supported.
pub const MAX_SUPPORTED_VERSION: u32 = 1000;

/// Latin-1 rendering of a UTF-8 byte order mark.
const LATIN1_BOM: &str = "\u{ef}\u{bb}\u{bf}";

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)(?:\.\d*)?(?:\s|$)").expect("valid version regex"))
}

/// Counts the bytes pulled from the compressed file, for progress reporting.
struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}

enum LineSource {
    Plain(BufReader<File>),
    Gzip(BufReader<GzDecoder<CountingReader<File>>>),
}

impl LineSource {
    /// Open `path` and position the stream at `offset` uncompressed bytes.
    fn open_at(path: &Path, gzip: bool, offset: u64) -> io::Result<Self> {
        let mut file = File::open(path)?;
        if gzip {
            let decoder = GzDecoder::new(CountingReader {
                inner: file,
                count: 0,
            });
            let mut reader = BufReader::new(decoder);
            if offset > 0 {
                io::copy(&mut reader.by_ref().take(offset), &mut io::sink())?;
            }
            Ok(LineSource::Gzip(reader))
        } else {
            if offset > 0 {
                file.seek(SeekFrom::Start(offset))?;
            }
            Ok(LineSource::Plain(BufReader::new(file)))
        }
    }

    fn read_until_newline(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        match self {
            LineSource::Plain(r) => r.read_until(b'\n', buf),
            LineSource::Gzip(r) => r.read_until(b'\n', buf),
        }
    }

    fn compressed_position(&self) -> Option<u64> {
        match self {
            LineSource::Plain(_) => None,
            LineSource::Gzip(r) => Some(r.get_ref().get_ref().count),
        }
    }
}

/// Sequential reader over the rows of one apt.dat file.
///
/// # Example
///
/// ```ignore
/// use fgairports::apt_dat::AptDatReader;
///
/// let mut reader = AptDatReader::open("/usr/share/games/flightgear/Airports/apt.dat.gz")?;
/// while let Some(raw) = reader.next_airport(0)? {
///     println!("{} at byte {}", raw.icao(), raw.byte_offset);
/// }
/// ```
pub struct AptDatReader {
    path: PathBuf,
    gzip: bool,
    source: LineSource,
    version: u32,
    /// Number of the last physical line read.
    line_number: u64,
    /// Uncompressed offset of the next line to read.
    offset: u64,
    header_end_offset: u64,
    header_end_line: u64,
    peeked: Option<Row>,
    finished: bool,
    buf: Vec<u8>,
}

impl std::fmt::Debug for AptDatReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AptDatReader")
            .field("path", &self.path)
            .field("gzip", &self.gzip)
            .field("version", &self.version)
            .field("line_number", &self.line_number)
            .field("offset", &self.offset)
            .finish()
    }
}

impl AptDatReader {
    /// Open an apt.dat file and parse its two-line header.
    ///
    /// Files whose name ends in `.gz` are decompressed on the fly.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AptDatError> {
        let path = path.as_ref().to_path_buf();
        let gzip = path.extension().is_some_and(|ext| ext == "gz");
        let source = LineSource::open_at(&path, gzip, 0).map_err(|e| AptDatError::io(&path, e))?;

        let mut reader = Self {
            path,
            gzip,
            source,
            version: 0,
            line_number: 0,
            offset: 0,
            header_end_offset: 0,
            header_end_line: 0,
            peeked: None,
            finished: false,
            buf: Vec::with_capacity(256),
        };
        reader.read_header()?;
        Ok(reader)
    }

    /// Path of the file being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Format version announced in the header (e.g. 810, 1000, 1100).
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Number of the last physical line read (1-based).
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Approximate position in the file on disk.
    ///
    /// For gzip files this is the number of compressed bytes consumed, which
    /// is only meaningful for progress display, not for indexing.
    pub fn approximate_position(&self) -> u64 {
        self.source.compressed_position().unwrap_or(self.offset)
    }

    /// Go back to the first line after the header.
    pub fn reset(&mut self) -> Result<(), AptDatError> {
        let (offset, line) = (self.header_end_offset, self.header_end_line);
        self.reposition(offset, line)
    }

    /// Read the next non-blank, non-comment row.
    pub fn next_row(&mut self) -> Result<Option<Row>, AptDatError> {
        if let Some(row) = self.peeked.take() {
            return Ok(Some(row));
        }

        loop {
            let Some((line, byte_offset)) = self.read_line()? else {
                return Ok(None);
            };
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with("##") {
                continue;
            }

            let (code_str, payload) = match trimmed.find(char::is_whitespace) {
                Some(idx) => (&trimmed[..idx], trimmed[idx..].trim_start()),
                None => (trimmed, ""),
            };
            let code = code_str
                .bytes()
                .all(|b| b.is_ascii_digit())
                .then(|| code_str.parse::<u32>().ok())
                .flatten()
                .ok_or_else(|| AptDatError::InvalidRecord {
                    path: self.path.clone(),
                    line: self.line_number,
                    content: trimmed.to_string(),
                })?;

            return Ok(Some(Row {
                code,
                payload: payload.to_string(),
                line_number: self.line_number,
                byte_offset,
            }));
        }
    }

    /// Read the next complete airport definition.
    ///
    /// Rows before the first airport header are ignored. The block ends at
    /// the next airport header, at row code 99 or at end of file. Returns
    /// `None` once no airport remains.
    pub fn next_airport(
        &mut self,
        file_index: usize,
    ) -> Result<Option<RawAirportInfo>, AptDatError> {
        if self.finished {
            return Ok(None);
        }

        let (header, airport_type) = loop {
            let Some(row) = self.next_row()? else {
                self.finished = true;
                return Ok(None);
            };
            let code = RowCode::from(row.code);
            if code == RowCode::EndOfFile {
                self.finished = true;
                return Ok(None);
            }
            if let Some(airport_type) = code.airport_type() {
                break (row, airport_type);
            }
        };

        let first_line_fields: Vec<String> =
            header.payload.split_whitespace().map(str::to_string).collect();
        if first_line_fields.len() < AIRPORT_HEADER_MIN_FIELDS {
            return Err(AptDatError::InsufficientFields {
                path: self.path.clone(),
                line: header.line_number,
                row_code: header.code,
                expected: AIRPORT_HEADER_MIN_FIELDS,
                found: first_line_fields.len(),
            });
        }

        let mut other_lines = Vec::new();
        while let Some(row) = self.next_row()? {
            let code = RowCode::from(row.code);
            if code == RowCode::EndOfFile {
                self.finished = true;
                break;
            }
            if code.airport_type().is_some() {
                self.peeked = Some(row);
                break;
            }
            other_lines.push(RawLine {
                line_number: row.line_number,
                code: row.code,
                payload: row.payload,
            });
        }

        Ok(Some(RawAirportInfo {
            source_file_index: file_index,
            byte_offset: header.byte_offset,
            start_line_number: header.line_number,
            airport_type,
            first_line_fields,
            other_lines,
        }))
    }

    /// Re-read the airport recorded at `byte_offset`.
    ///
    /// The record found there must be an airport header whose identifier is
    /// `expected_icao` (case-insensitive); anything else means the file has
    /// changed since the offset was recorded and yields
    /// [`AptDatError::IndexMismatch`].
    pub fn read_airport_at(
        &mut self,
        file_index: usize,
        byte_offset: u64,
        line_number: u64,
        expected_icao: &str,
    ) -> Result<RawAirportInfo, AptDatError> {
        let expected = expected_icao.to_uppercase();
        self.reposition(byte_offset, line_number.saturating_sub(1))?;

        let mismatch = |path: &Path, found: Option<String>| AptDatError::IndexMismatch {
            path: path.to_path_buf(),
            byte_offset,
            expected: expected.clone(),
            found,
        };

        let row = match self.next_row() {
            Ok(Some(row)) => row,
            Ok(None) | Err(AptDatError::InvalidRecord { .. }) => {
                return Err(mismatch(&self.path, None));
            }
            Err(e) => return Err(e),
        };
        if RowCode::from(row.code).airport_type().is_none() {
            return Err(mismatch(&self.path, None));
        }

        self.peeked = Some(row);
        match self.next_airport(file_index)? {
            Some(raw) if raw.icao() == expected => Ok(raw),
            Some(raw) => Err(mismatch(&self.path, Some(raw.icao()))),
            None => Err(mismatch(&self.path, None)),
        }
    }

    fn reposition(&mut self, offset: u64, line_number: u64) -> Result<(), AptDatError> {
        self.source = LineSource::open_at(&self.path, self.gzip, offset)
            .map_err(|e| AptDatError::io(&self.path, e))?;
        self.offset = offset;
        self.line_number = line_number;
        self.peeked = None;
        self.finished = false;
        Ok(())
    }

    /// Read one physical line; returns it with its starting byte offset.
    fn read_line(&mut self) -> Result<Option<(String, u64)>, AptDatError> {
        self.buf.clear();
        let n = self
            .source
            .read_until_newline(&mut self.buf)
            .map_err(|e| AptDatError::io(&self.path, e))?;
        if n == 0 {
            return Ok(None);
        }

        let start = self.offset;
        self.offset += n as u64;
        self.line_number += 1;

        let line: String = self
            .buf
            .iter()
            .take_while(|&&b| b != b'\n')
            .map(|&b| b as char)
            .collect();
        Ok(Some((line, start)))
    }

    /// Next non-blank physical line, trimmed.
    fn read_non_blank_line(&mut self) -> Result<Option<String>, AptDatError> {
        while let Some((line, _)) = self.read_line()? {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
        Ok(None)
    }

    fn read_header(&mut self) -> Result<(), AptDatError> {
        let unparseable = |reader: &Self, reason: &str| AptDatError::HeaderUnparseable {
            path: reader.path.clone(),
            line: reader.line_number,
            reason: reason.to_string(),
        };

        let marker = self
            .read_non_blank_line()?
            .ok_or_else(|| unparseable(self, "file is empty"))?;
        let marker = marker.strip_prefix(LATIN1_BOM).unwrap_or(&marker);
        if marker.chars().count() != 1 {
            return Err(unparseable(
                self,
                "first line must be a single platform character",
            ));
        }

        let version_line = self
            .read_non_blank_line()?
            .ok_or_else(|| unparseable(self, "missing version line"))?;
        let version = version_regex()
            .captures(&version_line)
            .and_then(|c| c[1].parse::<u32>().ok())
            .ok_or_else(|| unparseable(self, "version line must start with a version number"))?;

        if version > MAX_SUPPORTED_VERSION {
            tracing::warn!(
                path = %self.path.display(),
                version,
                supported = MAX_SUPPORTED_VERSION,
                "apt.dat format version is newer than supported, parsing what we can"
            );
        } else {
            tracing::debug!(path = %self.path.display(), version, "Opened apt.dat file");
        }

        self.version = version;
        self.header_end_offset = self.offset;
        self.header_end_line = self.line_number;
        Ok(())
    }
}

impl Iterator for AptDatReader {
    type Item = Result<Row, AptDatError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

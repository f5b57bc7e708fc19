//! Line format of the digest file.
//!
//! ```text
//! FlightGear airport digest file (fgairports)
//! Magic number: 1781945362
//! Format version: 1
//! apt.dat file: <path>\0<size> bytes\0<uncompressed> uncompressed\0timestamp <secs>
//!
//! <icao>\0<name>\0<type>\0<lat>\0<lon>\0<land>;<water>;<helipads>\0<min>;<max>\0<file>;<offset>;<line>
//! ```
//!
//! Fields are separated by NUL characters, which never occur in apt.dat
//! text. Airport lines are sorted by identifier.

use std::path::PathBuf;

use crate::airport::{AirportStub, AirportType, AirportUsage, RunwayLengthRange, SourceIndex};
use crate::apt_dat::AptDatFileInfo;

pub const DIGEST_BANNER: &str = "FlightGear airport digest file (fgairports)";
pub const MAGIC_NUMBER: u32 = 1_781_945_362;
pub const FORMAT_VERSION: u32 = 1;

pub(crate) const MAGIC_PREFIX: &str = "Magic number: ";
pub(crate) const VERSION_PREFIX: &str = "Format version: ";
pub(crate) const FILE_PREFIX: &str = "apt.dat file: ";

const SEP: char = '\0';
const AIRPORT_FIELDS: usize = 8;

pub(crate) fn format_file_line(info: &AptDatFileInfo) -> String {
    format!(
        "{FILE_PREFIX}{}{SEP}{} bytes{SEP}{} uncompressed{SEP}timestamp {}",
        info.path.display(),
        info.size,
        info.uncompressed_size,
        info.timestamp
    )
}

/// Parse the part of a file line after [`FILE_PREFIX`].
pub(crate) fn parse_file_line(rest: &str) -> Result<AptDatFileInfo, String> {
    let fields: Vec<&str> = rest.split(SEP).collect();
    let [path, size, uncompressed, timestamp] = fields.as_slice() else {
        return Err(format!("expected 4 file fields, found {}", fields.len()));
    };

    let number = |field: &str, suffix: &str| -> Result<u64, String> {
        field
            .strip_suffix(suffix)
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| format!("invalid field {:?}", field))
    };
    let timestamp = timestamp
        .strip_prefix("timestamp ")
        .and_then(|t| t.parse::<f64>().ok())
        .ok_or_else(|| format!("invalid field {:?}", timestamp))?;

    if path.is_empty() {
        return Err("empty apt.dat path".to_string());
    }

    Ok(AptDatFileInfo {
        path: PathBuf::from(path),
        size: number(size, " bytes")?,
        uncompressed_size: number(uncompressed, " uncompressed")?,
        timestamp,
    })
}

pub(crate) fn format_airport_line(stub: &AirportStub) -> String {
    let lengths = stub
        .runway_lengths
        .map(|r| format!("{:.4};{:.4}", r.min_m, r.max_m))
        .unwrap_or_default();
    format!(
        "{icao}{SEP}{name}{SEP}{code}{SEP}{lat:.8}{SEP}{lon:.8}{SEP}{land};{water};{heli}{SEP}{lengths}{SEP}{file};{offset};{line}",
        icao = stub.icao,
        name = stub.name,
        code = stub.airport_type.row_code(),
        lat = stub.lat,
        lon = stub.lon,
        land = stub.land_runway_count,
        water = stub.water_runway_count,
        heli = stub.helipad_count,
        file = stub.source.file_index,
        offset = stub.source.byte_offset,
        line = stub.source.line_number,
    )
}

fn parse_list<T: std::str::FromStr>(field: &str, count: usize, what: &str) -> Result<Vec<T>, String> {
    let values: Vec<T> = field
        .split(';')
        .map(str::parse)
        .collect::<Result<_, _>>()
        .map_err(|_| format!("invalid {} {:?}", what, field))?;
    if values.len() != count {
        return Err(format!("invalid {} {:?}", what, field));
    }
    Ok(values)
}

pub(crate) fn parse_airport_line(line: &str) -> Result<AirportStub, String> {
    let fields: Vec<&str> = line.split(SEP).collect();
    let [icao, name, code, lat, lon, counts, lengths, source] = fields.as_slice() else {
        return Err(format!(
            "expected {} fields, found {}",
            AIRPORT_FIELDS,
            fields.len()
        ));
    };

    if icao.is_empty() {
        return Err("empty airport identifier".to_string());
    }
    let airport_type = code
        .parse::<u32>()
        .ok()
        .and_then(AirportType::from_row_code)
        .ok_or_else(|| format!("invalid airport type {:?}", code))?;
    let lat: f64 = lat
        .parse()
        .map_err(|_| format!("invalid latitude {:?}", lat))?;
    let lon: f64 = lon
        .parse()
        .map_err(|_| format!("invalid longitude {:?}", lon))?;

    let counts: Vec<usize> = parse_list(counts, 3, "runway counts")?;
    let runway_lengths = if lengths.is_empty() {
        None
    } else {
        let v: Vec<f64> = parse_list(lengths, 2, "runway lengths")?;
        Some(RunwayLengthRange {
            min_m: v[0],
            max_m: v[1],
        })
    };
    let source: Vec<u64> = parse_list(source, 3, "source index")?;

    Ok(AirportStub {
        icao: icao.to_string(),
        name: name.to_string(),
        airport_type,
        lat,
        lon,
        land_runway_count: counts[0],
        water_runway_count: counts[1],
        helipad_count: counts[2],
        runway_lengths,
        source: SourceIndex {
            file_index: usize::try_from(source[0]).map_err(|e| e.to_string())?,
            byte_offset: source[1],
            line_number: source[2],
        },
        usage: AirportUsage::default(),
    })
}

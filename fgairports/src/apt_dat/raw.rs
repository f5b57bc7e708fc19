//! Row codes and the raw, per-airport block of apt.dat lines.

use crate::airport::{AirportType, SourceIndex};

/// apt.dat row codes understood by the extractor.
///
/// Unknown codes map to [`RowCode::Other`] and are ignored, so newer files
/// with additional record types still parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowCode {
    LandAirport,
    SeaplaneBase,
    Heliport,
    /// v810 runway or taxiway (code 10).
    LegacyRunway,
    /// v810/v1000 startup location (code 15).
    LegacyStartup,
    LandRunway,
    WaterRunway,
    Helipad,
    /// Airport metadata such as `datum_lat` (code 1302).
    Metadata,
    /// v1000 startup location (code 1300).
    StartupLocation,
    /// Startup location metadata (code 1301).
    StartupMetadata,
    EndOfFile,
    Other(u32),
}

impl From<u32> for RowCode {
    fn from(code: u32) -> Self {
        match code {
            1 => RowCode::LandAirport,
            16 => RowCode::SeaplaneBase,
            17 => RowCode::Heliport,
            10 => RowCode::LegacyRunway,
            15 => RowCode::LegacyStartup,
            100 => RowCode::LandRunway,
            101 => RowCode::WaterRunway,
            102 => RowCode::Helipad,
            1300 => RowCode::StartupLocation,
            1301 => RowCode::StartupMetadata,
            1302 => RowCode::Metadata,
            99 => RowCode::EndOfFile,
            other => RowCode::Other(other),
        }
    }
}

impl RowCode {
    /// Airport type when this code starts an airport definition.
    pub fn airport_type(self) -> Option<AirportType> {
        match self {
            RowCode::LandAirport => Some(AirportType::LandAirport),
            RowCode::SeaplaneBase => Some(AirportType::SeaplaneBase),
            RowCode::Heliport => Some(AirportType::Heliport),
            _ => None,
        }
    }
}

/// One non-blank, non-comment apt.dat line.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Leading integer of the line.
    pub code: u32,
    /// Everything after the row code, trimmed.
    pub payload: String,
    /// 1-based physical line number.
    pub line_number: u64,
    /// Offset of the first byte of the line in the uncompressed stream.
    pub byte_offset: u64,
}

/// A line belonging to an airport block, after its header.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLine {
    pub line_number: u64,
    pub code: u32,
    pub payload: String,
}

/// All lines of one airport definition, as read from an apt.dat file.
///
/// Built while scanning and handed straight to the extractor; never
/// persisted.
#[derive(Debug, Clone)]
pub struct RawAirportInfo {
    pub source_file_index: usize,
    pub byte_offset: u64,
    pub start_line_number: u64,
    pub airport_type: AirportType,
    /// Whitespace-separated fields of the header payload:
    /// elevation, two deprecated fields, identifier, then the name words.
    pub first_line_fields: Vec<String>,
    pub other_lines: Vec<RawLine>,
}

/// Minimum number of header payload fields (elevation, 2 deprecated, ICAO).
pub(crate) const AIRPORT_HEADER_MIN_FIELDS: usize = 4;

impl RawAirportInfo {
    /// Airport identifier, upper-cased.
    pub fn icao(&self) -> String {
        self.first_line_fields
            .get(3)
            .map(|s| s.to_uppercase())
            .unwrap_or_default()
    }

    /// Airport name (may be empty).
    pub fn name(&self) -> String {
        self.first_line_fields
            .get(AIRPORT_HEADER_MIN_FIELDS..)
            .map(|words| words.join(" "))
            .unwrap_or_default()
    }

    pub fn source_index(&self) -> SourceIndex {
        SourceIndex {
            file_index: self.source_file_index,
            byte_offset: self.byte_offset,
            line_number: self.start_line_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_code_mapping() {
        assert_eq!(RowCode::from(1), RowCode::LandAirport);
        assert_eq!(RowCode::from(100), RowCode::LandRunway);
        assert_eq!(RowCode::from(1300), RowCode::StartupLocation);
        assert_eq!(RowCode::from(1201), RowCode::Other(1201));
        assert_eq!(
            RowCode::from(17).airport_type(),
            Some(AirportType::Heliport)
        );
        assert_eq!(RowCode::from(100).airport_type(), None);
    }

    #[test]
    fn test_raw_airport_identity() {
        let raw = RawAirportInfo {
            source_file_index: 1,
            byte_offset: 120,
            start_line_number: 4,
            airport_type: AirportType::LandAirport,
            first_line_fields: ["1500", "0", "0", "lfbo", "Toulouse", "Blagnac"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            other_lines: Vec::new(),
        };

        assert_eq!(raw.icao(), "LFBO");
        assert_eq!(raw.name(), "Toulouse Blagnac");
        assert_eq!(
            raw.source_index(),
            SourceIndex {
                file_index: 1,
                byte_offset: 120,
                line_number: 4
            }
        );
    }
}

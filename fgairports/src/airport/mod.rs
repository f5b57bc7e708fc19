//! Airport value types.
//!
//! Two representations of an airport exist:
//!
//! - [`Airport`]: full detail (runway ends, helipads, parkings), built on
//!   demand by re-reading one airport block from its apt.dat file.
//! - [`AirportStub`]: the lean summary kept in memory for every airport and
//!   persisted in the digest file.
//!
//! Both carry a [`SourceIndex`] pointing back to the airport header in the
//! apt.dat file it came from.

mod parking;
mod runway;
mod stub;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

pub use parking::{natural_key, NaturalKey, Parking, ParkingSource};
pub use runway::{
    reciprocal_runway_name, Helipad, LandRunway, Runway, RunwayMarkings, ShoulderType,
    SurfaceType, WaterRunway,
};
pub use stub::{AirportStub, AirportUsage, RunwayLengthRange};

pub(crate) use runway::corrected_heading;

/// Kind of airport, from the row code of its header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AirportType {
    /// Row code 1.
    LandAirport,
    /// Row code 16.
    SeaplaneBase,
    /// Row code 17.
    Heliport,
}

impl AirportType {
    /// apt.dat row code of the header line.
    pub fn row_code(self) -> u32 {
        match self {
            AirportType::LandAirport => 1,
            AirportType::SeaplaneBase => 16,
            AirportType::Heliport => 17,
        }
    }

    pub fn from_row_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(AirportType::LandAirport),
            16 => Some(AirportType::SeaplaneBase),
            17 => Some(AirportType::Heliport),
            _ => None,
        }
    }
}

impl fmt::Display for AirportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AirportType::LandAirport => "airport",
            AirportType::SeaplaneBase => "seaplane base",
            AirportType::Heliport => "heliport",
        })
    }
}

/// Where an airport definition starts in the configured apt.dat files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceIndex {
    /// Index into the ordered list of apt.dat files.
    pub file_index: usize,
    /// Offset of the header line in the uncompressed stream.
    pub byte_offset: u64,
    /// 1-based line number of the header line.
    pub line_number: u64,
}

/// Full detail for one airport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Airport {
    pub icao: String,
    pub name: String,
    pub airport_type: AirportType,
    /// Spherical centroid of runway ends and helipads.
    pub lat: f64,
    pub lon: f64,
    pub elevation_m: f64,
    pub source: SourceIndex,
    /// One entry per usable runway end.
    pub land_runways: Vec<LandRunway>,
    /// One entry per usable water runway end.
    pub water_runways: Vec<WaterRunway>,
    pub helipads: Vec<Helipad>,
    /// Parkings bucketed by type (`""` for legacy startup locations),
    /// each bucket sorted by natural order of the name.
    pub parkings: BTreeMap<String, Vec<Parking>>,
}

impl Airport {
    /// All runway ends and helipads as one list.
    pub fn runways(&self) -> Vec<Runway> {
        self.land_runways
            .iter()
            .cloned()
            .map(Runway::Land)
            .chain(self.water_runways.iter().cloned().map(Runway::Water))
            .chain(self.helipads.iter().cloned().map(Runway::Helipad))
            .collect()
    }

    /// Find a runway end or helipad by name (case-insensitive).
    pub fn runway(&self, name: &str) -> Option<Runway> {
        self.runways()
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(name))
    }

    /// Total number of parkings across all buckets.
    pub fn parking_count(&self) -> usize {
        self.parkings.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_airport_type_row_codes() {
        for t in [
            AirportType::LandAirport,
            AirportType::SeaplaneBase,
            AirportType::Heliport,
        ] {
            assert_eq!(AirportType::from_row_code(t.row_code()), Some(t));
        }
        assert_eq!(AirportType::from_row_code(100), None);
    }

    #[test]
    fn test_runway_lookup_by_name() {
        let airport = Airport {
            icao: "XTST".to_string(),
            name: "Test".to_string(),
            airport_type: AirportType::Heliport,
            lat: 0.0,
            lon: 0.0,
            elevation_m: 0.0,
            source: SourceIndex {
                file_index: 0,
                byte_offset: 0,
                line_number: 1,
            },
            land_runways: Vec::new(),
            water_runways: Vec::new(),
            helipads: vec![Helipad {
                name: "H1".to_string(),
                lat: 0.0,
                lon: 0.0,
                heading: 0.0,
                length_m: 20.0,
                width_m: 20.0,
                surface: SurfaceType::Concrete,
                shoulder: ShoulderType::None,
                smoothness: None,
                edge_lighting: 0,
            }],
            parkings: BTreeMap::new(),
        };

        assert!(airport.runway("h1").is_some());
        assert!(airport.runway("09").is_none());
        assert_eq!(airport.runways().len(), 1);
        assert_eq!(airport.parking_count(), 0);
    }
}

//! Turns raw airport blocks into [`Airport`] or [`AirportStub`] values.
//!
//! Both outputs go through the same row dispatch. Every record is decoded
//! there (field counts, coordinates, codes, legacy (v810) runway geometry),
//! so the full and summary results agree on the airport position and reject
//! the same malformed input. What differs is handled by a [`RowSink`]:
//!
//! - the full sink keeps every runway attribute, computes lengths and
//!   headings with the most accurate inverse available and collects parkings;
//! - the summary sink only counts runway ends and computes lengths with
//!   [`cheap_distance`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::airport::{
    corrected_heading, natural_key, reciprocal_runway_name, Airport, AirportStub, AirportUsage,
    Helipad, LandRunway, Parking, ParkingSource, RunwayLengthRange, RunwayMarkings, ShoulderType,
    SurfaceType, WaterRunway,
};
use crate::geodesy::{
    best_inverse, cheap_distance, destination, mean_heading, normalize_heading,
    CentroidAccumulator, METERS_PER_FOOT,
};

use super::error::{AptDatError, FieldKind};
use super::raw::{RawAirportInfo, RawLine, RowCode};

const LAND_RUNWAY_MIN_FIELDS: usize = 22;
const WATER_RUNWAY_MIN_FIELDS: usize = 8;
const HELIPAD_MIN_FIELDS: usize = 11;
const LEGACY_RUNWAY_MIN_FIELDS: usize = 13;
const LEGACY_STARTUP_MIN_FIELDS: usize = 3;
const STARTUP_LOCATION_MIN_FIELDS: usize = 5;

/// Designator of taxiway segments in legacy records.
const LEGACY_TAXIWAY: &str = "xxx";

/// Whitespace-separated payload of one row, with typed accessors that
/// report the file and line on failure.
pub(crate) struct Fields<'a> {
    path: &'a Path,
    line: u64,
    code: u32,
    values: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    fn new(path: &'a Path, line: &'a RawLine) -> Self {
        Self {
            path,
            line: line.line_number,
            code: line.code,
            values: line.payload.split_whitespace().collect(),
        }
    }

    fn require(&self, expected: usize) -> Result<(), AptDatError> {
        if self.values.len() < expected {
            return Err(AptDatError::InsufficientFields {
                path: self.path.to_path_buf(),
                line: self.line,
                row_code: self.code,
                expected,
                found: self.values.len(),
            });
        }
        Ok(())
    }

    fn str(&self, idx: usize) -> &'a str {
        self.values.get(idx).copied().unwrap_or("")
    }

    /// Fields from `idx` onwards joined by single spaces.
    fn rest(&self, idx: usize) -> String {
        self.values.get(idx..).map(|v| v.join(" ")).unwrap_or_default()
    }

    fn error(&self, raw: &str, expected: FieldKind) -> AptDatError {
        AptDatError::FieldParseFailure {
            path: self.path.to_path_buf(),
            line: self.line,
            raw_value: raw.to_string(),
            expected,
        }
    }

    fn f64(&self, idx: usize, kind: FieldKind) -> Result<f64, AptDatError> {
        let raw = self.str(idx);
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.error(raw, kind))
    }

    fn u32(&self, idx: usize, kind: FieldKind) -> Result<u32, AptDatError> {
        let raw = self.str(idx);
        raw.parse::<u32>().map_err(|_| self.error(raw, kind))
    }

    fn lat(&self, idx: usize) -> Result<f64, AptDatError> {
        let lat = self.f64(idx, FieldKind::Latitude)?;
        if !(-90.0..=90.0).contains(&lat) {
            return Err(self.error(self.str(idx), FieldKind::Latitude));
        }
        Ok(lat)
    }

    fn lon(&self, idx: usize) -> Result<f64, AptDatError> {
        let lon = self.f64(idx, FieldKind::Longitude)?;
        if !(-180.0..=180.0).contains(&lon) {
            return Err(self.error(self.str(idx), FieldKind::Longitude));
        }
        Ok(lon)
    }

    /// `dddd.dddd` field of legacy records: one distance in feet per end.
    fn legacy_pair_m(&self, idx: usize) -> Result<[f64; 2], AptDatError> {
        let raw = self.str(idx);
        let parse = |s: &str| s.parse::<u32>().ok().map(|ft| f64::from(ft) * METERS_PER_FOOT);
        raw.split_once('.')
            .and_then(|(a, b)| Some([parse(a)?, parse(b)?]))
            .ok_or_else(|| self.error(raw, FieldKind::LegacyDistancePair))
    }

    /// Smoothness in `[0, 1]`; anything else is logged and dropped.
    fn smoothness(&self, idx: usize) -> Result<Option<f64>, AptDatError> {
        let value = self.f64(idx, FieldKind::Smoothness)?;
        if (0.0..=1.0).contains(&value) {
            Ok(Some(value))
        } else {
            tracing::warn!(
                path = %self.path.display(),
                line = self.line,
                value,
                "Runway smoothness outside [0, 1], ignoring it"
            );
            Ok(None)
        }
    }
}

/// One end of a row 100.
pub(crate) struct RunwayEndRecord {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub displaced_threshold_m: f64,
    pub overrun_m: f64,
    pub markings: RunwayMarkings,
}

/// A decoded row 100.
pub(crate) struct LandRunwayRecord {
    pub width_m: f64,
    pub surface: SurfaceType,
    pub shoulder: ShoulderType,
    pub smoothness: Option<f64>,
    pub ends: [RunwayEndRecord; 2],
}

impl LandRunwayRecord {
    fn parse(fields: &Fields<'_>) -> Result<Self, AptDatError> {
        fields.require(LAND_RUNWAY_MIN_FIELDS)?;
        let end = |base: usize| -> Result<RunwayEndRecord, AptDatError> {
            Ok(RunwayEndRecord {
                name: fields.str(base).to_string(),
                lat: fields.lat(base + 1)?,
                lon: fields.lon(base + 2)?,
                displaced_threshold_m: fields.f64(base + 3, FieldKind::Length)?,
                overrun_m: fields.f64(base + 4, FieldKind::Length)?,
                markings: RunwayMarkings::from_code(
                    fields.u32(base + 5, FieldKind::MarkingsCode)?,
                ),
            })
        };

        Ok(Self {
            width_m: fields.f64(0, FieldKind::Width)?,
            surface: SurfaceType::from_code(fields.u32(1, FieldKind::SurfaceCode)?),
            shoulder: ShoulderType::from_code(fields.u32(2, FieldKind::ShoulderCode)?),
            smoothness: fields.smoothness(3)?,
            ends: [end(7)?, end(16)?],
        })
    }

    fn thresholds(&self) -> [(f64, f64); 2] {
        [
            (self.ends[0].lat, self.ends[0].lon),
            (self.ends[1].lat, self.ends[1].lon),
        ]
    }
}

/// A decoded row 101.
pub(crate) struct WaterRunwayRecord {
    pub width_m: f64,
    pub perimeter_buoys: bool,
    pub names: [String; 2],
    pub thresholds: [(f64, f64); 2],
}

impl WaterRunwayRecord {
    fn parse(fields: &Fields<'_>) -> Result<Self, AptDatError> {
        fields.require(WATER_RUNWAY_MIN_FIELDS)?;
        Ok(Self {
            width_m: fields.f64(0, FieldKind::Width)?,
            perimeter_buoys: fields.u32(1, FieldKind::Integer)? != 0,
            names: [fields.str(2).to_string(), fields.str(5).to_string()],
            thresholds: [
                (fields.lat(3)?, fields.lon(4)?),
                (fields.lat(6)?, fields.lon(7)?),
            ],
        })
    }
}

/// Decode a row 102.
fn parse_helipad(fields: &Fields<'_>) -> Result<Helipad, AptDatError> {
    fields.require(HELIPAD_MIN_FIELDS)?;
    Ok(Helipad {
        name: fields.str(0).to_string(),
        lat: fields.lat(1)?,
        lon: fields.lon(2)?,
        heading: normalize_heading(fields.f64(3, FieldKind::Heading)?),
        length_m: fields.f64(4, FieldKind::Length)?,
        width_m: fields.f64(5, FieldKind::Width)?,
        surface: SurfaceType::from_code(fields.u32(6, FieldKind::SurfaceCode)?),
        shoulder: ShoulderType::from_code(fields.u32(8, FieldKind::ShoulderCode)?),
        smoothness: fields.smoothness(9)?,
        edge_lighting: fields.u32(10, FieldKind::LightingCode)?,
    })
}

/// A decoded row 15 or 1300.
pub(crate) struct StartupRecord {
    /// `""` for row 15.
    pub parking_type: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub heading: f64,
}

impl StartupRecord {
    fn parse_legacy(fields: &Fields<'_>) -> Result<Self, AptDatError> {
        fields.require(LEGACY_STARTUP_MIN_FIELDS)?;
        Self::parse(fields, String::new(), fields.rest(3))
    }

    fn parse_location(fields: &Fields<'_>) -> Result<Self, AptDatError> {
        fields.require(STARTUP_LOCATION_MIN_FIELDS)?;
        Self::parse(fields, fields.str(3).to_string(), fields.rest(5))
    }

    fn parse(
        fields: &Fields<'_>,
        parking_type: String,
        name: String,
    ) -> Result<Self, AptDatError> {
        Ok(Self {
            parking_type,
            name,
            lat: fields.lat(0)?,
            lon: fields.lon(1)?,
            heading: normalize_heading(fields.f64(2, FieldKind::Heading)?),
        })
    }
}

/// A decoded row 1301.
pub(crate) struct StartupMetadataRecord {
    pub radius_m: Option<f64>,
    pub operation_type: Option<String>,
    pub airline_codes: BTreeSet<String>,
}

impl StartupMetadataRecord {
    fn parse(fields: &Fields<'_>) -> Self {
        let operation_type = Some(fields.str(1))
            .filter(|op| !op.is_empty())
            .map(str::to_string);
        let airline_codes = fields
            .rest(2)
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_uppercase)
            .collect();
        Self {
            radius_m: radius_for_size_code(fields.str(0)),
            operation_type,
            airline_codes,
        }
    }
}

/// Half the maximum wingspan of an ICAO aircraft size category.
fn radius_for_size_code(code: &str) -> Option<f64> {
    let span = match code {
        "A" => 15.0,
        "B" => 24.0,
        "C" => 36.0,
        "D" => 52.0,
        "E" => 65.0,
        "F" => 80.0,
        _ => return None,
    };
    Some(span / 2.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LegacyKind {
    Land,
    Water,
    Helipad,
}

/// Direct geodesic used to place legacy runway ends.
type DestinationFn = fn(f64, f64, f64, f64) -> Option<(f64, f64)>;

/// A decoded legacy (v810) runway or helipad record.
///
/// v810 gives the runway centre, heading and length instead of the two
/// thresholds; the thresholds are computed with the direct geodesic.
pub(crate) struct LegacyRunway {
    pub kind: LegacyKind,
    pub name: String,
    /// Set when the designator carries a valid runway number.
    pub reciprocal_name: Option<String>,
    pub centre: (f64, f64),
    /// Threshold of the named end, then of the reciprocal end.
    pub ends: [(f64, f64); 2],
    /// True heading from the named end, corrected against the runway number.
    pub heading: f64,
    pub length_m: f64,
    pub width_m: f64,
    pub surface_code: u32,
    pub shoulder_code: u32,
    pub markings_code: u32,
    pub displaced_threshold_m: [f64; 2],
    pub overrun_m: [f64; 2],
    pub smoothness: Option<f64>,
}

impl LegacyRunway {
    /// Decode a row 10. Taxiway segments give `None`.
    fn parse(fields: &Fields<'_>) -> Result<Option<Self>, AptDatError> {
        Self::parse_with(fields, destination)
    }

    fn parse_with(
        fields: &Fields<'_>,
        destination: DestinationFn,
    ) -> Result<Option<Self>, AptDatError> {
        if fields.str(2) == LEGACY_TAXIWAY {
            return Ok(None);
        }
        fields.require(LEGACY_RUNWAY_MIN_FIELDS)?;

        let lat = fields.lat(0)?;
        let lon = fields.lon(1)?;
        // v810 pads designators to three characters with 'x'
        let name = fields.str(2).trim_end_matches('x').to_string();
        let raw_heading = fields.f64(3, FieldKind::Heading)?;
        let length_m = fields.f64(4, FieldKind::Length)? * METERS_PER_FOOT;
        let displaced_threshold_m = fields.legacy_pair_m(5)?;
        let overrun_m = fields.legacy_pair_m(6)?;
        let width_m = fields.f64(7, FieldKind::Width)? * METERS_PER_FOOT;
        let surface_code = fields.u32(9, FieldKind::SurfaceCode)?;
        let shoulder_code = fields.u32(10, FieldKind::ShoulderCode)?;
        let markings_code = fields.u32(11, FieldKind::MarkingsCode)?;
        let smoothness = fields.smoothness(12)?;

        let kind = if name.starts_with('H') || (6..=9).contains(&surface_code) {
            LegacyKind::Helipad
        } else if surface_code == 13 {
            LegacyKind::Water
        } else {
            LegacyKind::Land
        };

        let heading = corrected_heading(&name, raw_heading);
        let reciprocal_name = match kind {
            LegacyKind::Helipad => None,
            _ => reciprocal_runway_name(&name),
        };

        let centre = (lat, lon);
        let half = length_m / 2.0;
        let ends = match (
            destination(lat, lon, normalize_heading(heading + 180.0), half),
            destination(lat, lon, heading, half),
        ) {
            (Some(first), Some(second)) => [first, second],
            _ => {
                tracing::warn!(
                    path = %fields.path.display(),
                    line = fields.line,
                    runway = %name,
                    "Cannot place legacy runway ends this close to a pole, using the centre"
                );
                [centre, centre]
            }
        };

        Ok(Some(Self {
            kind,
            name,
            reciprocal_name,
            centre,
            ends,
            heading,
            length_m,
            width_m,
            surface_code,
            shoulder_code,
            markings_code,
            displaced_threshold_m,
            overrun_m,
            smoothness,
        }))
    }

    fn end_count(&self) -> usize {
        if self.reciprocal_name.is_some() {
            2
        } else {
            1
        }
    }
}

/// Receiver of the decoded records of one airport block.
///
/// Every record is fully decoded before it reaches a sink, so both sinks
/// accept and reject exactly the same input.
pub(crate) trait RowSink {
    fn land_runway(&mut self, record: &LandRunwayRecord);

    fn water_runway(&mut self, record: &WaterRunwayRecord);

    fn helipad(&mut self, helipad: Helipad);

    fn legacy_runway(&mut self, record: &LegacyRunway);

    /// `refinable` is true for row 1300, which following 1301 rows refine.
    fn startup_location(&mut self, _record: StartupRecord, _refinable: bool) {}

    /// Applies to the last startup location passed with `refinable` set.
    fn startup_metadata(&mut self, _record: StartupMetadataRecord) {}
}

/// What the dispatch learns about an airport regardless of the sink.
struct BlockSummary {
    icao: String,
    name: String,
    elevation_m: f64,
    position: Option<(f64, f64)>,
}

fn dispatch<S: RowSink>(
    raw: &RawAirportInfo,
    path: &Path,
    sink: &mut S,
) -> Result<BlockSummary, AptDatError> {
    let header_error = |raw_value: &str| AptDatError::FieldParseFailure {
        path: path.to_path_buf(),
        line: raw.start_line_number,
        raw_value: raw_value.to_string(),
        expected: FieldKind::Elevation,
    };
    let elevation_raw = raw.first_line_fields.first().map(String::as_str).unwrap_or("");
    let elevation_ft: f64 = elevation_raw
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| header_error(elevation_raw))?;

    let mut centroid = CentroidAccumulator::new();
    let mut datum_lat = None;
    let mut datum_lon = None;
    let mut after_startup_location = false;

    for line in &raw.other_lines {
        let fields = Fields::new(path, line);
        match RowCode::from(line.code) {
            RowCode::LandRunway => {
                let record = LandRunwayRecord::parse(&fields)?;
                for (lat, lon) in record.thresholds() {
                    centroid.add(lat, lon);
                }
                sink.land_runway(&record);
            }
            RowCode::WaterRunway => {
                let record = WaterRunwayRecord::parse(&fields)?;
                for (lat, lon) in record.thresholds {
                    centroid.add(lat, lon);
                }
                sink.water_runway(&record);
            }
            RowCode::Helipad => {
                let helipad = parse_helipad(&fields)?;
                centroid.add(helipad.lat, helipad.lon);
                sink.helipad(helipad);
            }
            RowCode::LegacyRunway => {
                if let Some(record) = LegacyRunway::parse(&fields)? {
                    match record.kind {
                        LegacyKind::Helipad => centroid.add(record.centre.0, record.centre.1),
                        LegacyKind::Land | LegacyKind::Water => {
                            for (lat, lon) in record.ends {
                                centroid.add(lat, lon);
                            }
                        }
                    }
                    sink.legacy_runway(&record);
                }
            }
            RowCode::LegacyStartup => {
                sink.startup_location(StartupRecord::parse_legacy(&fields)?, false);
                after_startup_location = false;
            }
            RowCode::StartupLocation => {
                sink.startup_location(StartupRecord::parse_location(&fields)?, true);
                after_startup_location = true;
            }
            RowCode::StartupMetadata => {
                if after_startup_location {
                    sink.startup_metadata(StartupMetadataRecord::parse(&fields));
                } else {
                    tracing::debug!(
                        path = %path.display(),
                        line = line.line_number,
                        "Startup metadata without a preceding startup location"
                    );
                }
            }
            RowCode::Metadata => match fields.str(0) {
                "datum_lat" => datum_lat = fields.lat(1).ok(),
                "datum_lon" => datum_lon = fields.lon(1).ok(),
                _ => {}
            },
            // Headers and 99 never reach the block; everything else is
            // irrelevant here (taxiways, signs, frequencies, ...)
            _ => {}
        }
    }

    let position = centroid.centroid().or(match (datum_lat, datum_lon) {
        (Some(lat), Some(lon)) => Some((lat, lon)),
        _ => None,
    });

    Ok(BlockSummary {
        icao: raw.icao(),
        name: raw.name(),
        elevation_m: elevation_ft * METERS_PER_FOOT,
        position,
    })
}

fn warn_no_position(raw: &RawAirportInfo, path: &Path) {
    tracing::warn!(
        path = %path.display(),
        line = raw.start_line_number,
        icao = %raw.icao(),
        "Airport has no runway, helipad or datum position, skipping it"
    );
}

#[derive(Default)]
struct FullSink {
    land_runways: Vec<LandRunway>,
    water_runways: Vec<WaterRunway>,
    helipads: Vec<Helipad>,
    parkings: Vec<Parking>,
    /// Index in `parkings` of the last row 1300, which 1301 rows refine.
    last_startup_location: Option<usize>,
}

impl FullSink {
    fn into_parking_buckets(self) -> BTreeMap<String, Vec<Parking>> {
        let mut buckets: BTreeMap<String, Vec<Parking>> = BTreeMap::new();
        for parking in self.parkings {
            buckets
                .entry(parking.parking_type.clone())
                .or_default()
                .push(parking);
        }
        for bucket in buckets.values_mut() {
            bucket.sort_by_cached_key(|p| natural_key(&p.full_name()));
        }
        buckets
    }
}

impl RowSink for FullSink {
    fn land_runway(&mut self, record: &LandRunwayRecord) {
        let [(lat1, lon1), (lat2, lon2)] = record.thresholds();
        let (solution, _) = best_inverse(lat1, lon1, lat2, lon2);
        let heading = mean_heading(solution.initial_azimuth, solution.final_azimuth);

        for (end, this) in record.ends.iter().enumerate() {
            let other = &record.ends[1 - end];
            self.land_runways.push(LandRunway {
                name: this.name.clone(),
                reciprocal_name: Some(other.name.clone()),
                lat: this.lat,
                lon: this.lon,
                heading: normalize_heading(heading + 180.0 * end as f64),
                length_m: solution.distance_m,
                width_m: record.width_m,
                surface: record.surface,
                shoulder: record.shoulder,
                markings: this.markings,
                smoothness: record.smoothness,
                displaced_threshold_m: this.displaced_threshold_m,
                overrun_m: this.overrun_m,
            });
        }
    }

    fn water_runway(&mut self, record: &WaterRunwayRecord) {
        let [(lat1, lon1), (lat2, lon2)] = record.thresholds;
        let (solution, _) = best_inverse(lat1, lon1, lat2, lon2);
        let heading = mean_heading(solution.initial_azimuth, solution.final_azimuth);

        for end in 0..2 {
            self.water_runways.push(WaterRunway {
                name: record.names[end].clone(),
                reciprocal_name: Some(record.names[1 - end].clone()),
                lat: record.thresholds[end].0,
                lon: record.thresholds[end].1,
                heading: normalize_heading(heading + 180.0 * end as f64),
                length_m: solution.distance_m,
                width_m: record.width_m,
                perimeter_buoys: record.perimeter_buoys,
            });
        }
    }

    fn helipad(&mut self, helipad: Helipad) {
        self.helipads.push(helipad);
    }

    fn legacy_runway(&mut self, record: &LegacyRunway) {
        let names = [Some(record.name.clone()), record.reciprocal_name.clone()];
        match record.kind {
            LegacyKind::Helipad => self.helipads.push(Helipad {
                name: record.name.clone(),
                lat: record.centre.0,
                lon: record.centre.1,
                heading: record.heading,
                length_m: record.length_m,
                width_m: record.width_m,
                surface: SurfaceType::from_legacy_helipad_code(record.surface_code),
                shoulder: ShoulderType::from_code(record.shoulder_code),
                smoothness: record.smoothness,
                edge_lighting: 0,
            }),
            LegacyKind::Land => {
                for end in 0..record.end_count() {
                    let Some(name) = names[end].clone() else {
                        continue;
                    };
                    self.land_runways.push(LandRunway {
                        name,
                        reciprocal_name: names[1 - end].clone(),
                        lat: record.ends[end].0,
                        lon: record.ends[end].1,
                        heading: normalize_heading(record.heading + 180.0 * end as f64),
                        length_m: record.length_m,
                        width_m: record.width_m,
                        surface: SurfaceType::from_code(record.surface_code),
                        shoulder: ShoulderType::from_code(record.shoulder_code),
                        markings: RunwayMarkings::from_code(record.markings_code),
                        smoothness: record.smoothness,
                        displaced_threshold_m: record.displaced_threshold_m[end],
                        overrun_m: record.overrun_m[end],
                    });
                }
            }
            LegacyKind::Water => {
                for end in 0..record.end_count() {
                    let Some(name) = names[end].clone() else {
                        continue;
                    };
                    self.water_runways.push(WaterRunway {
                        name,
                        reciprocal_name: names[1 - end].clone(),
                        lat: record.ends[end].0,
                        lon: record.ends[end].1,
                        heading: normalize_heading(record.heading + 180.0 * end as f64),
                        length_m: record.length_m,
                        width_m: record.width_m,
                        perimeter_buoys: false,
                    });
                }
            }
        }
    }

    fn startup_location(&mut self, record: StartupRecord, refinable: bool) {
        self.parkings.push(Parking {
            index: self.parkings.len(),
            parking_type: record.parking_type,
            name: record.name,
            number: String::new(),
            lat: record.lat,
            lon: record.lon,
            heading: record.heading,
            radius_m: None,
            airline_codes: BTreeSet::new(),
            operation_type: None,
            has_pushback_route: false,
            source: ParkingSource::AptDat,
        });
        self.last_startup_location = refinable.then(|| self.parkings.len() - 1);
    }

    fn startup_metadata(&mut self, record: StartupMetadataRecord) {
        let Some(parking) = self
            .last_startup_location
            .and_then(|idx| self.parkings.get_mut(idx))
        else {
            return;
        };
        parking.radius_m = record.radius_m;
        if record.operation_type.is_some() {
            parking.operation_type = record.operation_type;
        }
        parking.airline_codes = record.airline_codes;
    }
}

#[derive(Default)]
struct SummarySink {
    land_runway_count: usize,
    water_runway_count: usize,
    helipad_count: usize,
    lengths: Vec<f64>,
}

impl RowSink for SummarySink {
    fn land_runway(&mut self, record: &LandRunwayRecord) {
        let [(lat1, lon1), (lat2, lon2)] = record.thresholds();
        self.land_runway_count += 2;
        let (length, _) = cheap_distance(lat1, lon1, lat2, lon2);
        self.lengths.push(length);
    }

    fn water_runway(&mut self, record: &WaterRunwayRecord) {
        let [(lat1, lon1), (lat2, lon2)] = record.thresholds;
        self.water_runway_count += 2;
        let (length, _) = cheap_distance(lat1, lon1, lat2, lon2);
        self.lengths.push(length);
    }

    fn helipad(&mut self, _helipad: Helipad) {
        self.helipad_count += 1;
    }

    fn legacy_runway(&mut self, record: &LegacyRunway) {
        match record.kind {
            LegacyKind::Helipad => self.helipad_count += 1,
            LegacyKind::Land => {
                self.land_runway_count += record.end_count();
                self.lengths.push(record.length_m);
            }
            LegacyKind::Water => {
                self.water_runway_count += record.end_count();
                self.lengths.push(record.length_m);
            }
        }
    }
}

/// Build the full detail of one airport.
///
/// Returns `Ok(None)` for airports without any position (no runway, helipad
/// or datum); a warning is logged.
pub fn extract_airport(raw: &RawAirportInfo, path: &Path) -> Result<Option<Airport>, AptDatError> {
    let mut sink = FullSink::default();
    let summary = dispatch(raw, path, &mut sink)?;
    let Some((lat, lon)) = summary.position else {
        warn_no_position(raw, path);
        return Ok(None);
    };

    let land_runways = std::mem::take(&mut sink.land_runways);
    let water_runways = std::mem::take(&mut sink.water_runways);
    let helipads = std::mem::take(&mut sink.helipads);

    Ok(Some(Airport {
        icao: summary.icao,
        name: summary.name,
        airport_type: raw.airport_type,
        lat,
        lon,
        elevation_m: summary.elevation_m,
        source: raw.source_index(),
        land_runways,
        water_runways,
        helipads,
        parkings: sink.into_parking_buckets(),
    }))
}

/// Build the digest summary of one airport.
///
/// Rejects exactly the input [`extract_airport`] rejects, and returns
/// `Ok(None)` in the same cases.
pub fn extract_stub(raw: &RawAirportInfo, path: &Path) -> Result<Option<AirportStub>, AptDatError> {
    let mut sink = SummarySink::default();
    let summary = dispatch(raw, path, &mut sink)?;
    let Some((lat, lon)) = summary.position else {
        warn_no_position(raw, path);
        return Ok(None);
    };

    Ok(Some(AirportStub {
        icao: summary.icao,
        name: summary.name,
        airport_type: raw.airport_type,
        lat,
        lon,
        land_runway_count: sink.land_runway_count,
        water_runway_count: sink.water_runway_count,
        helipad_count: sink.helipad_count,
        runway_lengths: RunwayLengthRange::from_lengths(sink.lengths),
        source: raw.source_index(),
        usage: AirportUsage::default(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airport::AirportType;
    use crate::geodesy::{heading_difference, small_angle_destination};

    fn raw_airport(header: &str, lines: &[&str]) -> RawAirportInfo {
        let mut header_fields = header.split_whitespace();
        let code: u32 = header_fields.next().unwrap().parse().unwrap();
        RawAirportInfo {
            source_file_index: 0,
            byte_offset: 0,
            start_line_number: 10,
            airport_type: AirportType::from_row_code(code).unwrap(),
            first_line_fields: header_fields.map(str::to_string).collect(),
            other_lines: lines
                .iter()
                .enumerate()
                .map(|(i, line)| {
                    let (code, payload) = line.split_once(' ').unwrap_or((line, ""));
                    RawLine {
                        line_number: 11 + i as u64,
                        code: code.parse().unwrap(),
                        payload: payload.trim().to_string(),
                    }
                })
                .collect(),
        }
    }

    const LFBO_RUNWAYS: [&str; 2] = [
        "100 45.00 1 0 0.25 1 2 1 14R 43.64256800 001.35052600 0.00 120.00 3 0 1 0 32L 43.61743200 001.37667400 0.00 0.00 3 0 0 0",
        "100 45.00 1 1 0.25 1 2 1 14L 43.63756800 001.35692600 0.00 0.00 3 0 0 0 32R 43.61243200 001.38307400 100.00 0.00 3 0 1 0",
    ];

    fn path() -> &'static Path {
        Path::new("apt.dat")
    }

    #[test]
    fn test_land_runway_ends() {
        let raw = raw_airport("1 499 0 0 LFBO Toulouse Blagnac", &LFBO_RUNWAYS);
        let airport = extract_airport(&raw, path()).unwrap().unwrap();

        assert_eq!(airport.icao, "LFBO");
        assert_eq!(airport.name, "Toulouse Blagnac");
        assert!((airport.elevation_m - 499.0 * 0.3048).abs() < 1e-9);
        assert_eq!(airport.land_runways.len(), 4);

        let r14r = &airport.land_runways[0];
        let r32l = &airport.land_runways[1];
        assert_eq!(r14r.name, "14R");
        assert_eq!(r14r.reciprocal_name.as_deref(), Some("32L"));
        assert_eq!(r32l.reciprocal_name.as_deref(), Some("14R"));
        assert!((heading_difference(r14r.heading, r32l.heading) - 180.0).abs() < 1e-9);
        assert!(r14r.heading > 140.0 && r14r.heading < 150.0, "{}", r14r.heading);
        assert!(r14r.length_m > 3400.0 && r14r.length_m < 3600.0, "{}", r14r.length_m);
        assert_eq!(r14r.overrun_m, 120.0);
        assert_eq!(r14r.surface, SurfaceType::Asphalt);
        assert_eq!(r14r.markings, RunwayMarkings::Precision);
        assert_eq!(r14r.smoothness, Some(0.25));
        assert_eq!(airport.land_runways[3].displaced_threshold_m, 100.0);
    }

    #[test]
    fn test_stub_agrees_with_full_detail() {
        let raw = raw_airport("1 499 0 0 LFBO Toulouse Blagnac", &LFBO_RUNWAYS);
        let airport = extract_airport(&raw, path()).unwrap().unwrap();
        let stub = extract_stub(&raw, path()).unwrap().unwrap();

        assert_eq!(format!("{:.8}", stub.lat), format!("{:.8}", airport.lat));
        assert_eq!(format!("{:.8}", stub.lon), format!("{:.8}", airport.lon));
        assert_eq!(stub.land_runway_count, airport.land_runways.len());
        assert_eq!(stub.water_runway_count, 0);

        let range = stub.runway_lengths.unwrap();
        let max_full = airport
            .land_runways
            .iter()
            .map(|r| r.length_m)
            .fold(f64::MIN, f64::max);
        let min_full = airport
            .land_runways
            .iter()
            .map(|r| r.length_m)
            .fold(f64::MAX, f64::min);
        assert!((range.max_m - max_full).abs() < 1e-3);
        assert!((range.min_m - min_full).abs() < 1e-3);
    }

    #[test]
    fn test_water_runway_and_helipad() {
        let raw = raw_airport(
            "16 0 0 0 XSEA Sea Base",
            &[
                "101 49.00 1 08 35.04420900 -106.59855700 26 35.04420911 -106.57489700",
                "102 H1 35.04420900 -106.58855700 270.00 20.00 20.00 2 0 0 0.25 1",
            ],
        );
        let airport = extract_airport(&raw, path()).unwrap().unwrap();
        assert_eq!(airport.airport_type, AirportType::SeaplaneBase);
        assert_eq!(airport.water_runways.len(), 2);
        assert!(airport.water_runways[0].perimeter_buoys);
        assert_eq!(airport.water_runways[1].name, "26");
        assert_eq!(airport.helipads.len(), 1);
        assert_eq!(airport.helipads[0].surface, SurfaceType::Concrete);
        assert_eq!(airport.helipads[0].edge_lighting, 1);

        let stub = extract_stub(&raw, path()).unwrap().unwrap();
        assert_eq!(stub.water_runway_count, 2);
        assert_eq!(stub.helipad_count, 1);
        assert!(stub.runway_lengths.is_some());
    }

    #[test]
    fn test_helipad_only_has_no_length_range() {
        let raw = raw_airport(
            "17 100 0 0 XHEL Heliport",
            &["102 H1 40.71280000 -74.00600000 90.00 20 20 1 0 0 0.25 0"],
        );
        let stub = extract_stub(&raw, path()).unwrap().unwrap();
        assert_eq!(stub.helipad_count, 1);
        assert_eq!(stub.runway_lengths, None);
        assert!((stub.lat - 40.7128).abs() < 1e-9);
    }

    #[test]
    fn test_legacy_runway_produces_reciprocal_ends() {
        // 08 given with a westerly heading is corrected by 180 degrees
        let raw = raw_airport(
            "1 5355 0 0 KABQ Albuquerque",
            &["10 35.044209 -106.598816 08x 270.44 13749 1000.0000 0.0000 150 321121 1 0 3 0.25 0"],
        );
        let airport = extract_airport(&raw, path()).unwrap().unwrap();
        assert_eq!(airport.land_runways.len(), 2);

        let (r08, r26) = (&airport.land_runways[0], &airport.land_runways[1]);
        assert_eq!(r08.name, "08");
        assert_eq!(r26.name, "26");
        assert_eq!(r26.reciprocal_name.as_deref(), Some("08"));
        assert!((r08.heading - 90.44).abs() < 1e-9);
        assert!((r26.heading - 270.44).abs() < 1e-9);
        assert!((r08.length_m - 13749.0 * 0.3048).abs() < 1e-9);
        assert!((r08.displaced_threshold_m - 1000.0 * 0.3048).abs() < 1e-9);
        assert_eq!(r26.displaced_threshold_m, 0.0);
        // 08 threshold lies west of the centre
        assert!(r08.lon < -106.598816 && r26.lon > -106.598816);

        let (lat, lon) = (airport.lat, airport.lon);
        assert!((lat - 35.044209).abs() < 1e-4);
        assert!((lon + 106.598816).abs() < 1e-4);

        let stub = extract_stub(&raw, path()).unwrap().unwrap();
        assert_eq!(stub.land_runway_count, 2);
        assert_eq!(format!("{:.8}", stub.lat), format!("{:.8}", airport.lat));
    }

    #[test]
    fn test_legacy_helipad_water_and_taxiway() {
        let raw = raw_airport(
            "1 0 0 0 XLEG Legacy",
            &[
                "10 35.0 -106.0 xxx 90.0 500 0000.0000 0000.0000 50 000000 1 0 0 0.25 0",
                "10 35.0 -106.0 H1x 0.0 60 0000.0000 0000.0000 60 000000 7 0 0 0.25 0",
                "10 35.1 -106.0 09x 90.0 3000 0000.0000 0000.0000 100 000000 13 0 0 0.25 0",
                "10 35.2 -106.0 ABx 45.0 1000 0000.0000 0000.0000 50 000000 3 0 0 0.25 0",
            ],
        );
        let airport = extract_airport(&raw, path()).unwrap().unwrap();
        assert_eq!(airport.helipads.len(), 1);
        assert_eq!(airport.helipads[0].name, "H1");
        assert_eq!(airport.helipads[0].surface, SurfaceType::Concrete);
        assert_eq!(airport.water_runways.len(), 2);
        assert_eq!(airport.water_runways[1].name, "27");
        // No runway number: one end only
        assert_eq!(airport.land_runways.len(), 1);
        assert_eq!(airport.land_runways[0].reciprocal_name, None);

        let stub = extract_stub(&raw, path()).unwrap().unwrap();
        assert_eq!(stub.helipad_count, 1);
        assert_eq!(stub.water_runway_count, 2);
        assert_eq!(stub.land_runway_count, 1);
    }

    #[test]
    fn test_centroid_is_spherical() {
        // Runway straddling the antimeridian
        let raw = raw_airport(
            "1 0 0 0 XDAT Dateline",
            &["100 45.00 1 0 0.25 0 0 0 09 10.00000000 179.99000000 0 0 0 0 0 0 27 10.00000000 -179.99000000 0 0 0 0 0 0"],
        );
        let airport = extract_airport(&raw, path()).unwrap().unwrap();
        assert!((airport.lon.abs() - 180.0).abs() < 1e-6, "{}", airport.lon);
        assert!(airport.lat >= 10.0);
    }

    #[test]
    fn test_datum_fallback_and_skip() {
        let raw = raw_airport(
            "1 0 0 0 XDTM Datum Only",
            &["1302 datum_lat 48.500000", "1302 datum_lon 2.250000", "1302 city Paris"],
        );
        let stub = extract_stub(&raw, path()).unwrap().unwrap();
        assert_eq!((stub.lat, stub.lon), (48.5, 2.25));
        assert_eq!(stub.runway_lengths, None);

        let raw = raw_airport("1 0 0 0 XNON Nowhere", &["1302 city Nowhere"]);
        assert!(extract_stub(&raw, path()).unwrap().is_none());
        assert!(extract_airport(&raw, path()).unwrap().is_none());
    }

    #[test]
    fn test_parkings_bucketed_and_sorted() {
        let mut lines = vec![LFBO_RUNWAYS[0]];
        lines.extend([
            "1300 43.62 1.36 90.0 gate jets|turboprops Gate 10",
            "1301 E airline AFR, EZY",
            "1300 43.62 1.36 90.0 gate jets Gate 2",
            "1300 43.62 1.36 370.0 tie_down props GA 1",
            "15 43.63 1.37 180.0 Ramp Start",
            "1301 C cargo FDX",
        ]);
        let raw = raw_airport("1 499 0 0 LFBO Toulouse Blagnac", &lines);
        let airport = extract_airport(&raw, path()).unwrap().unwrap();

        assert_eq!(airport.parking_count(), 4);
        let gates = &airport.parkings["gate"];
        assert_eq!(gates[0].name, "Gate 2");
        assert_eq!(gates[1].name, "Gate 10");
        assert_eq!(gates[1].radius_m, Some(32.5));
        assert_eq!(gates[1].operation_type.as_deref(), Some("airline"));
        assert_eq!(
            gates[1].airline_codes.iter().cloned().collect::<Vec<_>>(),
            vec!["AFR", "EZY"]
        );
        assert_eq!(airport.parkings["tie_down"][0].heading, 10.0);
        // 1301 after a row 15 is ignored
        let legacy = &airport.parkings[""][0];
        assert_eq!(legacy.name, "Ramp Start");
        assert!(legacy.airline_codes.is_empty());
    }

    #[test]
    fn test_short_records_are_reported() {
        let raw = raw_airport("1 0 0 0 XBAD Bad", &["100 45.00 1 0 0.25 0 0 0 09 10.0 10.0"]);
        let err = extract_stub(&raw, path()).unwrap_err();
        assert!(matches!(
            err,
            AptDatError::InsufficientFields {
                line: 11,
                row_code: 100,
                expected: 22,
                found: 10,
                ..
            }
        ));

        // Parkings are checked in summary mode too
        let raw = raw_airport(
            "17 0 0 0 XBAD Bad",
            &["102 H1 40.0 -74.0 90.00 20 20 1 0 0 0.25 0", "1300 40.0 -74.0 90.0"],
        );
        let err = extract_stub(&raw, path()).unwrap_err();
        assert!(matches!(err, AptDatError::InsufficientFields { row_code: 1300, line: 12, .. }));
        let err = extract_airport(&raw, path()).unwrap_err();
        assert!(matches!(err, AptDatError::InsufficientFields { row_code: 1300, line: 12, .. }));

        let raw = raw_airport("1 0 0 0 XBAD Bad", &["15 40.0 -74.0"]);
        assert!(matches!(
            extract_stub(&raw, path()).unwrap_err(),
            AptDatError::InsufficientFields { row_code: 15, expected: 3, found: 2, .. }
        ));
    }

    #[test]
    fn test_summary_rejects_what_full_detail_rejects() {
        let bad_codes = [
            // surface code
            "100 45.00 X 0 0.25 1 2 1 14R 43.64256800 001.35052600 0.00 120.00 3 0 1 0 32L 43.61743200 001.37667400 0.00 0.00 3 0 0 0",
            // width
            "100 wide 1 0 0.25 1 2 1 14R 43.64256800 001.35052600 0.00 120.00 3 0 1 0 32L 43.61743200 001.37667400 0.00 0.00 3 0 0 0",
            // markings of the second end
            "100 45.00 1 0 0.25 1 2 1 14R 43.64256800 001.35052600 0.00 120.00 3 0 1 0 32L 43.61743200 001.37667400 0.00 0.00 P 0 0 0",
            // perimeter buoys flag
            "101 49.00 yes 08 35.04420900 -106.59855700 26 35.04420911 -106.57489700",
            // helipad shoulder and lighting
            "102 H1 40.0 -74.0 90.00 20 20 1 0 S 0.25 0",
            "102 H1 40.0 -74.0 90.00 20 20 1 0 0 0.25 L",
            // parking heading
            "1300 40.0 -74.0 north gate jets A1",
        ];

        for bad in bad_codes {
            let raw = raw_airport(
                "1 0 0 0 XBAD Bad",
                &["102 H9 40.0 -74.0 90.00 20 20 1 0 0 0.25 0", bad],
            );
            let full = extract_airport(&raw, path()).unwrap_err();
            let summary = extract_stub(&raw, path()).unwrap_err();
            assert_eq!(summary.to_string(), full.to_string(), "{}", bad);
            assert!(
                matches!(summary, AptDatError::FieldParseFailure { line: 12, .. }),
                "{}: {}",
                bad,
                summary
            );
        }
    }

    #[test]
    fn test_small_angle_legacy_runway_ends() {
        let line = RawLine {
            line_number: 11,
            code: 10,
            payload: "35.044209 -106.598816 08x 270.44 13749 1000.0000 0.0000 150 321121 1 0 3 0.25 0"
                .to_string(),
        };
        let fields = Fields::new(path(), &line);
        let record = LegacyRunway::parse_with(&fields, small_angle_destination)
            .unwrap()
            .unwrap();
        let geodesic = LegacyRunway::parse(&fields).unwrap().unwrap();

        assert_eq!(record.name, "08");
        assert!((record.heading - 90.44).abs() < 1e-9);
        // 08 threshold lies west of the centre, 26 east
        assert!(record.ends[0].1 < -106.598816);
        assert!(record.ends[1].1 > -106.598816);
        for end in 0..2 {
            let (lat, lon) = record.ends[end];
            let (g_lat, g_lon) = geodesic.ends[end];
            // Within a few meters of the direct geodesic at runway scale
            assert!((lat - g_lat).abs() < 1e-4, "{} vs {}", lat, g_lat);
            assert!((lon - g_lon).abs() < 1e-4, "{} vs {}", lon, g_lon);
        }
        let (span, _) = cheap_distance(
            record.ends[0].0,
            record.ends[0].1,
            record.ends[1].0,
            record.ends[1].1,
        );
        assert!((span - record.length_m).abs() < 0.01 * record.length_m, "{}", span);
    }

    #[test]
    fn test_small_angle_legacy_runway_at_pole_uses_centre() {
        let line = RawLine {
            line_number: 11,
            code: 10,
            payload: "90.0 0.0 09x 90.0 3000 0000.0000 0000.0000 100 000000 1 0 0 0.25 0"
                .to_string(),
        };
        let fields = Fields::new(path(), &line);
        let record = LegacyRunway::parse_with(&fields, small_angle_destination)
            .unwrap()
            .unwrap();
        assert_eq!(record.ends, [(90.0, 0.0), (90.0, 0.0)]);
        assert_eq!(record.end_count(), 2);
    }

    #[test]
    fn test_field_parse_failure_names_the_field() {
        let raw = raw_airport(
            "17 0 0 0 XBAD Bad",
            &["102 H1 4O.0 -74.0 90.00 20 20 1 0 0 0.25 0"],
        );
        match extract_stub(&raw, path()).unwrap_err() {
            AptDatError::FieldParseFailure {
                line,
                raw_value,
                expected,
                ..
            } => {
                assert_eq!(line, 11);
                assert_eq!(raw_value, "4O.0");
                assert_eq!(expected, FieldKind::Latitude);
            }
            other => panic!("unexpected error: {other}"),
        }

        let raw = raw_airport("1 high 0 0 XBAD Bad", &[]);
        assert!(matches!(
            extract_stub(&raw, path()).unwrap_err(),
            AptDatError::FieldParseFailure {
                expected: FieldKind::Elevation,
                line: 10,
                ..
            }
        ));
    }

    #[test]
    fn test_out_of_range_smoothness_is_dropped() {
        let raw = raw_airport(
            "17 0 0 0 XHEL Heliport",
            &["102 H1 40.0 -74.0 90.00 20 20 1 0 0 1.50 0"],
        );
        let airport = extract_airport(&raw, path()).unwrap().unwrap();
        assert_eq!(airport.helipads[0].smoothness, None);
    }
}

//! Lean per-airport summary persisted in the digest.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::{AirportType, SourceIndex};

/// Shortest and longest land or water runway, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunwayLengthRange {
    pub min_m: f64,
    pub max_m: f64,
}

impl RunwayLengthRange {
    /// Range covering `lengths`, or `None` when there are none.
    pub fn from_lengths<I: IntoIterator<Item = f64>>(lengths: I) -> Option<Self> {
        lengths.into_iter().fold(None, |range, len| {
            Some(match range {
                None => RunwayLengthRange {
                    min_m: len,
                    max_m: len,
                },
                Some(r) => RunwayLengthRange {
                    min_m: r.min_m.min(len),
                    max_m: r.max_m.max(len),
                },
            })
        })
    }
}

/// How often an airport has been used, supplied by the launcher's
/// statistics store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AirportUsage {
    /// Dates the airport was used, oldest first, without duplicates.
    pub dates: Vec<NaiveDate>,
    /// Number of `dates` within the recent window.
    pub recent_use_count: usize,
}

impl AirportUsage {
    /// Build usage data, counting the dates within `window_days` of `today`
    /// (inclusive on both ends). Future dates are not counted as recent.
    pub fn from_dates(mut dates: Vec<NaiveDate>, today: NaiveDate, window_days: u32) -> Self {
        dates.sort_unstable();
        dates.dedup();
        let since = today - Duration::days(i64::from(window_days));
        let recent_use_count = dates.iter().filter(|d| **d >= since && **d <= today).count();
        Self {
            dates,
            recent_use_count,
        }
    }

    pub fn last_used(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

/// Summary of one airport, as stored in the digest file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportStub {
    pub icao: String,
    pub name: String,
    pub airport_type: AirportType,
    pub lat: f64,
    pub lon: f64,
    /// Number of land runway ends.
    pub land_runway_count: usize,
    /// Number of water runway ends.
    pub water_runway_count: usize,
    pub helipad_count: usize,
    /// `None` when the airport has neither land nor water runways.
    pub runway_lengths: Option<RunwayLengthRange>,
    pub source: SourceIndex,
    #[serde(skip_serializing_if = "AirportUsage::is_unused")]
    pub usage: AirportUsage,
}

impl AirportUsage {
    fn is_unused(&self) -> bool {
        self.dates.is_empty()
    }
}

impl AirportStub {
    pub fn attach_usage(&mut self, usage: AirportUsage) {
        self.usage = usage;
    }

    /// True when `text` appears in the identifier or the name
    /// (case-insensitive).
    pub fn matches(&self, text: &str) -> bool {
        let needle = text.to_lowercase();
        self.icao.to_lowercase().contains(&needle) || self.name.to_lowercase().contains(&needle)
    }
}

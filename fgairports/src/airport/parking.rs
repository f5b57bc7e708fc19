//! Parkings and startup locations.

use std::collections::BTreeSet;

use serde::Serialize;

/// Where a parking definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParkingSource {
    /// FlightGear ground network file (`<ICAO>.groundnet.xml`).
    Groundnet,
    /// Row 15 or 1300 of an apt.dat file.
    AptDat,
}

/// A parking position or startup location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parking {
    /// Position of the definition within its airport block.
    pub index: usize,
    /// `gate`, `hangar`, `tie_down`, `misc`, or `""` for legacy startup
    /// locations.
    pub parking_type: String,
    pub name: String,
    pub number: String,
    pub lat: f64,
    pub lon: f64,
    pub heading: f64,
    pub radius_m: Option<f64>,
    pub airline_codes: BTreeSet<String>,
    /// `general_aviation`, `airline`, `cargo` or `military`.
    pub operation_type: Option<String>,
    pub has_pushback_route: bool,
    pub source: ParkingSource,
}

impl Parking {
    /// Name followed by the number, as shown to users.
    pub fn full_name(&self) -> String {
        if self.number.is_empty() {
            self.name.clone()
        } else {
            format!("{}{}", self.name, self.number)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum KeyPart {
    /// Digit run without leading zeros, ordered by length then text so that
    /// arbitrarily long runs compare numerically.
    Number(usize, String),
    Text(String),
}

/// Sort key comparing digit runs as integers: `"A2" < "A10"`.
///
/// At equal position a number sorts before text. Names that compare equal
/// part by part (`"A02"` and `"A2"`) fall back to plain string order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NaturalKey {
    parts: Vec<KeyPart>,
    original: String,
}

pub fn natural_key(s: &str) -> NaturalKey {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_digits = false;

    let flush = |current: &mut String, in_digits: bool, parts: &mut Vec<KeyPart>| {
        if current.is_empty() {
            return;
        }
        let run = std::mem::take(current);
        if in_digits {
            let stripped = run.trim_start_matches('0');
            parts.push(KeyPart::Number(stripped.len(), stripped.to_string()));
        } else {
            parts.push(KeyPart::Text(run));
        }
    };

    for c in s.chars() {
        let is_digit = c.is_ascii_digit();
        if is_digit != in_digits {
            flush(&mut current, in_digits, &mut parts);
            in_digits = is_digit;
        }
        current.push(c);
    }
    flush(&mut current, in_digits, &mut parts);

    NaturalKey {
        parts,
        original: s.to_string(),
    }
}

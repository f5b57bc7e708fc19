//! Runway ends, water runways and helipads.

use serde::Serialize;

use crate::geodesy::{heading_difference, normalize_heading};

/// Runway or helipad surface, from the apt.dat surface code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SurfaceType {
    Asphalt,
    Concrete,
    Grass,
    Dirt,
    Gravel,
    DryLakebed,
    Water,
    SnowOrIce,
    Transparent,
    Other(u32),
}

impl SurfaceType {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 | 20..=38 => SurfaceType::Asphalt,
            2 | 50..=57 => SurfaceType::Concrete,
            3 => SurfaceType::Grass,
            4 => SurfaceType::Dirt,
            5 => SurfaceType::Gravel,
            12 => SurfaceType::DryLakebed,
            13 => SurfaceType::Water,
            14 => SurfaceType::SnowOrIce,
            15 => SurfaceType::Transparent,
            other => SurfaceType::Other(other),
        }
    }

    /// Surface of a legacy (v810) helipad record, whose codes 6-9 encode
    /// "helipad" plus the surface.
    pub fn from_legacy_helipad_code(code: u32) -> Self {
        match code {
            6 => SurfaceType::Asphalt,
            7 => SurfaceType::Concrete,
            8 => SurfaceType::Grass,
            9 => SurfaceType::Dirt,
            other => SurfaceType::from_code(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShoulderType {
    None,
    Asphalt,
    Concrete,
    Other(u32),
}

impl ShoulderType {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => ShoulderType::None,
            1 => ShoulderType::Asphalt,
            2 => ShoulderType::Concrete,
            other => ShoulderType::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunwayMarkings {
    None,
    Visual,
    NonPrecision,
    Precision,
    UkNonPrecision,
    UkPrecision,
    Other(u32),
}

impl RunwayMarkings {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => RunwayMarkings::None,
            1 => RunwayMarkings::Visual,
            2 => RunwayMarkings::NonPrecision,
            3 => RunwayMarkings::Precision,
            4 => RunwayMarkings::UkNonPrecision,
            5 => RunwayMarkings::UkPrecision,
            other => RunwayMarkings::Other(other),
        }
    }
}

/// One usable end of a land runway.
///
/// `lat`/`lon` is the threshold of this end and `heading` the true heading
/// when taking off from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandRunway {
    pub name: String,
    /// Name of the opposite end, when the runway has two ends.
    pub reciprocal_name: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub heading: f64,
    pub length_m: f64,
    pub width_m: f64,
    pub surface: SurfaceType,
    pub shoulder: ShoulderType,
    pub markings: RunwayMarkings,
    /// In `[0, 1]`, `None` when missing or out of range.
    pub smoothness: Option<f64>,
    pub displaced_threshold_m: f64,
    pub overrun_m: f64,
}

/// One usable end of a water runway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterRunway {
    pub name: String,
    pub reciprocal_name: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub heading: f64,
    pub length_m: f64,
    pub width_m: f64,
    pub perimeter_buoys: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Helipad {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub heading: f64,
    pub length_m: f64,
    pub width_m: f64,
    pub surface: SurfaceType,
    pub shoulder: ShoulderType,
    pub smoothness: Option<f64>,
    pub edge_lighting: u32,
}

/// Any runway end or helipad.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Runway {
    Land(LandRunway),
    Water(WaterRunway),
    Helipad(Helipad),
}

impl Runway {
    pub fn name(&self) -> &str {
        match self {
            Runway::Land(r) => &r.name,
            Runway::Water(r) => &r.name,
            Runway::Helipad(h) => &h.name,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        match self {
            Runway::Land(r) => (r.lat, r.lon),
            Runway::Water(r) => (r.lat, r.lon),
            Runway::Helipad(h) => (h.lat, h.lon),
        }
    }

    pub fn heading(&self) -> f64 {
        match self {
            Runway::Land(r) => r.heading,
            Runway::Water(r) => r.heading,
            Runway::Helipad(h) => h.heading,
        }
    }

    pub fn length_m(&self) -> f64 {
        match self {
            Runway::Land(r) => r.length_m,
            Runway::Water(r) => r.length_m,
            Runway::Helipad(h) => h.length_m,
        }
    }

    pub fn is_helipad(&self) -> bool {
        matches!(self, Runway::Helipad(_))
    }
}

/// Split a runway designator into its number (1-36) and suffix.
///
/// `"09L"` gives `(9, "L")`. Returns `None` when the designator does not
/// start with a valid runway number.
pub(crate) fn runway_number(name: &str) -> Option<(u32, &str)> {
    let digits = name.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || digits > 2 {
        return None;
    }
    let number: u32 = name[..digits].parse().ok()?;
    (1..=36)
        .contains(&number)
        .then_some((number, &name[digits..]))
}

/// Designator of the opposite runway end.
///
/// The number is offset by 18 and `L`/`R` are swapped; other suffixes
/// (`C`, `W`, ...) are kept. Returns `None` for designators without a valid
/// runway number.
///
/// ```
/// use fgairports::airport::reciprocal_runway_name;
///
/// assert_eq!(reciprocal_runway_name("09L").as_deref(), Some("27R"));
/// assert_eq!(reciprocal_runway_name("36").as_deref(), Some("18"));
/// ```
pub fn reciprocal_runway_name(name: &str) -> Option<String> {
    let (number, suffix) = runway_number(name)?;
    let reciprocal = if number <= 18 { number + 18 } else { number - 18 };
    let suffix = match suffix {
        "L" | "l" => "R",
        "R" | "r" => "L",
        other => other,
    };
    Some(format!("{:02}{}", reciprocal, suffix))
}

/// Flip a heading by 180 degrees when it points away from the direction the
/// runway number implies by more than 90 degrees.
pub(crate) fn corrected_heading(name: &str, heading: f64) -> f64 {
    match runway_number(name) {
        Some((number, _)) if heading_difference(heading, f64::from(number) * 10.0) > 90.0 => {
            normalize_heading(heading + 180.0)
        }
        _ => normalize_heading(heading),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_surface_codes() {
        assert_eq!(SurfaceType::from_code(1), SurfaceType::Asphalt);
        assert_eq!(SurfaceType::from_code(24), SurfaceType::Asphalt);
        assert_eq!(SurfaceType::from_code(55), SurfaceType::Concrete);
        assert_eq!(SurfaceType::from_code(13), SurfaceType::Water);
        assert_eq!(SurfaceType::from_code(99), SurfaceType::Other(99));
        assert_eq!(
            SurfaceType::from_legacy_helipad_code(8),
            SurfaceType::Grass
        );
    }

    #[test]
    fn test_reciprocal_names() {
        assert_eq!(reciprocal_runway_name("01").as_deref(), Some("19"));
        assert_eq!(reciprocal_runway_name("18").as_deref(), Some("36"));
        assert_eq!(reciprocal_runway_name("19").as_deref(), Some("01"));
        assert_eq!(reciprocal_runway_name("14R").as_deref(), Some("32L"));
        assert_eq!(reciprocal_runway_name("4C").as_deref(), Some("22C"));
        assert_eq!(reciprocal_runway_name("H1"), None);
        assert_eq!(reciprocal_runway_name("00"), None);
        assert_eq!(reciprocal_runway_name("37"), None);
        assert_eq!(reciprocal_runway_name("xxx"), None);
    }

    #[test]
    fn test_heading_correction() {
        // 09 pointing west is flipped east
        assert!((corrected_heading("09", 270.0) - 90.0).abs() < 1e-9);
        // within 90 degrees is kept
        assert!((corrected_heading("09", 120.0) - 120.0).abs() < 1e-9);
        assert!((corrected_heading("36", 5.0) - 5.0).abs() < 1e-9);
        // no number, no correction
        assert!((corrected_heading("H1", 270.0) - 270.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_reciprocal_is_involution(n in 1u32..=36, suffix in prop::sample::select(vec!["", "L", "R", "C"])) {
            let name = format!("{:02}{}", n, suffix);
            let there = reciprocal_runway_name(&name).unwrap();
            let back = reciprocal_runway_name(&there).unwrap();
            prop_assert_eq!(&back, &name);

            let (m, _) = runway_number(&there).unwrap();
            prop_assert_eq!(m, (n + 17) % 36 + 1);
        }

        #[test]
        fn prop_corrected_heading_faces_number(n in 1u32..=36, heading in 0.0f64..360.0) {
            let h = corrected_heading(&format!("{:02}", n), heading);
            prop_assert!(heading_difference(h, f64::from(n) * 10.0) <= 90.0 + 1e-9);
        }
    }
}

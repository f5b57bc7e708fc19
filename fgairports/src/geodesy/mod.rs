//! Geodesy primitives used while parsing apt.dat data.
//!
//! Provides n-vector arithmetic for averaging positions on the sphere, and
//! inverse/direct geodesic solutions for runway lengths, headings and the
//! endpoints of legacy (v810) runway records.
//!
//! # Centroids
//!
//! Airport positions are computed as the spherical centroid of runway ends
//! and helipads: every point is converted to a unit 3-vector, the vectors
//! are summed and the sum is converted back to latitude/longitude. Unlike an
//! arithmetic mean of coordinates this does not break across the
//! antimeridian.
//!
//! # Inverse methods
//!
//! | Method | Speed | Failure modes |
//! |--------|-------|---------------|
//! | Vincenty | fast | no convergence for nearly antipodal points |
//! | Karney (`geodesic` feature) | slower | none |
//! | Small-angle | fastest | inaccurate over long distances, near poles |

mod inverse;

pub use inverse::{
    best_inverse, cheap_distance, destination, small_angle_destination, small_angle_inverse,
    vincenty_inverse, GeodesyError, InverseMethod, InverseSolution,
};

#[cfg(feature = "geodesic")]
pub use inverse::{karney_destination, karney_inverse};

/// WGS84 semi-major axis in meters.
pub const WGS84_A: f64 = 6_378_137.0;

/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// WGS84 semi-minor axis in meters.
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);

/// Mean Earth radius in meters (IUGG).
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Meters per international foot.
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Normalize an angle in degrees to `[0, 360)`.
#[inline]
pub fn normalize_heading(degrees: f64) -> f64 {
    let h = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if h >= 360.0 {
        0.0
    } else {
        h
    }
}

/// Smallest absolute difference between two headings, in `[0, 180]`.
#[inline]
pub fn heading_difference(a: f64, b: f64) -> f64 {
    let d = normalize_heading(a - b);
    if d > 180.0 {
        360.0 - d
    } else {
        d
    }
}

/// Circular mean of two headings in degrees.
///
/// Returns the first heading when the two are exactly opposite.
pub fn mean_heading(a: f64, b: f64) -> f64 {
    let (a_rad, b_rad) = (a.to_radians(), b.to_radians());
    let x = a_rad.cos() + b_rad.cos();
    let y = a_rad.sin() + b_rad.sin();
    if x.abs() < 1e-15 && y.abs() < 1e-15 {
        return normalize_heading(a);
    }
    normalize_heading(y.atan2(x).to_degrees())
}

/// Unit vector normal to the sphere at a given position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl NVector {
    /// Build the n-vector of a latitude/longitude in decimal degrees.
    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        let (lat, lon) = (lat.to_radians(), lon.to_radians());
        Self {
            x: lat.cos() * lon.cos(),
            y: lat.cos() * lon.sin(),
            z: lat.sin(),
        }
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Convert back to latitude/longitude in decimal degrees.
    ///
    /// The vector does not need to be normalized. Returns `None` for the
    /// zero vector, which has no direction.
    pub fn to_lat_lon(&self) -> Option<(f64, f64)> {
        if self.norm() < 1e-12 {
            return None;
        }
        let lat = self.z.atan2((self.x * self.x + self.y * self.y).sqrt());
        let lon = self.y.atan2(self.x);
        Some((lat.to_degrees(), lon.to_degrees()))
    }
}

impl std::ops::Add for NVector {
    type Output = NVector;

    fn add(self, other: NVector) -> NVector {
        NVector {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl std::ops::AddAssign for NVector {
    fn add_assign(&mut self, other: NVector) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl std::ops::Div<f64> for NVector {
    type Output = NVector;

    fn div(self, rhs: f64) -> NVector {
        NVector {
            x: self.x / rhs,
            y: self.y / rhs,
            z: self.z / rhs,
        }
    }
}

/// Running sum of n-vectors for spherical averaging.
#[derive(Debug, Clone, Copy, Default)]
pub struct CentroidAccumulator {
    sum: NVector,
    count: usize,
}

impl CentroidAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one position, weighted once.
    pub fn add(&mut self, lat: f64, lon: f64) {
        self.sum += NVector::from_lat_lon(lat, lon);
        self.count += 1;
    }

    /// Number of positions added so far.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Centroid of every position added, in decimal degrees.
    ///
    /// Returns `None` when nothing was added, or when the vectors cancel out
    /// (e.g. two antipodal points).
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.count == 0 {
            return None;
        }
        (self.sum / self.count as f64).to_lat_lon()
    }
}

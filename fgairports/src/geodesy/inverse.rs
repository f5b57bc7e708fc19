//! Inverse and direct geodesic solutions.

use super::{normalize_heading, MEAN_EARTH_RADIUS_M, WGS84_A, WGS84_B, WGS84_F};

/// Maximum number of Vincenty iterations before giving up.
const VINCENTY_MAX_ITERATIONS: usize = 200;

/// Convergence threshold on lambda, in radians (~0.06 mm).
const VINCENTY_TOLERANCE: f64 = 1e-12;

/// Failure of an inverse solution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeodesyError {
    /// Vincenty's iteration did not converge (nearly antipodal points).
    #[error("Vincenty inverse did not converge after {iterations} iterations")]
    NoConvergence { iterations: usize },
}

/// Which algorithm produced an [`InverseSolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InverseMethod {
    Vincenty,
    Karney,
    SmallAngle,
}

/// Distance and azimuths between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseSolution {
    /// Geodesic distance in meters.
    pub distance_m: f64,
    /// Azimuth at the first point, degrees clockwise from true north.
    pub initial_azimuth: f64,
    /// Azimuth at the second point (direction of travel), degrees.
    pub final_azimuth: f64,
}

/// Vincenty's inverse formula on the WGS84 ellipsoid.
///
/// Fast and accurate to well under a millimeter, but the iteration fails to
/// converge for nearly antipodal points.
pub fn vincenty_inverse(
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
) -> Result<InverseSolution, GeodesyError> {
    let l = (lon2 - lon1).to_radians();
    let u1 = ((1.0 - WGS84_F) * lat1.to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * lat2.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    let mut converged = false;
    let (mut sin_sigma, mut cos_sigma, mut sigma) = (0.0, 0.0, 0.0);
    let (mut cos_sq_alpha, mut cos_2sigma_m) = (0.0, 0.0);
    let (mut sin_lambda, mut cos_lambda) = (0.0, 0.0);

    for _ in 0..VINCENTY_MAX_ITERATIONS {
        (sin_lambda, cos_lambda) = lambda.sin_cos();
        let t1 = cos_u2 * sin_lambda;
        let t2 = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
        sin_sigma = (t1 * t1 + t2 * t2).sqrt();
        if sin_sigma == 0.0 {
            // Coincident points
            return Ok(InverseSolution {
                distance_m: 0.0,
                initial_azimuth: 0.0,
                final_azimuth: 0.0,
            });
        }
        cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            // Equatorial line
            0.0
        };
        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));
        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));
        if lambda.abs() > std::f64::consts::PI {
            break;
        }
        if (lambda - previous).abs() < VINCENTY_TOLERANCE {
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(GeodesyError::NoConvergence {
            iterations: VINCENTY_MAX_ITERATIONS,
        });
    }

    let u_sq = cos_sq_alpha * (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);
    let a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    let delta_sigma = b
        * sin_sigma
        * (cos_2sigma_m
            + b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                    - b / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma.powi(2))
                        * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));

    let distance_m = WGS84_B * a * (sigma - delta_sigma);
    let initial = (cos_u2 * sin_lambda).atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);
    let fin = (cos_u1 * sin_lambda).atan2(-sin_u1 * cos_u2 + cos_u1 * sin_u2 * cos_lambda);

    Ok(InverseSolution {
        distance_m,
        initial_azimuth: normalize_heading(initial.to_degrees()),
        final_azimuth: normalize_heading(fin.to_degrees()),
    })
}

/// Karney's inverse solution (via `geo`), correct for every pair of points.
///
/// The final azimuth is derived from the reverse geodesic, whose initial
/// azimuth is opposite to the forward final azimuth.
#[cfg(feature = "geodesic")]
pub fn karney_inverse(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> InverseSolution {
    use geo::{Bearing, Distance, Geodesic, Point};

    let p1 = Point::new(lon1, lat1);
    let p2 = Point::new(lon2, lat2);
    let distance_m = Geodesic::distance(p1, p2);
    if distance_m == 0.0 {
        return InverseSolution {
            distance_m,
            initial_azimuth: 0.0,
            final_azimuth: 0.0,
        };
    }

    InverseSolution {
        distance_m,
        initial_azimuth: normalize_heading(Geodesic::bearing(p1, p2)),
        final_azimuth: normalize_heading(Geodesic::bearing(p2, p1) + 180.0),
    }
}

/// Karney's direct solution (via `geo`).
#[cfg(feature = "geodesic")]
pub fn karney_destination(lat: f64, lon: f64, azimuth: f64, distance_m: f64) -> (f64, f64) {
    use geo::{Destination, Geodesic, Point};

    let p = Geodesic::destination(Point::new(lon, lat), azimuth, distance_m);
    (p.y(), p.x())
}

/// Equirectangular approximation on a sphere of mean radius.
///
/// Good to a fraction of a percent over runway-sized distances away from
/// the poles.
pub fn small_angle_inverse(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> InverseSolution {
    let mut d_lon = (lon2 - lon1).to_radians();
    if d_lon > std::f64::consts::PI {
        d_lon -= 2.0 * std::f64::consts::PI;
    } else if d_lon < -std::f64::consts::PI {
        d_lon += 2.0 * std::f64::consts::PI;
    }
    let d_lat = (lat2 - lat1).to_radians();
    let mean_lat = ((lat1 + lat2) / 2.0).to_radians();

    let east = d_lon * mean_lat.cos() * MEAN_EARTH_RADIUS_M;
    let north = d_lat * MEAN_EARTH_RADIUS_M;
    let azimuth = normalize_heading(east.atan2(north).to_degrees());

    InverseSolution {
        distance_m: east.hypot(north),
        initial_azimuth: azimuth,
        final_azimuth: azimuth,
    }
}

/// Most accurate inverse solution available.
///
/// Karney when the `geodesic` feature is enabled; otherwise Vincenty, falling
/// back to the small-angle approximation when Vincenty fails.
pub fn best_inverse(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> (InverseSolution, InverseMethod) {
    #[cfg(feature = "geodesic")]
    {
        (karney_inverse(lat1, lon1, lat2, lon2), InverseMethod::Karney)
    }

    #[cfg(not(feature = "geodesic"))]
    {
        match vincenty_inverse(lat1, lon1, lat2, lon2) {
            Ok(solution) => (solution, InverseMethod::Vincenty),
            Err(e) => {
                tracing::debug!(error = %e, "Falling back to small-angle inverse");
                (
                    small_angle_inverse(lat1, lon1, lat2, lon2),
                    InverseMethod::SmallAngle,
                )
            }
        }
    }
}

/// Distance in meters using the cheapest method that succeeds.
///
/// Order: Vincenty, then Karney (when the `geodesic` feature is enabled),
/// then the small-angle approximation.
pub fn cheap_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> (f64, InverseMethod) {
    match vincenty_inverse(lat1, lon1, lat2, lon2) {
        Ok(solution) => (solution.distance_m, InverseMethod::Vincenty),
        Err(_e) => {
            #[cfg(feature = "geodesic")]
            {
                (
                    karney_inverse(lat1, lon1, lat2, lon2).distance_m,
                    InverseMethod::Karney,
                )
            }

            #[cfg(not(feature = "geodesic"))]
            {
                tracing::debug!(error = %_e, "Falling back to small-angle distance");
                (
                    small_angle_inverse(lat1, lon1, lat2, lon2).distance_m,
                    InverseMethod::SmallAngle,
                )
            }
        }
    }
}

/// Small-angle direct solution on a sphere of mean radius.
///
/// Only suitable for short distances. Longitude offsets are divided by
/// `cos(latitude)`, so the result degrades near the poles; at exactly
/// +/-90 degrees there is no answer and `None` is returned.
pub fn small_angle_destination(
    lat: f64,
    lon: f64,
    azimuth: f64,
    distance_m: f64,
) -> Option<(f64, f64)> {
    let cos_lat = lat.to_radians().cos();
    if lat.abs() >= 90.0 || cos_lat == 0.0 {
        return None;
    }
    let angular = distance_m / MEAN_EARTH_RADIUS_M;
    let az = azimuth.to_radians();
    let d_lat = (angular * az.cos()).to_degrees();
    let d_lon = (angular * az.sin() / cos_lat).to_degrees();

    let mut lon2 = lon + d_lon;
    if lon2 > 180.0 {
        lon2 -= 360.0;
    } else if lon2 < -180.0 {
        lon2 += 360.0;
    }
    Some((lat + d_lat, lon2))
}

/// Point reached from `(lat, lon)` after `distance_m` along `azimuth`.
///
/// Uses Karney's direct solution when the `geodesic` feature is enabled,
/// otherwise [`small_angle_destination`].
pub fn destination(lat: f64, lon: f64, azimuth: f64, distance_m: f64) -> Option<(f64, f64)> {
    #[cfg(feature = "geodesic")]
    {
        Some(karney_destination(lat, lon, azimuth, distance_m))
    }

    #[cfg(not(feature = "geodesic"))]
    {
        small_angle_destination(lat, lon, azimuth, distance_m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Flinders Peak to Buninyong, the classic Vincenty test case
    const FLINDERS: (f64, f64) = (-37.951_033_416_666_67, 144.424_867_888_888_9);
    const BUNINYONG: (f64, f64) = (-37.652_821_138_888_89, 143.926_495_527_777_8);

    #[test]
    fn test_vincenty_reference_distance() {
        let s = vincenty_inverse(FLINDERS.0, FLINDERS.1, BUNINYONG.0, BUNINYONG.1).unwrap();
        assert!((s.distance_m - 54_972.271).abs() < 0.01, "{}", s.distance_m);
        assert!((s.initial_azimuth - 306.868_159).abs() < 1e-4);
        assert!((s.final_azimuth - 307.173_64).abs() < 1e-3);
    }

    #[test]
    fn test_vincenty_coincident_points() {
        let s = vincenty_inverse(45.0, 7.0, 45.0, 7.0).unwrap();
        assert_eq!(s.distance_m, 0.0);
    }

    #[test]
    fn test_vincenty_fails_near_antipodal() {
        let result = vincenty_inverse(0.0, 0.0, 0.0, 180.0);
        assert!(matches!(result, Err(GeodesyError::NoConvergence { .. })));
    }

    #[test]
    fn test_cheap_distance_never_fails() {
        let (d, method) = cheap_distance(0.0, 0.0, 0.0, 180.0);
        assert!(d > 19_000_000.0);
        assert_ne!(method, InverseMethod::Vincenty);
    }

    #[test]
    fn test_small_angle_close_to_vincenty_for_runways() {
        let (lat1, lon1, lat2, lon2) = (47.4589472, 8.5373764, 47.4566030, 8.5704697);
        let exact = vincenty_inverse(lat1, lon1, lat2, lon2).unwrap();
        let approx = small_angle_inverse(lat1, lon1, lat2, lon2);
        assert!((exact.distance_m - approx.distance_m).abs() / exact.distance_m < 0.005);
        assert!((exact.initial_azimuth - approx.initial_azimuth).abs() < 0.5);
    }

    #[test]
    fn test_small_angle_destination_pole_guard() {
        assert!(small_angle_destination(90.0, 0.0, 0.0, 100.0).is_none());
        assert!(small_angle_destination(-90.0, 0.0, 0.0, 100.0).is_none());
    }

    #[test]
    fn test_small_angle_destination_north() {
        let (lat, lon) = small_angle_destination(0.0, 0.0, 0.0, 111_195.0).unwrap();
        assert!((lat - 1.0).abs() < 1e-3);
        assert!(lon.abs() < 1e-12);
    }

    #[test]
    fn test_destination_then_inverse() {
        let (lat, lon) = destination(43.6294, 1.3678, 45.0, 3000.0).unwrap();
        let (s, _) = best_inverse(43.6294, 1.3678, lat, lon);
        assert!((s.distance_m - 3000.0).abs() < 30.0);
        assert!((s.initial_azimuth - 45.0).abs() < 0.5);
    }

    #[cfg(feature = "geodesic")]
    #[test]
    fn test_karney_matches_vincenty() {
        let k = karney_inverse(FLINDERS.0, FLINDERS.1, BUNINYONG.0, BUNINYONG.1);
        let v = vincenty_inverse(FLINDERS.0, FLINDERS.1, BUNINYONG.0, BUNINYONG.1).unwrap();
        assert!((k.distance_m - v.distance_m).abs() < 1e-3);
        assert!((k.initial_azimuth - v.initial_azimuth).abs() < 1e-6);
        assert!((k.final_azimuth - v.final_azimuth).abs() < 1e-6);
    }
}

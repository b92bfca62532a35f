//! Spherical geodesy on an arbitrary celestial body.
//!
//! All angles are decimal degrees unless a name says otherwise; all lengths
//! are meters. Every function is total over valid coordinates.

use crate::body::Body;

/// Great-circle distance between two points using the haversine formula.
///
/// Uses the two-argument arctangent so that neither identical nor antipodal
/// points produce a domain error.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
/// * `radius_m` - Radius of the body in meters
///
/// # Returns
/// Distance in meters
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64, radius_m: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    2.0 * radius_m * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Forward azimuth from point 1 towards point 2, in `[0, 360)`.
///
/// Identical points resolve to 0.
pub fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    normalize_bearing(x.atan2(y).to_degrees())
}

/// Heading on arrival at point 2 when travelling the great circle from point 1.
pub fn final_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    normalize_bearing(initial_bearing(lat2, lon2, lat1, lon1) + 180.0)
}

/// Project a point along a great circle ("reverse haversine").
///
/// # Arguments
/// * `lat`, `lon` - Starting position in degrees
/// * `bearing_deg` - Initial heading in degrees (0 = north, 90 = east)
/// * `distance_m` - Distance to travel in meters
/// * `radius_m` - Radius of the body in meters
///
/// # Returns
/// (new_lat, new_lon) in degrees, longitude wrapped to `[-180, 180)`
pub fn destination_point(
    lat: f64,
    lon: f64,
    bearing_deg: f64,
    distance_m: f64,
    radius_m: f64,
) -> (f64, f64) {
    if distance_m.abs() <= f64::EPSILON || radius_m <= 0.0 {
        return (lat, lon);
    }

    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let bearing_rad = bearing_deg.to_radians();
    let angular_distance = distance_m / radius_m;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    (lat2.to_degrees(), lon2.to_degrees())
}

/// Sample the body's surface height at a coordinate.
///
/// Bodies without a solid surface (stars, gas giants) always report 0.
pub fn terrain_height(lat: f64, lon: f64, body: &Body) -> f64 {
    if !body.has_surface {
        return 0.0;
    }
    let height = body.terrain.height(lat, lon);
    if height.is_finite() {
        height
    } else {
        0.0
    }
}

/// Wrap any heading into `[0, 360)`.
pub fn normalize_bearing(bearing_deg: f64) -> f64 {
    ((bearing_deg % 360.0) + 360.0) % 360.0
}

/// Body-centered cartesian position of a surface point at `altitude_m`
/// above the mean radius.
pub fn to_cartesian(lat: f64, lon: f64, altitude_m: f64, radius_m: f64) -> [f64; 3] {
    let phi = lat.to_radians();
    let lambda = lon.to_radians();
    let r = radius_m + altitude_m;
    [
        r * phi.cos() * lambda.cos(),
        r * phi.cos() * lambda.sin(),
        r * phi.sin(),
    ]
}

/// Straight-line (world space) distance between two positions on the same body.
pub fn world_distance(
    a: (f64, f64, f64),
    b: (f64, f64, f64),
    radius_m: f64,
) -> f64 {
    let pa = to_cartesian(a.0, a.1, a.2, radius_m);
    let pb = to_cartesian(b.0, b.1, b.2, radius_m);
    let dx = pa[0] - pb[0];
    let dy = pa[1] - pb[1];
    let dz = pa[2] - pb[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;
    use crate::terrain::FlatTerrain;

    const RADIUS: f64 = 600_000.0;

    #[test]
    fn test_distance_known_value() {
        // One degree of arc on a 600 km body
        let dist = distance(0.0, 0.0, 1.0, 0.0, RADIUS);
        let expected = RADIUS * 1.0_f64.to_radians();
        assert!((dist - expected).abs() < 1e-6, "got {dist}, expected {expected}");
    }

    #[test]
    fn test_distance_same_point_is_zero() {
        for (lat, lon) in [(0.0, 0.0), (45.5, -120.25), (-89.9, 179.9), (12.0, -0.001)] {
            assert_eq!(distance(lat, lon, lat, lon, RADIUS), 0.0);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            ((0.0, 0.0), (0.0, 0.02)),
            ((33.6, -117.8), (-12.4, 44.1)),
            ((89.0, 10.0), (-89.0, -170.0)),
        ];
        for ((lat1, lon1), (lat2, lon2)) in pairs {
            assert_eq!(
                distance(lat1, lon1, lat2, lon2, RADIUS),
                distance(lat2, lon2, lat1, lon1, RADIUS)
            );
        }
    }

    #[test]
    fn test_distance_antipodal_is_half_circumference() {
        let dist = distance(0.0, 0.0, 0.0, 180.0, RADIUS);
        assert!((dist - std::f64::consts::PI * RADIUS).abs() < 1e-3);
    }

    #[test]
    fn test_initial_bearing_cardinal_directions() {
        assert!((initial_bearing(0.0, 0.0, 1.0, 0.0) - 0.0).abs() < 1e-9);
        assert!((initial_bearing(0.0, 0.0, 0.0, 1.0) - 90.0).abs() < 1e-9);
        assert!((initial_bearing(0.0, 0.0, -1.0, 0.0) - 180.0).abs() < 1e-9);
        assert!((initial_bearing(0.0, 0.0, 0.0, -1.0) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_identical_points_bearing_is_zero() {
        assert_eq!(initial_bearing(10.0, 20.0, 10.0, 20.0), 0.0);
    }

    #[test]
    fn test_final_bearing_agrees_with_reverse_initial() {
        let cases = [(10.0, 20.0, 30.0, 40.0), (-5.0, 170.0, 5.0, -170.0), (0.0, 0.0, 0.0, 0.02)];
        for (lat1, lon1, lat2, lon2) in cases {
            let expected = (initial_bearing(lat2, lon2, lat1, lon1) + 180.0) % 360.0;
            let got = final_bearing(lat1, lon1, lat2, lon2);
            assert!((got - expected).abs() < 1e-9, "got {got}, expected {expected}");
            assert!((0.0..360.0).contains(&got));
        }
    }

    #[test]
    fn test_destination_point_reproduces_distance() {
        for bearing in [0.0, 37.5, 90.0, 181.0, 300.0] {
            for d in [1.0, 1000.0, 25_000.0, 400_000.0] {
                let (lat, lon) = destination_point(12.0, -40.0, bearing, d, RADIUS);
                let back = distance(12.0, -40.0, lat, lon, RADIUS);
                assert!((back - d).abs() < 1e-4, "bearing {bearing} distance {d} gave {back}");
            }
        }
    }

    #[test]
    fn test_destination_point_wraps_longitude() {
        let (_, lon) = destination_point(0.0, 179.9, 90.0, 10_000.0, RADIUS);
        assert!(lon < 0.0, "expected wrap into the western hemisphere, got {lon}");
    }

    #[test]
    fn test_terrain_height_zero_without_surface() {
        let mut body = Body::new("giant", 6_000_000.0, false, FlatTerrain(250.0));
        assert_eq!(terrain_height(1.0, 2.0, &body), 250.0);
        body.has_surface = false;
        assert_eq!(terrain_height(1.0, 2.0, &body), 0.0);
    }

    #[test]
    fn test_world_distance_matches_arc_for_short_hops() {
        let (lat, lon) = destination_point(0.0, 0.0, 45.0, 500.0, RADIUS);
        let chord = world_distance((0.0, 0.0, 0.0), (lat, lon, 0.0), RADIUS);
        assert!((chord - 500.0).abs() < 0.01);
    }

    #[test]
    fn test_normalize_bearing() {
        assert_eq!(normalize_bearing(-90.0), 270.0);
        assert_eq!(normalize_bearing(720.0), 0.0);
        assert_eq!(normalize_bearing(359.5), 359.5);
    }
}

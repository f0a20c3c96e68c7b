//! Geographic coordinate type and spatial utilities.
//!
//! `GeoPoint` uses `f64` latitude/longitude.  Mask cells are ~0.001° wide
//! and Douglas–Peucker tolerances sit at the same scale, so single precision
//! (≈1e-5° at these magnitudes) would eat a visible share of a cell.

use std::f64::consts::PI;

/// Mean Earth radius in metres (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Length of one degree of great-circle arc, in metres (≈111 195 m).
pub const METERS_PER_DEGREE: f64 = EARTH_RADIUS_M * PI / 180.0;

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both coordinates are finite numbers.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Initial great-circle bearing towards `other`, in degrees `[0, 360)`.
    pub fn bearing_deg(self, other: GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
        normalize_bearing(y.atan2(x).to_degrees())
    }

    /// The point reached by travelling `distance_m` metres from `self` along
    /// the initial bearing `bearing_deg`.
    pub fn destination(self, bearing_deg: f64, distance_m: f64) -> GeoPoint {
        let delta = distance_m / EARTH_RADIUS_M;
        let theta = bearing_deg.to_radians();
        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();

        let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
        let lon2 = lon1
            + (theta.sin() * delta.sin() * lat1.cos())
                .atan2(delta.cos() - lat1.sin() * lat2.sin());

        GeoPoint::new(lat2.to_degrees(), lon2.to_degrees())
    }

    /// Approximate bounding-box check; much cheaper than `distance_m` for
    /// quick rejection.
    #[inline]
    pub fn within_bbox(self, center: GeoPoint, half_deg: f64) -> bool {
        (self.lat - center.lat).abs() <= half_deg
            && (self.lon - center.lon).abs() <= half_deg
    }

    /// Shortest distance in metres from `self` to the segment `a`–`b`.
    ///
    /// Uses a local equirectangular projection centred on `self`; error is
    /// negligible for segments of a few kilometres.
    pub fn distance_to_segment_m(self, a: GeoPoint, b: GeoPoint) -> f64 {
        let (ax, ay) = self.project(a);
        let (bx, by) = self.project(b);
        let dx = bx - ax;
        let dy = by - ay;
        let len_sq = dx * dx + dy * dy;

        if len_sq < 1e-9 {
            return (ax * ax + ay * ay).sqrt();
        }

        // Parameter of the orthogonal projection of the origin onto a→b.
        let t = (-(ax * dx + ay * dy) / len_sq).clamp(0.0, 1.0);
        let px = ax + t * dx;
        let py = ay + t * dy;
        (px * px + py * py).sqrt()
    }

    /// `other` in metres east/north of `self`.
    #[inline]
    fn project(self, other: GeoPoint) -> (f64, f64) {
        let x = (other.lon - self.lon) * self.lat.to_radians().cos() * METERS_PER_DEGREE;
        let y = (other.lat - self.lat) * METERS_PER_DEGREE;
        (x, y)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Wrap any angle in degrees into `[0, 360)`.
#[inline]
pub fn normalize_bearing(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

/// Signed smallest difference `to - from` in degrees, in `(-180, 180]`.
pub fn bearing_delta(from: f64, to: f64) -> f64 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 { d - 360.0 } else { d }
}

/// Sum of haversine leg lengths along `points`, in metres.
pub fn polyline_length_m(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|w| w[0].distance_m(w[1])).sum()
}

/// Distance from `p` to the nearest point of the polyline, in metres.
///
/// Returns `None` for an empty polyline.  A single-point polyline yields the
/// point-to-point distance.
pub fn distance_to_polyline_m(p: GeoPoint, points: &[GeoPoint]) -> Option<f64> {
    match points {
        [] => None,
        [only] => Some(p.distance_m(*only)),
        _ => points
            .windows(2)
            .map(|w| p.distance_to_segment_m(w[0], w[1]))
            .min_by(f64::total_cmp),
    }
}

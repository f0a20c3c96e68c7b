//! Restricted-zone overlays (military areas, shipping lanes, reserves).
//!
//! Zones are simple polygons in lat/lon.  Containment uses even-odd ray
//! casting after a bounding-box rejection, which is exact for the small,
//! non-self-intersecting polygons maritime boundaries are published as.

use nav_core::GeoPoint;

/// One restricted polygon.
#[derive(Clone, Debug)]
pub struct RestrictedZone {
    pub name: String,
    /// Ring of vertices; closing the ring is implicit.
    pub polygon: Vec<GeoPoint>,
    /// Overrides the search's default penalty for this zone.
    pub penalty: Option<f64>,
    bbox: (GeoPoint, GeoPoint),
}

impl RestrictedZone {
    pub fn new(name: impl Into<String>, polygon: Vec<GeoPoint>) -> Self {
        let bbox = bounding_box(&polygon);
        Self { name: name.into(), polygon, penalty: None, bbox }
    }

    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.penalty = Some(penalty);
        self
    }

    /// Even-odd containment test.  Polygons with fewer than three vertices
    /// contain nothing.
    pub fn contains(&self, p: GeoPoint) -> bool {
        if self.polygon.len() < 3 {
            return false;
        }
        let (lo, hi) = self.bbox;
        if p.lat < lo.lat || p.lat > hi.lat || p.lon < lo.lon || p.lon > hi.lon {
            return false;
        }

        let mut inside = false;
        let n = self.polygon.len();
        let mut j = n - 1;
        for i in 0..n {
            let (a, b) = (self.polygon[i], self.polygon[j]);
            if (a.lat > p.lat) != (b.lat > p.lat) {
                let lon_at = a.lon + (p.lat - a.lat) / (b.lat - a.lat) * (b.lon - a.lon);
                if p.lon < lon_at {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

fn bounding_box(points: &[GeoPoint]) -> (GeoPoint, GeoPoint) {
    points.iter().fold(
        (
            GeoPoint::new(f64::INFINITY, f64::INFINITY),
            GeoPoint::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        ),
        |(lo, hi), p| {
            (
                GeoPoint::new(lo.lat.min(p.lat), lo.lon.min(p.lon)),
                GeoPoint::new(hi.lat.max(p.lat), hi.lon.max(p.lon)),
            )
        },
    )
}

// ── RestrictedZones ───────────────────────────────────────────────────────────

/// The set of known restricted zones.
#[derive(Clone, Debug, Default)]
pub struct RestrictedZones {
    zones: Vec<RestrictedZone>,
}

impl RestrictedZones {
    pub fn new(zones: Vec<RestrictedZone>) -> Self {
        Self { zones }
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RestrictedZone> {
        self.zones.iter()
    }

    /// `true` if any zone contains `p`.
    pub fn any_contains(&self, p: GeoPoint) -> bool {
        self.zones.iter().any(|z| z.contains(p))
    }

    /// Total penalty for standing at `p`.  Overlapping zones add up; each
    /// contributes its own penalty or `default_penalty`.
    pub fn penalty_at(&self, p: GeoPoint, default_penalty: f64) -> f64 {
        self.zones
            .iter()
            .filter(|z| z.contains(p))
            .map(|z| z.penalty.unwrap_or(default_penalty))
            .sum()
    }
}

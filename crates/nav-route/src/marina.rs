//! Marinas and the proximity-indexed marina registry.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over `[lat, lon]` answers "marinas within R metres
//! of p".  The tree is queried with a degree envelope that encloses the
//! radius, then candidates are filtered by exact haversine distance, so the
//! planar approximation never admits or drops a marina incorrectly.

use std::collections::BTreeSet;
use std::sync::Arc;

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use nav_core::{GeoPoint, MarinaId, METERS_PER_DEGREE};

// ── Marina ────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum MarinaKind {
    Marina,
    Harbor,
    Slipway,
    BoatRamp,
    Port,
}

impl MarinaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MarinaKind::Marina   => "marina",
            MarinaKind::Harbor   => "harbor",
            MarinaKind::Slipway  => "slipway",
            MarinaKind::BoatRamp => "boat_ramp",
            MarinaKind::Port     => "port",
        }
    }
}

/// Who may use a marina.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum AccessType {
    Public,
    Private,
    Customers,
    Permissive,
}

impl AccessType {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessType::Public     => "public",
            AccessType::Private    => "private",
            AccessType::Customers  => "customers",
            AccessType::Permissive => "permissive",
        }
    }
}

/// A land/water transfer point.
#[derive(Clone, Debug, PartialEq)]
pub struct Marina {
    pub id:         MarinaId,
    pub name:       String,
    pub location:   GeoPoint,
    pub kind:       MarinaKind,
    pub access:     AccessType,
    pub depth_m:    Option<f64>,
    pub facilities: BTreeSet<String>,
}

impl Marina {
    pub fn new(id: MarinaId, name: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            id,
            name: name.into(),
            location,
            kind: MarinaKind::Marina,
            access: AccessType::Public,
            depth_m: None,
            facilities: BTreeSet::new(),
        }
    }

    pub fn with_kind(mut self, kind: MarinaKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_access(mut self, access: AccessType) -> Self {
        self.access = access;
        self
    }

    /// Whether the marina may serve as a transfer point.
    pub fn is_eligible(&self, allow_private: bool) -> bool {
        allow_private || self.access != AccessType::Private
    }
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct MarinaEntry {
    point: [f64; 2], // [lat, lon]
    index: usize,
}

impl RTreeObject for MarinaEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for MarinaEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── MarinaRegistry ────────────────────────────────────────────────────────────

/// Immutable set of marinas with a spatial index.
pub struct MarinaRegistry {
    marinas: Vec<Arc<Marina>>,
    index:   RTree<MarinaEntry>,
}

impl MarinaRegistry {
    pub fn new(marinas: Vec<Marina>) -> Self {
        let marinas: Vec<Arc<Marina>> = marinas.into_iter().map(Arc::new).collect();
        let entries = marinas
            .iter()
            .enumerate()
            .map(|(index, m)| MarinaEntry { point: [m.location.lat, m.location.lon], index })
            .collect();
        Self { marinas, index: RTree::bulk_load(entries) }
    }

    pub fn len(&self) -> usize {
        self.marinas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marinas.is_empty()
    }

    pub fn get(&self, id: MarinaId) -> Option<&Arc<Marina>> {
        self.marinas.iter().find(|m| m.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Marina>> {
        self.marinas.iter()
    }

    /// Every marina within `radius_m` of `p`, nearest first.  Equal
    /// distances are ordered by id.
    pub fn within_radius(&self, p: GeoPoint, radius_m: f64) -> Vec<(Arc<Marina>, f64)> {
        let half_lat = radius_m / METERS_PER_DEGREE;
        // Widen the longitude span with latitude; clamp near the poles.
        let half_lon = half_lat / p.lat.to_radians().cos().max(0.01);
        let envelope = AABB::from_corners(
            [p.lat - half_lat, p.lon - half_lon],
            [p.lat + half_lat, p.lon + half_lon],
        );

        let mut hits: Vec<(Arc<Marina>, f64)> = self
            .index
            .locate_in_envelope(&envelope)
            .map(|e| &self.marinas[e.index])
            .map(|m| (Arc::clone(m), p.distance_m(m.location)))
            .filter(|(_, d)| *d <= radius_m)
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.id.cmp(&b.0.id)));
        hits
    }

    /// Eligible marinas within `radius_m`, nearest first.
    pub fn eligible_within(
        &self,
        p: GeoPoint,
        radius_m: f64,
        allow_private: bool,
    ) -> Vec<(Arc<Marina>, f64)> {
        self.within_radius(p, radius_m)
            .into_iter()
            .filter(|(m, _)| m.is_eligible(allow_private))
            .collect()
    }
}

//! Route data model.
//!
//! Every type here is an immutable value once built.  A recalculation
//! produces a new [`NavigationRoute`] with a fresh [`RouteId`]; nothing is
//! patched in place, so a route can be shared behind an `Arc` by the session
//! that follows it and by any observer.

use std::sync::Arc;

use nav_core::{GeoPoint, RouteId, Timestamp, TransportMode, WaypointId};

use crate::Marina;

// ── Segments ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum SegmentType {
    Land,
    Marine,
}

impl SegmentType {
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentType::Land   => "land",
            SegmentType::Marine => "marine",
        }
    }
}

/// One single-mode stretch of a route.
#[derive(Clone, Debug)]
pub struct RouteSegment {
    pub kind:         SegmentType,
    /// Ordered polyline, at least two points.
    pub geometry:     Vec<GeoPoint>,
    pub distance_m:   f64,
    pub duration_s:   f64,
    pub mode:         Option<TransportMode>,
    /// Marina where this marine segment is boarded.
    pub entry_marina: Option<Arc<Marina>>,
    /// Marina where this marine segment is left.
    pub exit_marina:  Option<Arc<Marina>>,
}

impl RouteSegment {
    /// First point of the geometry.
    pub fn start(&self) -> Option<GeoPoint> {
        self.geometry.first().copied()
    }

    /// Last point of the geometry.
    pub fn end(&self) -> Option<GeoPoint> {
        self.geometry.last().copied()
    }

    pub fn is_marine(&self) -> bool {
        self.kind == SegmentType::Marine
    }
}

// ── Waypoints ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum WaypointType {
    Start,
    End,
    Turn,
    /// Land → marine handoff.
    MarinaEntry,
    /// Marine → land handoff.
    MarinaExit,
    /// A requested via point.
    Intermediate,
}

#[derive(Clone, Debug)]
pub struct Waypoint {
    pub id:                  WaypointId,
    pub location:            GeoPoint,
    pub kind:                WaypointType,
    pub distance_from_start: f64,
    /// Initial bearing towards the next route vertex; `None` at the end.
    pub bearing_deg:         Option<f64>,
    pub instruction:         Option<String>,
    /// Seconds from departure until this waypoint is reached.
    pub estimated_time_s:    Option<f64>,
    pub segment_index:       usize,
    pub segment_type:        SegmentType,
}

// ── Metrics and validation ────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouteMetrics {
    pub land_distance_m:       f64,
    pub marine_distance_m:     f64,
    pub land_duration_s:       f64,
    pub marine_duration_s:     f64,
    pub restricted_violations: usize,
    /// Mean sounding over marine cells that have one.
    pub average_depth_m:       Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouteValidation {
    pub is_valid:              bool,
    /// Marine path cells inside a restricted zone.
    pub restricted_violations: usize,
    /// Simplified marine legs that touch a non-navigable cell.
    pub land_crossings:        usize,
    /// Land legs whose samples partly fall on open water.
    pub water_crossings:       usize,
}

// ── NavigationRoute ───────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct NavigationRoute {
    pub id:                   RouteId,
    pub origin:               GeoPoint,
    pub destination:          GeoPoint,
    pub segments:             Vec<RouteSegment>,
    /// All segment geometries joined, shared join points kept once.
    pub geometry:             Vec<GeoPoint>,
    pub waypoints:            Vec<Waypoint>,
    pub total_distance_m:     f64,
    pub estimated_duration_s: f64,
    pub validation:           RouteValidation,
    pub created_at:           Timestamp,
    pub metrics:              RouteMetrics,
}

impl NavigationRoute {
    /// `true` iff the route has both land and marine segments.
    pub fn is_hybrid(&self) -> bool {
        let land = self.segments.iter().any(|s| s.kind == SegmentType::Land);
        let marine = self.segments.iter().any(|s| s.kind == SegmentType::Marine);
        land && marine
    }

    pub fn final_waypoint_index(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }
}

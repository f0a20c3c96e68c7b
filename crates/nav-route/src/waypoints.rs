//! Waypoint synthesis.
//!
//! Walks the assembled segments once and emits, in travel order:
//!
//! - `Start` at the first vertex and `End` at the last;
//! - `MarinaEntry` / `MarinaExit` where the segment type changes;
//! - `Intermediate` where two segments of the same type meet (only happens
//!   at requested via points);
//! - `Turn` at interior vertices whose heading changes by at least the
//!   configured threshold.
//!
//! Distances accumulate along the geometry.  Times interpolate linearly
//! within each segment from its own duration, so a waypoint halfway along
//! a boat leg gets half that leg's duration.

use nav_core::{geo::bearing_delta, GeoPoint, TransportMode, WaypointId};

use crate::{RouteSegment, SegmentType, Waypoint, WaypointType};

/// Build the waypoint list for `segments`.
pub fn synthesize(segments: &[RouteSegment], turn_threshold_deg: f64) -> Vec<Waypoint> {
    let mut out: Vec<Waypoint> = Vec::new();
    let mut dist_before = 0.0;
    let mut time_before = 0.0;

    for (si, seg) in segments.iter().enumerate() {
        let geom = &seg.geometry;
        let secs_per_m = if seg.distance_m > 0.0 { seg.duration_s / seg.distance_m } else { 0.0 };
        let last_segment = si + 1 == segments.len();
        let mut along = 0.0;

        for (vi, &p) in geom.iter().enumerate() {
            if vi > 0 {
                along += geom[vi - 1].distance_m(p);
            }
            let next = geom.get(vi + 1).copied();

            let kind = if vi == 0 {
                if si == 0 {
                    Some(WaypointType::Start)
                } else {
                    Some(boundary_kind(segments[si - 1].kind, seg.kind))
                }
            } else if next.is_none() {
                // A segment's last vertex is the next segment's first.
                last_segment.then_some(WaypointType::End)
            } else {
                next.and_then(|n| {
                    let delta = bearing_delta(geom[vi - 1].bearing_deg(p), p.bearing_deg(n));
                    (delta.abs() >= turn_threshold_deg).then_some(WaypointType::Turn)
                })
            };

            let Some(kind) = kind else { continue };

            let bearing = next.map(|n| p.bearing_deg(n));
            let instruction = instruction(kind, segments, si, vi, bearing);
            out.push(Waypoint {
                id:                  WaypointId(out.len() as u32),
                location:            p,
                kind,
                distance_from_start: dist_before + along,
                bearing_deg:         bearing,
                instruction:         Some(instruction),
                estimated_time_s:    Some(time_before + along * secs_per_m),
                segment_index:       si,
                segment_type:        seg.kind,
            });
        }

        dist_before += seg.distance_m;
        time_before += seg.duration_s;
    }
    out
}

fn boundary_kind(prev: SegmentType, next: SegmentType) -> WaypointType {
    match (prev, next) {
        (SegmentType::Land, SegmentType::Marine) => WaypointType::MarinaEntry,
        (SegmentType::Marine, SegmentType::Land) => WaypointType::MarinaExit,
        _ => WaypointType::Intermediate,
    }
}

// ── Instructions ──────────────────────────────────────────────────────────────

/// Eight-point compass name for a bearing in degrees.
pub fn compass_point(bearing_deg: f64) -> &'static str {
    const NAMES: [&str; 8] = [
        "north", "north-east", "east", "south-east",
        "south", "south-west", "west", "north-west",
    ];
    let idx = ((bearing_deg.rem_euclid(360.0) + 22.5) / 45.0) as usize % 8;
    NAMES[idx]
}

fn heading(bearing: Option<f64>) -> String {
    bearing.map(|b| format!(", heading {}", compass_point(b))).unwrap_or_default()
}

fn instruction(
    kind: WaypointType,
    segments: &[RouteSegment],
    si: usize,
    vi: usize,
    bearing: Option<f64>,
) -> String {
    let seg = &segments[si];
    match kind {
        WaypointType::Start => {
            let mode = seg.mode.unwrap_or(TransportMode::Boat);
            format!("Depart by {mode}{}", heading(bearing))
        }
        WaypointType::End => "Arrive at destination".to_owned(),
        WaypointType::MarinaEntry => {
            let name = seg.entry_marina.as_ref().map_or("the marina", |m| m.name.as_str());
            format!("Board the boat at {name}{}", heading(bearing))
        }
        WaypointType::MarinaExit => {
            let name = segments[si - 1].exit_marina.as_ref().map_or("the marina", |m| m.name.as_str());
            let mode = seg.mode.unwrap_or_default();
            format!("Disembark at {name} and continue by {mode}{}", heading(bearing))
        }
        WaypointType::Intermediate => format!("Pass via point{}", heading(bearing)),
        WaypointType::Turn => {
            let geom: &[GeoPoint] = &seg.geometry;
            let delta = bearing.map_or(0.0, |b| bearing_delta(geom[vi - 1].bearing_deg(geom[vi]), b));
            let side = if delta > 0.0 { "right" } else { "left" };
            let qualifier = match delta.abs() {
                d if d >= 120.0 => "sharp ",
                d if d < 45.0 => "slight ",
                _ => "",
            };
            format!("Turn {qualifier}{side}{}", heading(bearing))
        }
    }
}

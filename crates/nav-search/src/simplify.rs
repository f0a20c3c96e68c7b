//! Douglas–Peucker line simplification.
//!
//! Works in raw degree space: the tolerance is an angular distance, which is
//! what the grid resolution is expressed in as well.

use nav_core::GeoPoint;

/// Simplify `points`, keeping every vertex that lies farther than
/// `tolerance_deg` from the chord that would replace it.
///
/// The first and last points are always kept.  Iterative (explicit stack),
/// so long raw cell paths cannot overflow the call stack.
pub fn simplify(points: &[GeoPoint], tolerance_deg: f64) -> Vec<GeoPoint> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut stack = vec![(0usize, points.len() - 1)];
    while let Some((first, last)) = stack.pop() {
        if last <= first + 1 {
            continue;
        }

        let mut max_dist = 0.0;
        let mut max_idx = first;
        for i in first + 1..last {
            let d = perpendicular_distance(points[i], points[first], points[last]);
            if d > max_dist {
                max_dist = d;
                max_idx = i;
            }
        }

        if max_dist > tolerance_deg {
            keep[max_idx] = true;
            stack.push((first, max_idx));
            stack.push((max_idx, last));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Distance in degrees from `p` to the segment `a`–`b`.
fn perpendicular_distance(p: GeoPoint, a: GeoPoint, b: GeoPoint) -> f64 {
    let dx = b.lon - a.lon;
    let dy = b.lat - a.lat;
    let len_sq = dx * dx + dy * dy;

    if len_sq < 1e-18 {
        return ((p.lon - a.lon).powi(2) + (p.lat - a.lat).powi(2)).sqrt();
    }

    let t = (((p.lon - a.lon) * dx + (p.lat - a.lat) * dy) / len_sq).clamp(0.0, 1.0);
    let px = a.lon + t * dx;
    let py = a.lat + t * dy;
    ((p.lon - px).powi(2) + (p.lat - py).powi(2)).sqrt()
}

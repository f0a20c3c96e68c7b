//! A simulated device that moves along a polyline at a fixed step.

use nav_core::GeoPoint;

pub struct Traveler {
    path: Vec<GeoPoint>,
    leg:  usize,
    pos:  GeoPoint,
}

impl Traveler {
    /// `None` for an empty path.
    pub fn new(path: Vec<GeoPoint>) -> Option<Self> {
        let pos = *path.first()?;
        Some(Self { path, leg: 0, pos })
    }

    pub fn finished(&self) -> bool {
        self.leg + 1 >= self.path.len()
    }

    /// Move `step_m` metres further along the path (or to its end).
    pub fn advance(&mut self, step_m: f64) -> GeoPoint {
        let mut remaining = step_m;
        while let Some(&next) = self.path.get(self.leg + 1) {
            let d = self.pos.distance_m(next);
            if d > remaining {
                self.pos = self.pos.destination(self.pos.bearing_deg(next), remaining);
                return self.pos;
            }
            remaining -= d;
            self.pos = next;
            self.leg += 1;
        }
        self.pos
    }

    /// Bearing of the current leg, if any remains.
    pub fn heading(&self) -> Option<f64> {
        self.path.get(self.leg + 1).map(|&next| self.pos.bearing_deg(next))
    }
}

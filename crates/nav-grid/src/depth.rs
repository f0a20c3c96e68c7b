//! Sparse per-cell depth soundings.
//!
//! Depth coverage is patchy (charted channels, marina approaches), so the
//! layer is a hash map keyed by the grid's linear cell index rather than a
//! dense array.  Cells without a sounding simply contribute no depth cost.

use rustc_hash::FxHashMap;

use crate::{CellIndex, NavigabilityGrid};

/// Depth in metres for a subset of grid cells.
#[derive(Clone, Debug, Default)]
pub struct DepthMap {
    width: usize,
    depths: FxHashMap<usize, f64>,
}

impl DepthMap {
    /// An empty layer aligned with `grid`.
    pub fn for_grid(grid: &NavigabilityGrid) -> Self {
        Self { width: grid.width(), depths: FxHashMap::default() }
    }

    /// Record a sounding.  Non-positive or non-finite depths are ignored.
    pub fn set(&mut self, cell: CellIndex, depth_m: f64) {
        if depth_m.is_finite() && depth_m > 0.0 {
            self.depths.insert(cell.row * self.width + cell.col, depth_m);
        }
    }

    #[inline]
    pub fn depth_at(&self, cell: CellIndex) -> Option<f64> {
        self.depths.get(&(cell.row * self.width + cell.col)).copied()
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }
}

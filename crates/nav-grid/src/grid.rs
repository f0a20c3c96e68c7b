//! The navigability grid and its spatial queries.
//!
//! # Data layout
//!
//! Cells are stored densely in row-major order.  Row `r`, column `c` lives at
//! linear index `r * width + c`; row 0 is the southern edge (`min_lat`) and
//! column 0 the western edge (`min_lon`).  A coordinate maps to
//!
//! ```text
//! row = floor((lat − min_lat) / resolution)
//! col = floor((lon − min_lon) / resolution)
//! ```
//!
//! and coordinates outside the bounding box (or past the last full cell)
//! map to no cell at all.  Out-of-coverage is never navigable.
//!
//! The grid is immutable after construction, so any number of searches may
//! read it concurrently through a shared `Arc` without locking.

use std::path::Path;

use tracing::info;

use nav_core::{GeoPoint, METERS_PER_DEGREE};

use crate::{GridError, GridResult, MaskMetadata};

/// Offsets of the 8-connected neighbourhood in row-major order.
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    ( 0, -1),          ( 0, 1),
    ( 1, -1), ( 1, 0), ( 1, 1),
];

// ── Cell types ────────────────────────────────────────────────────────────────

/// Classification of one mask cell.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum CellState {
    Land,
    Water,
}

/// Row/column address of a cell.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct CellIndex {
    pub row: usize,
    pub col: usize,
}

impl CellIndex {
    #[inline]
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Chebyshev (king-move) distance in cells.
    #[inline]
    pub fn chebyshev(self, other: CellIndex) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }
}

/// Coverage summary of a mask.
#[derive(Clone, Debug, PartialEq)]
pub struct AreaStats {
    pub total_cells: usize,
    pub water_cells: usize,
    pub land_cells: usize,
    pub water_percentage: f64,
    /// Approximate areas assuming square cells of `resolution × 111.2 km`.
    pub water_area_km2: f64,
    pub land_area_km2: f64,
}

// ── NavigabilityGrid ──────────────────────────────────────────────────────────

/// Immutable land/water mask over a coastal bounding box.
#[derive(Clone, Debug)]
pub struct NavigabilityGrid {
    meta:  MaskMetadata,
    cells: Vec<CellState>,
}

impl NavigabilityGrid {
    /// Validate and decode raw mask bytes.
    ///
    /// Fails with [`GridError::MaskCorrupt`] when the byte count differs from
    /// `width × height` or a byte matches neither declared encoding.
    pub fn initialize(mask_bytes: &[u8], meta: MaskMetadata) -> GridResult<Self> {
        meta.validate()?;

        let expected = meta.cell_count();
        if mask_bytes.len() != expected {
            return Err(GridError::MaskCorrupt(format!(
                "expected {expected} bytes for a {}x{} grid, got {}",
                meta.width,
                meta.height,
                mask_bytes.len()
            )));
        }

        let cells = mask_bytes
            .iter()
            .enumerate()
            .map(|(i, &b)| {
                if b == meta.water_value {
                    Ok(CellState::Water)
                } else if b == meta.land_value {
                    Ok(CellState::Land)
                } else {
                    Err(GridError::MaskCorrupt(format!(
                        "byte {b} at offset {i} is neither water ({}) nor land ({})",
                        meta.water_value, meta.land_value
                    )))
                }
            })
            .collect::<GridResult<Vec<_>>>()?;

        let grid = Self { meta, cells };
        info!(
            width = grid.meta.width,
            height = grid.meta.height,
            resolution_deg = grid.meta.resolution_deg,
            water_cells = grid.cells.iter().filter(|c| **c == CellState::Water).count(),
            "navigability mask loaded"
        );
        Ok(grid)
    }

    /// Load a mask file and its JSON metadata companion.
    pub fn load_files(mask_path: &Path, metadata_path: &Path) -> GridResult<Self> {
        let meta = MaskMetadata::from_json_file(metadata_path)?;
        let bytes = std::fs::read(mask_path)?;
        Self::initialize(&bytes, meta)
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    #[inline]
    pub fn metadata(&self) -> &MaskMetadata {
        &self.meta
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.meta.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.meta.height
    }

    #[inline]
    pub fn resolution_deg(&self) -> f64 {
        self.meta.resolution_deg
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    // ── Cell addressing ───────────────────────────────────────────────────

    /// The cell containing `p`, or `None` outside coverage.
    pub fn cell_of(&self, p: GeoPoint) -> Option<CellIndex> {
        if !self.meta.contains(p) {
            return None;
        }
        let row = ((p.lat - self.meta.min_lat) / self.meta.resolution_deg).floor();
        let col = ((p.lon - self.meta.min_lon) / self.meta.resolution_deg).floor();
        if row < 0.0 || col < 0.0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        (row < self.meta.height && col < self.meta.width).then_some(CellIndex { row, col })
    }

    /// Geographic centre of `cell`.
    #[inline]
    pub fn cell_center(&self, cell: CellIndex) -> GeoPoint {
        GeoPoint::new(
            self.meta.min_lat + (cell.row as f64 + 0.5) * self.meta.resolution_deg,
            self.meta.min_lon + (cell.col as f64 + 0.5) * self.meta.resolution_deg,
        )
    }

    /// Row-major linear index of `cell`.
    #[inline]
    pub fn linear_index(&self, cell: CellIndex) -> usize {
        cell.row * self.meta.width + cell.col
    }

    /// Inverse of [`linear_index`](Self::linear_index).
    #[inline]
    pub fn cell_at(&self, index: usize) -> CellIndex {
        CellIndex::new(index / self.meta.width, index % self.meta.width)
    }

    #[inline]
    pub fn in_bounds(&self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.meta.height && (col as usize) < self.meta.width
    }

    #[inline]
    pub fn state(&self, cell: CellIndex) -> CellState {
        self.cells[self.linear_index(cell)]
    }

    #[inline]
    pub fn is_water(&self, cell: CellIndex) -> bool {
        self.state(cell) == CellState::Water
    }

    /// In-bounds 8-connected neighbours of `cell`, in row-major order, each
    /// tagged with whether the step is diagonal.
    ///
    /// Fixed-size scan, no heap allocation.
    pub fn neighbors(&self, cell: CellIndex) -> impl Iterator<Item = (CellIndex, bool)> + '_ {
        NEIGHBOR_OFFSETS.iter().filter_map(move |&(dr, dc)| {
            let r = cell.row as i64 + dr;
            let c = cell.col as i64 + dc;
            self.in_bounds(r, c)
                .then(|| (CellIndex::new(r as usize, c as usize), dr != 0 && dc != 0))
        })
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// `true` only for points inside coverage whose cell is water.  O(1).
    #[inline]
    pub fn is_navigable(&self, p: GeoPoint) -> bool {
        self.cell_of(p).is_some_and(|c| self.is_water(c))
    }

    /// Nearest water to `p` within `max_radius_m`, or `None`.
    ///
    /// A point already in water is returned unchanged.  Otherwise the search
    /// expands in Chebyshev rings around the starting cell, scanning each
    /// ring row-major, and returns the centre of the first water cell.  The
    /// ring bound is `ceil(max_radius_m / cell_size_m)`, capped at the larger
    /// grid dimension.  Points outside
    /// coverage have no starting cell and yield `None`.
    pub fn find_nearest_water(&self, p: GeoPoint, max_radius_m: f64) -> Option<GeoPoint> {
        let start = self.cell_of(p)?;
        if self.is_water(start) {
            return Some(p);
        }

        let cell_m = self.meta.resolution_deg * METERS_PER_DEGREE;
        // No ring past the larger grid dimension holds an in-bounds cell.
        let grid_span = self.meta.width.max(self.meta.height) as i64;
        let max_ring = ((max_radius_m.max(0.0) / cell_m).ceil() as i64).min(grid_span);
        let (r0, c0) = (start.row as i64, start.col as i64);

        for ring in 1..=max_ring {
            if let Some(cell) = self.first_water_on_ring(r0, c0, ring) {
                return Some(self.cell_center(cell));
            }
        }
        None
    }

    /// First water cell on the Chebyshev ring of radius `ring` around
    /// `(r0, c0)`, in row-major order: top edge, then the two side cells of
    /// each middle row, then the bottom edge.
    fn first_water_on_ring(&self, r0: i64, c0: i64, ring: i64) -> Option<CellIndex> {
        let water_at = |r: i64, c: i64| {
            if !self.in_bounds(r, c) {
                return None;
            }
            let cell = CellIndex::new(r as usize, c as usize);
            self.is_water(cell).then_some(cell)
        };

        let top = (c0 - ring..=c0 + ring).find_map(|c| water_at(r0 - ring, c));
        if top.is_some() {
            return top;
        }
        let sides = (r0 - ring + 1..r0 + ring)
            .find_map(|r| water_at(r, c0 - ring).or_else(|| water_at(r, c0 + ring)));
        if sides.is_some() {
            return sides;
        }
        (c0 - ring..=c0 + ring).find_map(|c| water_at(r0 + ring, c))
    }

    /// [`find_nearest_water`](Self::find_nearest_water) with the failure
    /// reason spelled out.
    pub fn nearest_water(&self, p: GeoPoint, max_radius_m: f64) -> GridResult<GeoPoint> {
        if self.cell_of(p).is_none() {
            return Err(GridError::OutOfCoverage(p));
        }
        self.find_nearest_water(p, max_radius_m)
            .ok_or(GridError::NoWaterFound { from: p, radius_m: max_radius_m })
    }

    /// Haversine distance in metres.  Reporting only; search costs are in
    /// cell units.
    #[inline]
    pub fn distance(&self, a: GeoPoint, b: GeoPoint) -> f64 {
        a.distance_m(b)
    }

    /// Indices of polyline legs that touch a non-navigable cell.
    ///
    /// Each leg `points[i] → points[i+1]` is sampled at `samples_per_leg + 1`
    /// evenly spaced points (endpoints included).
    pub fn check_polyline(&self, points: &[GeoPoint], samples_per_leg: usize) -> Vec<usize> {
        let samples = samples_per_leg.max(1);
        points
            .windows(2)
            .enumerate()
            .filter(|(_, leg)| {
                (0..=samples).any(|j| {
                    let t = j as f64 / samples as f64;
                    let p = GeoPoint::new(
                        leg[0].lat + t * (leg[1].lat - leg[0].lat),
                        leg[0].lon + t * (leg[1].lon - leg[0].lon),
                    );
                    !self.is_navigable(p)
                })
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Fraction of polyline samples that fall on navigable water.
    ///
    /// Legs are sampled as in [`check_polyline`](Self::check_polyline), but
    /// the polyline's own first and last points are left out so a route that
    /// ends at the waterline is not counted as wet.  `0.0` when no interior
    /// sample exists.
    pub fn water_fraction(&self, points: &[GeoPoint], samples_per_leg: usize) -> f64 {
        let samples = samples_per_leg.max(1);
        let (mut water, mut total) = (0usize, 0usize);
        for (i, leg) in points.windows(2).enumerate() {
            for j in usize::from(i == 0)..samples {
                let t = j as f64 / samples as f64;
                let p = GeoPoint::new(
                    leg[0].lat + t * (leg[1].lat - leg[0].lat),
                    leg[0].lon + t * (leg[1].lon - leg[0].lon),
                );
                total += 1;
                water += usize::from(self.is_navigable(p));
            }
        }
        if total == 0 { 0.0 } else { water as f64 / total as f64 }
    }

    /// Water/land cell counts and approximate areas.
    pub fn area_stats(&self) -> AreaStats {
        let total_cells = self.cells.len();
        let water_cells = self.cells.iter().filter(|c| **c == CellState::Water).count();
        let land_cells = total_cells - water_cells;
        let cell_km = self.meta.resolution_deg * METERS_PER_DEGREE / 1_000.0;
        let cell_area_km2 = cell_km * cell_km;

        AreaStats {
            total_cells,
            water_cells,
            land_cells,
            water_percentage: water_cells as f64 / total_cells as f64 * 100.0,
            water_area_km2: water_cells as f64 * cell_area_km2,
            land_area_km2: land_cells as f64 * cell_area_km2,
        }
    }
}

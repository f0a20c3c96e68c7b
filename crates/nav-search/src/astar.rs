//! Weighted A* over the navigability grid.
//!
//! # Determinism
//!
//! Open-set entries are ordered by `(f, seq)` where `seq` is a monotonically
//! increasing insertion counter, so equal-`f` entries pop in FIFO order.
//! Neighbours are generated in the grid's fixed row-major order.  Together
//! these make the returned path a pure function of grid, layers, endpoints,
//! and configuration.
//!
//! # Budget
//!
//! The search fails with `PathNotFound` once `max_iterations` cells have been
//! expanded.  Every `check_interval` expansions it also polls the cancel
//! token and the wall clock.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Instant;

use rustc_hash::FxHashMap;
use tracing::{debug, info};

use nav_core::{geo::polyline_length_m, CancelToken, GeoPoint, SearchConfig, METERS_PER_DEGREE};
use nav_grid::{CellIndex, DepthMap, NavigabilityGrid, RestrictedZones};
use nav_weather::{WeatherCost, WeatherCostModel};

use crate::{simplify, Endpoint, SearchError, SearchResult};

const DIAGONAL_COST: f64 = std::f64::consts::SQRT_2;

// ── CostLayers ────────────────────────────────────────────────────────────────

/// Optional overlays that shape the edge cost.  Absent layers contribute
/// nothing.
#[derive(Copy, Clone, Default)]
pub struct CostLayers<'a> {
    pub weather: Option<&'a WeatherCostModel>,
    pub zones:   Option<&'a RestrictedZones>,
    pub depth:   Option<&'a DepthMap>,
}

// ── MarinePath ────────────────────────────────────────────────────────────────

/// A successful search.
#[derive(Clone, Debug)]
pub struct MarinePath {
    /// Grid cells from start to goal, inclusive.
    pub cells: Vec<CellIndex>,
    /// Simplified geometry.  The first and last points are the exact
    /// requested endpoints; the rest are cell centres.
    pub geometry: Vec<GeoPoint>,
    /// Accumulated cost in cell units.
    pub cost: f64,
    /// Heuristic estimate from start to goal (a lower bound on `cost`).
    pub lower_bound: f64,
    /// Haversine length of `geometry`, metres.
    pub distance_m: f64,
    /// Number of cells expanded.
    pub expanded: usize,
}

// ── Open set ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug)]
struct OpenEntry {
    f:     f64,
    seq:   u64,
    index: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f.total_cmp(&other.f).then(self.seq.cmp(&other.seq))
    }
}

/// Per-cell search bookkeeping.  Only touched cells get an entry.
#[derive(Copy, Clone, Debug)]
struct NodeRecord {
    g:      f64,
    parent: Option<usize>,
    closed: bool,
}

// ── MarineSearch ──────────────────────────────────────────────────────────────

/// A* search bound to one grid snapshot and one set of cost layers.
///
/// Borrowing (rather than owning) the inputs lets concurrent searches share
/// a single grid behind an `Arc` with no locking.
pub struct MarineSearch<'a> {
    grid:   &'a NavigabilityGrid,
    layers: CostLayers<'a>,
    config: SearchConfig,
}

impl<'a> MarineSearch<'a> {
    pub fn new(grid: &'a NavigabilityGrid, layers: CostLayers<'a>, config: SearchConfig) -> Self {
        Self { grid, layers, config }
    }

    /// Heuristic from `cell` to `goal` in cell units.
    pub fn heuristic(&self, cell: CellIndex, goal: CellIndex) -> f64 {
        let a = self.grid.cell_center(cell);
        let b = self.grid.cell_center(goal);
        a.distance_m(b) / METERS_PER_DEGREE / self.grid.resolution_deg()
    }

    /// Cost of stepping into `to`, or `None` if `to` may not be entered.
    fn step_cost(&self, to: CellIndex, diagonal: bool) -> Option<f64> {
        if !self.grid.is_water(to) {
            return None;
        }
        let center = self.grid.cell_center(to);

        let multiplier = match self.layers.weather.map(|w| w.cost_at(center)) {
            Some(WeatherCost::Blocked) => return None,
            Some(WeatherCost::Multiplier(m)) => m,
            None => 1.0,
        };

        let base = if diagonal { DIAGONAL_COST } else { 1.0 };
        let mut cost = base * multiplier;

        if self.config.depth_weight > 0.0 {
            if let Some(depth) = self.layers.depth.and_then(|d| d.depth_at(to)) {
                cost += self.config.depth_weight / depth;
            }
        }
        if let Some(zones) = self.layers.zones {
            cost += zones.penalty_at(center, self.config.restricted_penalty);
        }
        Some(cost)
    }

    fn endpoint_cell(&self, p: GeoPoint, which: Endpoint) -> SearchResult<CellIndex> {
        self.grid
            .cell_of(p)
            .filter(|c| self.grid.is_water(*c))
            .ok_or(SearchError::InvalidEndpoint { which, point: p })
    }

    /// Find the least-cost water path from `start` to `goal`.
    pub fn find_path(
        &self,
        start: GeoPoint,
        goal: GeoPoint,
        cancel: &CancelToken,
    ) -> SearchResult<MarinePath> {
        let start_cell = self.endpoint_cell(start, Endpoint::Start)?;
        let goal_cell = self.endpoint_cell(goal, Endpoint::Goal)?;
        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        let lower_bound = self.heuristic(start_cell, goal_cell);
        debug!(%start, %goal, lower_bound, "marine search started");

        if start_cell == goal_cell {
            return Ok(self.finish(vec![start_cell], start, goal, 0.0, lower_bound, 0));
        }

        let began = Instant::now();
        let check_interval = self.config.check_interval.max(1);
        let start_idx = self.grid.linear_index(start_cell);
        let goal_idx = self.grid.linear_index(goal_cell);

        let mut nodes: FxHashMap<usize, NodeRecord> = FxHashMap::default();
        let mut heap: BinaryHeap<Reverse<OpenEntry>> = BinaryHeap::new();
        let mut seq: u64 = 0;
        let mut expanded: usize = 0;

        nodes.insert(start_idx, NodeRecord { g: 0.0, parent: None, closed: false });
        heap.push(Reverse(OpenEntry { f: lower_bound, seq, index: start_idx }));

        while let Some(Reverse(entry)) = heap.pop() {
            let Some(record) = nodes.get_mut(&entry.index) else { continue };
            // Stale duplicate of an already-expanded cell.
            if record.closed {
                continue;
            }
            record.closed = true;
            let g = record.g;

            if entry.index == goal_idx {
                let cells = reconstruct(self.grid, &nodes, goal_idx);
                let path = self.finish(cells, start, goal, g, lower_bound, expanded);
                info!(
                    expanded,
                    cost = path.cost,
                    distance_m = path.distance_m,
                    points = path.geometry.len(),
                    "marine path found"
                );
                return Ok(path);
            }

            expanded += 1;
            if expanded > self.config.max_iterations {
                debug!(expanded, "marine search hit its iteration cap");
                return Err(SearchError::PathNotFound { expanded });
            }
            if expanded % check_interval == 0 {
                if cancel.is_cancelled() {
                    debug!(expanded, "marine search cancelled");
                    return Err(SearchError::Cancelled);
                }
                if began.elapsed().as_millis() as u64 >= self.config.timeout_ms {
                    debug!(expanded, "marine search timed out");
                    return Err(SearchError::Timeout { budget_ms: self.config.timeout_ms });
                }
            }

            let cell = self.grid.cell_at(entry.index);
            for (next, diagonal) in self.grid.neighbors(cell) {
                let next_idx = self.grid.linear_index(next);
                if nodes.get(&next_idx).is_some_and(|n| n.closed) {
                    continue;
                }
                let Some(step) = self.step_cost(next, diagonal) else { continue };

                let tentative = g + step;
                let improved = nodes.get(&next_idx).is_none_or(|n| tentative < n.g);
                if improved {
                    nodes.insert(
                        next_idx,
                        NodeRecord { g: tentative, parent: Some(entry.index), closed: false },
                    );
                    seq += 1;
                    let f = tentative + self.heuristic(next, goal_cell);
                    heap.push(Reverse(OpenEntry { f, seq, index: next_idx }));
                }
            }
        }

        debug!(expanded, "marine search exhausted the reachable water");
        Err(SearchError::PathNotFound { expanded })
    }

    fn finish(
        &self,
        cells: Vec<CellIndex>,
        start: GeoPoint,
        goal: GeoPoint,
        cost: f64,
        lower_bound: f64,
        expanded: usize,
    ) -> MarinePath {
        let centers: Vec<GeoPoint> = cells.iter().map(|c| self.grid.cell_center(*c)).collect();
        let mut geometry = simplify(&centers, self.config.simplify_tolerance_deg);

        if geometry.len() < 2 {
            geometry = vec![start, goal];
        } else {
            geometry[0] = start;
            if let Some(last) = geometry.last_mut() {
                *last = goal;
            }
        }

        MarinePath {
            distance_m: polyline_length_m(&geometry),
            cells,
            geometry,
            cost,
            lower_bound,
            expanded,
        }
    }
}

fn reconstruct(
    grid: &NavigabilityGrid,
    nodes: &FxHashMap<usize, NodeRecord>,
    goal: usize,
) -> Vec<CellIndex> {
    let mut cells = vec![grid.cell_at(goal)];
    let mut cur = goal;
    while let Some(parent) = nodes.get(&cur).and_then(|n| n.parent) {
        cells.push(grid.cell_at(parent));
        cur = parent;
    }
    cells.reverse();
    cells
}

//! Unit tests for nav-search.
//!
//! Grids are drawn in ASCII: `~` = water, `#` = land, `rows[0]` is south.

#[cfg(test)]
mod helpers {
    use nav_core::GeoPoint;
    use nav_grid::{MaskMetadata, NavigabilityGrid};

    pub const MIN_LAT: f64 = 26.0;
    pub const MIN_LON: f64 = 50.5;
    pub const RES: f64 = 0.01;

    pub fn grid_from_rows(rows: &[&str]) -> NavigabilityGrid {
        let bytes: Vec<u8> = rows
            .iter()
            .flat_map(|r| r.bytes().map(|b| u8::from(b == b'~')))
            .collect();
        let meta = MaskMetadata::from_origin(MIN_LAT, MIN_LON, RES, rows[0].len(), rows.len());
        NavigabilityGrid::initialize(&bytes, meta).unwrap()
    }

    pub fn open_water(width: usize, height: usize) -> NavigabilityGrid {
        let row = "~".repeat(width);
        let rows: Vec<&str> = (0..height).map(|_| row.as_str()).collect();
        grid_from_rows(&rows)
    }

    /// Centre of cell (row, col).
    pub fn at(row: usize, col: usize) -> GeoPoint {
        GeoPoint::new(
            MIN_LAT + (row as f64 + 0.5) * RES,
            MIN_LON + (col as f64 + 0.5) * RES,
        )
    }
}

// ── Basic search ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod basic {
    use nav_core::{CancelToken, SearchConfig};
    use nav_grid::CellIndex;

    use super::helpers::{at, grid_from_rows, open_water};
    use crate::{CostLayers, Endpoint, MarineSearch, SearchError};

    #[test]
    fn straight_column_cost_equals_heuristic() {
        let grid = open_water(3, 10);
        let search = MarineSearch::new(&grid, CostLayers::default(), SearchConfig::default());
        let path = search.find_path(at(0, 1), at(9, 1), &CancelToken::new()).unwrap();

        assert!((path.cost - 9.0).abs() < 1e-9);
        assert!((path.cost - path.lower_bound).abs() < 1e-9);
        assert_eq!(path.cells.len(), 10);
        assert!(path.cells.iter().all(|c| c.col == 1));
        // Collinear centres collapse to the two endpoints.
        assert_eq!(path.geometry, vec![at(0, 1), at(9, 1)]);
    }

    #[test]
    fn geometry_uses_exact_endpoints() {
        let grid = open_water(5, 5);
        let search = MarineSearch::new(&grid, CostLayers::default(), SearchConfig::default());
        let start = nav_core::GeoPoint::new(26.0012, 50.5017);
        let goal = nav_core::GeoPoint::new(26.0488, 50.5031);
        let path = search.find_path(start, goal, &CancelToken::new()).unwrap();
        assert_eq!(path.geometry.first(), Some(&start));
        assert_eq!(path.geometry.last(), Some(&goal));
        assert!(path.distance_m > 0.0);
    }

    #[test]
    fn same_cell_is_trivial() {
        let grid = open_water(3, 3);
        let search = MarineSearch::new(&grid, CostLayers::default(), SearchConfig::default());
        let start = nav_core::GeoPoint::new(26.011, 50.511);
        let goal = nav_core::GeoPoint::new(26.018, 50.517);
        let path = search.find_path(start, goal, &CancelToken::new()).unwrap();
        assert_eq!(path.cost, 0.0);
        assert_eq!(path.cells, vec![CellIndex::new(1, 1)]);
        assert_eq!(path.geometry, vec![start, goal]);
    }

    #[test]
    fn land_goal_is_invalid_endpoint() {
        let grid = grid_from_rows(&["~~#"]);
        let search = MarineSearch::new(&grid, CostLayers::default(), SearchConfig::default());
        let err = search.find_path(at(0, 0), at(0, 2), &CancelToken::new()).unwrap_err();
        assert!(matches!(err, SearchError::InvalidEndpoint { which: Endpoint::Goal, .. }));
    }

    #[test]
    fn uncovered_start_is_invalid_endpoint() {
        let grid = open_water(3, 3);
        let search = MarineSearch::new(&grid, CostLayers::default(), SearchConfig::default());
        let outside = nav_core::GeoPoint::new(25.0, 50.0);
        let err = search.find_path(outside, at(1, 1), &CancelToken::new()).unwrap_err();
        assert!(matches!(err, SearchError::InvalidEndpoint { which: Endpoint::Start, .. }));
    }

    #[test]
    fn detours_through_gap_in_land() {
        let grid = grid_from_rows(&[
            "~~~~~",
            "~~~~~",
            "###~#",
            "~~~~~",
            "~~~~~",
        ]);
        let search = MarineSearch::new(&grid, CostLayers::default(), SearchConfig::default());
        let path = search.find_path(at(0, 0), at(4, 0), &CancelToken::new()).unwrap();

        assert!(path.cells.contains(&CellIndex::new(2, 3)));
        assert!(path.cells.iter().all(|c| grid.is_water(*c)));
        assert!(path.cost > path.lower_bound);
    }

    #[test]
    fn disconnected_water_has_no_path() {
        let grid = grid_from_rows(&["~~#~~"]);
        let search = MarineSearch::new(&grid, CostLayers::default(), SearchConfig::default());
        let err = search.find_path(at(0, 0), at(0, 4), &CancelToken::new()).unwrap_err();
        assert!(matches!(err, SearchError::PathNotFound { .. }));
    }

    #[test]
    fn repeated_searches_are_identical() {
        let grid = open_water(20, 20);
        let search = MarineSearch::new(&grid, CostLayers::default(), SearchConfig::default());
        let a = search.find_path(at(0, 0), at(13, 19), &CancelToken::new()).unwrap();
        let b = search.find_path(at(0, 0), at(13, 19), &CancelToken::new()).unwrap();
        assert_eq!(a.cells, b.cells);
        assert_eq!(a.geometry, b.geometry);
        assert_eq!(a.cost.to_bits(), b.cost.to_bits());
        assert_eq!(a.expanded, b.expanded);
    }
}

// ── Cost layers ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod layers {
    use nav_core::{CancelToken, GeoPoint, SearchConfig, Timestamp, WeatherConfig};
    use nav_grid::{CellIndex, DepthMap, RestrictedZone, RestrictedZones};
    use nav_weather::{WeatherCostModel, WeatherSample};

    use super::helpers::{at, grid_from_rows, open_water};
    use crate::{CostLayers, MarineSearch, SearchError};

    fn fine_weather(samples: &[WeatherSample]) -> WeatherCostModel {
        let config = WeatherConfig { cell_size_deg: 0.01, ..WeatherConfig::default() };
        let mut model = WeatherCostModel::new(config);
        model.ingest(samples, Timestamp::EPOCH);
        model
    }

    fn sample(p: GeoPoint, wave_height_m: f64) -> WeatherSample {
        WeatherSample { location: p, wave_height_m, wind_speed_kmh: 5.0, visibility_m: 10_000.0 }
    }

    #[test]
    fn blocked_weather_cell_is_a_wall() {
        let grid = grid_from_rows(&["~~~~~"]);
        let weather = fine_weather(&[sample(at(0, 2), 3.5)]);
        let layers = CostLayers { weather: Some(&weather), ..CostLayers::default() };
        let search = MarineSearch::new(&grid, layers, SearchConfig::default());
        let err = search.find_path(at(0, 0), at(0, 4), &CancelToken::new()).unwrap_err();
        assert!(matches!(err, SearchError::PathNotFound { .. }));
    }

    #[test]
    fn caution_weather_doubles_step_cost() {
        let grid = grid_from_rows(&["~~~~~"]);
        let weather = fine_weather(&[sample(at(0, 2), 1.5)]);
        let layers = CostLayers { weather: Some(&weather), ..CostLayers::default() };
        let search = MarineSearch::new(&grid, layers, SearchConfig::default());
        let path = search.find_path(at(0, 0), at(0, 4), &CancelToken::new()).unwrap();
        assert!((path.cost - 5.0).abs() < 1e-9);
    }

    #[test]
    fn shallow_water_adds_inverse_depth() {
        let grid = grid_from_rows(&["~~~~~"]);
        let mut depth = DepthMap::for_grid(&grid);
        depth.set(CellIndex::new(0, 2), 0.5);
        let layers = CostLayers { depth: Some(&depth), ..CostLayers::default() };
        let search = MarineSearch::new(&grid, layers, SearchConfig::default());
        let path = search.find_path(at(0, 0), at(0, 4), &CancelToken::new()).unwrap();
        assert!((path.cost - 6.0).abs() < 1e-9);
    }

    #[test]
    fn restricted_zone_is_avoided_when_possible() {
        let grid = open_water(5, 3);
        let zone = RestrictedZone::new(
            "firing range",
            vec![
                GeoPoint::new(26.012, 50.512),
                GeoPoint::new(26.012, 50.538),
                GeoPoint::new(26.018, 50.538),
                GeoPoint::new(26.018, 50.512),
            ],
        );
        let zones = RestrictedZones::new(vec![zone]);
        let layers = CostLayers { zones: Some(&zones), ..CostLayers::default() };
        let search = MarineSearch::new(&grid, layers, SearchConfig::default());
        let path = search.find_path(at(1, 0), at(1, 4), &CancelToken::new()).unwrap();

        assert!(path.cells.iter().all(|c| c.row != 1 || c.col == 0 || c.col == 4));
        let expected = 2.0 + 2.0 * std::f64::consts::SQRT_2;
        assert!((path.cost - expected).abs() < 1e-9);
    }

    #[test]
    fn zone_penalty_paid_when_unavoidable() {
        let grid = grid_from_rows(&["~~~~~"]);
        let zone = RestrictedZone::new(
            "anchorage",
            vec![
                GeoPoint::new(26.001, 50.521),
                GeoPoint::new(26.001, 50.529),
                GeoPoint::new(26.009, 50.529),
                GeoPoint::new(26.009, 50.521),
            ],
        )
        .with_penalty(10.0);
        let zones = RestrictedZones::new(vec![zone]);
        let layers = CostLayers { zones: Some(&zones), ..CostLayers::default() };
        let search = MarineSearch::new(&grid, layers, SearchConfig::default());
        let path = search.find_path(at(0, 0), at(0, 4), &CancelToken::new()).unwrap();
        assert!((path.cost - 14.0).abs() < 1e-9);
    }
}

// ── Budgets ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod budget {
    use nav_core::{CancelToken, SearchConfig};

    use super::helpers::{at, open_water};
    use crate::{CostLayers, MarineSearch, SearchError};

    #[test]
    fn iteration_cap_gives_path_not_found() {
        let grid = open_water(10, 10);
        let config = SearchConfig { max_iterations: 3, ..SearchConfig::default() };
        let search = MarineSearch::new(&grid, CostLayers::default(), config);
        let err = search.find_path(at(0, 0), at(9, 9), &CancelToken::new()).unwrap_err();
        assert!(matches!(err, SearchError::PathNotFound { expanded: 4 }));
    }

    #[test]
    fn zero_budget_times_out() {
        let grid = open_water(10, 10);
        let config = SearchConfig { timeout_ms: 0, check_interval: 1, ..SearchConfig::default() };
        let search = MarineSearch::new(&grid, CostLayers::default(), config);
        let err = search.find_path(at(0, 0), at(9, 9), &CancelToken::new()).unwrap_err();
        assert!(matches!(err, SearchError::Timeout { budget_ms: 0 }));
    }

    #[test]
    fn cancelled_token_aborts() {
        let grid = open_water(10, 10);
        let search = MarineSearch::new(&grid, CostLayers::default(), SearchConfig::default());
        let token = CancelToken::new();
        token.cancel();
        let err = search.find_path(at(0, 0), at(9, 9), &token).unwrap_err();
        assert!(matches!(err, SearchError::Cancelled));
    }
}

// ── Optimality ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod optimality {
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;

    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use nav_core::{CancelToken, SearchConfig};
    use nav_grid::{CellIndex, MaskMetadata, NavigabilityGrid};

    use super::helpers::{at, MIN_LAT, MIN_LON, RES};
    use crate::{CostLayers, MarineSearch, SearchError};

    #[derive(PartialEq)]
    struct Cost(f64);
    impl Eq for Cost {}
    impl PartialOrd for Cost {
        fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
            Some(self.cmp(other))
        }
    }
    impl Ord for Cost {
        fn cmp(&self, other: &Self) -> std::cmp::Ordering {
            self.0.total_cmp(&other.0)
        }
    }

    /// Plain uniform-cost search as a reference.
    fn dijkstra(grid: &NavigabilityGrid, from: CellIndex, to: CellIndex) -> Option<f64> {
        let mut dist = vec![f64::INFINITY; grid.cell_count()];
        let mut heap = BinaryHeap::new();
        dist[grid.linear_index(from)] = 0.0;
        heap.push(Reverse((Cost(0.0), grid.linear_index(from))));

        while let Some(Reverse((Cost(d), idx))) = heap.pop() {
            if idx == grid.linear_index(to) {
                return Some(d);
            }
            if d > dist[idx] {
                continue;
            }
            for (next, diagonal) in grid.neighbors(grid.cell_at(idx)) {
                if !grid.is_water(next) {
                    continue;
                }
                let nd = d + if diagonal { std::f64::consts::SQRT_2 } else { 1.0 };
                let ni = grid.linear_index(next);
                if nd < dist[ni] {
                    dist[ni] = nd;
                    heap.push(Reverse((Cost(nd), ni)));
                }
            }
        }
        None
    }

    #[test]
    fn matches_uniform_cost_search_on_random_masks() {
        const SIZE: usize = 14;
        for seed in 0..40u64 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut bytes: Vec<u8> = (0..SIZE * SIZE).map(|_| u8::from(rng.gen_bool(0.7))).collect();
            bytes[0] = 1;
            bytes[SIZE * SIZE - 1] = 1;
            let meta = MaskMetadata::from_origin(MIN_LAT, MIN_LON, RES, SIZE, SIZE);
            let grid = NavigabilityGrid::initialize(&bytes, meta).unwrap();

            let from = CellIndex::new(0, 0);
            let to = CellIndex::new(SIZE - 1, SIZE - 1);
            let search = MarineSearch::new(&grid, CostLayers::default(), SearchConfig::default());
            let result = search.find_path(at(0, 0), at(SIZE - 1, SIZE - 1), &CancelToken::new());

            match (dijkstra(&grid, from, to), result) {
                (Some(best), Ok(path)) => {
                    assert!((best - path.cost).abs() < 1e-9, "seed {seed}: {best} vs {}", path.cost);
                    assert!(path.lower_bound <= path.cost + 1e-9);
                }
                (None, Err(SearchError::PathNotFound { .. })) => {}
                (expected, got) => panic!("seed {seed}: reference {expected:?}, search {got:?}"),
            }
        }
    }
}

// ── Simplification ────────────────────────────────────────────────────────────

#[cfg(test)]
mod simplify {
    use nav_core::GeoPoint;

    use crate::simplify;

    #[test]
    fn short_inputs_unchanged() {
        let pts = vec![GeoPoint::new(26.0, 50.5), GeoPoint::new(26.1, 50.6)];
        assert_eq!(simplify(&pts, 0.001), pts);
        assert!(simplify(&[], 0.001).is_empty());
    }

    #[test]
    fn collinear_points_collapse() {
        let pts: Vec<GeoPoint> = (0..10).map(|i| GeoPoint::new(26.0 + i as f64 * 0.01, 50.5)).collect();
        let out = simplify(&pts, 0.001);
        assert_eq!(out, vec![pts[0], pts[9]]);
    }

    #[test]
    fn corner_is_kept() {
        let pts = vec![
            GeoPoint::new(26.00, 50.50),
            GeoPoint::new(26.01, 50.50),
            GeoPoint::new(26.02, 50.50),
            GeoPoint::new(26.02, 50.51),
            GeoPoint::new(26.02, 50.52),
        ];
        let out = simplify(&pts, 0.001);
        assert_eq!(out, vec![pts[0], pts[2], pts[4]]);
    }

    #[test]
    fn deviation_below_tolerance_dropped() {
        let pts = vec![
            GeoPoint::new(26.0, 50.50),
            GeoPoint::new(26.0005, 50.51),
            GeoPoint::new(26.0, 50.52),
        ];
        assert_eq!(simplify(&pts, 0.001).len(), 2);
        assert_eq!(simplify(&pts, 0.0001).len(), 3);
    }
}

//! The weather cost layer consumed by the marine search.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use nav_core::{GeoPoint, Timestamp, WeatherConfig};

use crate::{Severity, WeatherProvider, WeatherResult};

// ── WeatherSample ─────────────────────────────────────────────────────────────

/// One coarse observation/forecast, keyed by the cell containing `location`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WeatherSample {
    pub location: GeoPoint,
    pub wave_height_m: f64,
    pub wind_speed_kmh: f64,
    pub visibility_m: f64,
}

impl WeatherSample {
    /// The worst of the three per-metric classifications.
    pub fn severity(&self) -> Severity {
        Severity::from_wave_height(self.wave_height_m)
            .max(Severity::from_wind_speed(self.wind_speed_kmh))
            .max(Severity::from_visibility(self.visibility_m))
    }
}

// ── WeatherCost ───────────────────────────────────────────────────────────────

/// What the search should do with a cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum WeatherCost {
    /// Step cost is scaled by this factor (≥ 1).
    Multiplier(f64),
    /// The cell is an obstacle.
    Blocked,
}

// ── WeatherCostModel ──────────────────────────────────────────────────────────

/// Severity per coarse cell, refreshed on a fixed interval.
///
/// Coarse cells form a global lattice anchored at (0°, 0°) with edge
/// `config.cell_size_deg`.  The model is plain data: holders that share it
/// between threads clone it, refresh the clone, and swap it in.
#[derive(Clone, Debug)]
pub struct WeatherCostModel {
    config: WeatherConfig,
    cells: FxHashMap<(i64, i64), Severity>,
    last_refresh: Option<Timestamp>,
}

impl WeatherCostModel {
    /// A model with no samples: every cell is `Normal`.
    pub fn new(config: WeatherConfig) -> Self {
        Self { config, cells: FxHashMap::default(), last_refresh: None }
    }

    #[inline]
    fn key(&self, p: GeoPoint) -> (i64, i64) {
        let size = self.config.cell_size_deg;
        ((p.lat / size).floor() as i64, (p.lon / size).floor() as i64)
    }

    /// Replace all samples.  When several samples land in the same coarse
    /// cell the worst severity wins.
    pub fn ingest(&mut self, samples: &[WeatherSample], now: Timestamp) {
        self.cells.clear();
        for s in samples {
            let key = self.key(s.location);
            let severity = s.severity();
            self.cells
                .entry(key)
                .and_modify(|cur| *cur = (*cur).max(severity))
                .or_insert(severity);
        }
        self.last_refresh = Some(now);
        debug!(
            samples = samples.len(),
            blocked = self.cells.values().filter(|s| **s == Severity::Blocked).count(),
            "weather samples ingested"
        );
    }

    /// Severity at `p`; `Normal` where no sample exists.
    pub fn severity_at(&self, p: GeoPoint) -> Severity {
        self.cells.get(&self.key(p)).copied().unwrap_or_default()
    }

    /// Search cost for entering the cell containing `p`.
    pub fn cost_at(&self, p: GeoPoint) -> WeatherCost {
        match self.severity_at(p).multiplier() {
            Some(m) => WeatherCost::Multiplier(m),
            None    => WeatherCost::Blocked,
        }
    }

    pub fn last_refresh(&self) -> Option<Timestamp> {
        self.last_refresh
    }

    pub fn sampled_cells(&self) -> usize {
        self.cells.len()
    }

    /// `true` if the model has never been filled or the refresh interval has
    /// elapsed since the last fill.
    pub fn is_due(&self, now: Timestamp) -> bool {
        match self.last_refresh {
            None => true,
            Some(t) => now.millis_since(t) >= self.config.refresh_interval_secs * 1_000,
        }
    }

    /// Fetch and ingest new samples if a refresh is due.
    ///
    /// Returns `Ok(true)` when samples were replaced.  A provider failure
    /// keeps the previous samples in place and is returned to the caller.
    pub fn refresh_if_due(
        &mut self,
        provider: &dyn WeatherProvider,
        now: Timestamp,
    ) -> WeatherResult<bool> {
        if !self.is_due(now) {
            return Ok(false);
        }
        match provider.fetch() {
            Ok(samples) => {
                self.ingest(&samples, now);
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "weather refresh failed; keeping previous samples");
                Err(e)
            }
        }
    }
}

//! Navigation configuration.
//!
//! # Design
//!
//! There is no module-level state anywhere in the workspace.  Every tunable
//! lives in one immutable [`NavConfig`] value that the application builds
//! (or loads from JSON with the `serde` feature) and passes into each
//! component at construction.  Components keep a copy of their own section.
//!
//! Every section implements `Default` with the documented production values,
//! so a partially specified JSON file only overrides what it names.

use crate::{NavError, NavResult};

// ── SearchConfig ──────────────────────────────────────────────────────────────

/// Tunables for the marine A* search.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Node expansions before the search gives up with `PathNotFound`.
    pub max_iterations: usize,

    /// Wall-clock budget in milliseconds before failing with `Timeout`.
    pub timeout_ms: u64,

    /// Weight of the `1 / depth` shallow-water term.  Zero disables it.
    pub depth_weight: f64,

    /// Cost added for entering a cell inside a restricted zone (per zone,
    /// unless the zone carries its own penalty).
    pub restricted_penalty: f64,

    /// Douglas–Peucker tolerance in degrees (~100 m at 26° N).
    pub simplify_tolerance_deg: f64,

    /// Expansions between checks of the clock and the cancellation token.
    pub check_interval: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_iterations:         100_000,
            timeout_ms:             10_000,
            depth_weight:           1.0,
            restricted_penalty:     50.0,
            simplify_tolerance_deg: 0.001,
            check_interval:         256,
        }
    }
}

// ── WeatherConfig ─────────────────────────────────────────────────────────────

/// Tunables for the weather cost layer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WeatherConfig {
    /// Edge length of one coarse weather cell in degrees.
    pub cell_size_deg: f64,

    /// Seconds between sample refreshes.  Default: 900 (15 minutes).
    pub refresh_interval_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            cell_size_deg:         0.2,
            refresh_interval_secs: 15 * 60,
        }
    }
}

// ── RouteConfig ───────────────────────────────────────────────────────────────

/// Tunables for hybrid route assembly.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RouteConfig {
    /// Radius around a land endpoint searched for a transfer marina, metres.
    pub marina_search_radius_m: f64,

    /// Nominal boat speed used to turn marine distance into duration.
    /// Default 5.14 m/s ≈ 10 knots.
    pub boat_speed_mps: f64,

    /// Minimum heading change that produces a `turn` waypoint, degrees.
    pub turn_threshold_deg: f64,

    /// Maximum gap between one segment's end and the next one's start, metres.
    pub segment_join_tolerance_m: f64,

    /// Radius searched from a marina for its launch point into open water.
    pub marina_water_radius_m: f64,

    /// Whether `private` marinas may serve as transfer points.
    pub allow_private_marinas: bool,

    /// Samples per polyline leg when validating segments against the mask.
    pub samples_per_leg: usize,

    /// Largest share of a land leg's samples that may fall on open water
    /// before the leg is rejected in favour of a boat crossing.
    pub max_land_water_fraction: f64,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            marina_search_radius_m:   5_000.0,
            boat_speed_mps:           5.14,
            turn_threshold_deg:       30.0,
            segment_join_tolerance_m: 5.0,
            marina_water_radius_m:    2_000.0,
            allow_private_marinas:    false,
            samples_per_leg:          10,
            max_land_water_fraction:  0.25,
        }
    }
}

// ── SessionConfig ─────────────────────────────────────────────────────────────

/// Tunables for live navigation sessions.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Expected spacing of location updates, milliseconds.
    pub update_interval_ms: u64,

    /// Distance at which the next waypoint counts as reached, metres.
    pub waypoint_proximity_m: f64,

    /// Distance from the route geometry beyond which the traveler is off-route.
    pub off_route_threshold_m: f64,

    /// Automatic recalculations allowed per session.
    pub max_recalculations: u32,

    /// Maximum breadcrumb trail length (oldest evicted first).
    pub breadcrumb_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            update_interval_ms:    1_000,
            waypoint_proximity_m:  20.0,
            off_route_threshold_m: 50.0,
            max_recalculations:    5,
            breadcrumb_capacity:   1_000,
        }
    }
}

// ── NavConfig ─────────────────────────────────────────────────────────────────

/// Top-level configuration passed to every component.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavConfig {
    pub search:  SearchConfig,
    pub weather: WeatherConfig,
    pub route:   RouteConfig,
    pub session: SessionConfig,
}

impl NavConfig {
    /// Reject values that would make a component misbehave silently.
    pub fn validate(&self) -> NavResult<()> {
        let s = &self.search;
        if s.max_iterations == 0 {
            return Err(config_err("search.max_iterations must be > 0"));
        }
        if s.check_interval == 0 {
            return Err(config_err("search.check_interval must be > 0"));
        }
        if s.depth_weight < 0.0 || s.restricted_penalty < 0.0 {
            // Negative terms would break heuristic admissibility.
            return Err(config_err("search cost terms must be non-negative"));
        }
        if s.simplify_tolerance_deg < 0.0 {
            return Err(config_err("search.simplify_tolerance_deg must be >= 0"));
        }

        if self.weather.cell_size_deg <= 0.0 {
            return Err(config_err("weather.cell_size_deg must be > 0"));
        }

        let r = &self.route;
        if r.boat_speed_mps <= 0.0 {
            return Err(config_err("route.boat_speed_mps must be > 0"));
        }
        if r.marina_search_radius_m <= 0.0 || r.marina_water_radius_m < 0.0 {
            return Err(config_err("route search radii must be positive"));
        }
        if r.samples_per_leg == 0 {
            return Err(config_err("route.samples_per_leg must be > 0"));
        }
        if !(0.0..=1.0).contains(&r.max_land_water_fraction) {
            return Err(config_err("route.max_land_water_fraction must be within 0..=1"));
        }

        let n = &self.session;
        if n.breadcrumb_capacity == 0 {
            return Err(config_err("session.breadcrumb_capacity must be > 0"));
        }
        if n.waypoint_proximity_m <= 0.0 || n.off_route_threshold_m <= 0.0 {
            return Err(config_err("session distance thresholds must be > 0"));
        }
        Ok(())
    }
}

fn config_err(msg: &str) -> NavError {
    NavError::Config(msg.to_owned())
}

//! Land-routing collaborator contract.
//!
//! The road network lives outside this workspace.  The assembler only needs
//! an ordered polyline and a duration for each land leg, so any service
//! (an OSRM client, a cached table, a test double) can sit behind
//! [`LandRouter`].

use nav_core::{geo::polyline_length_m, GeoPoint, TransportMode};

use crate::{RouteError, RouteResult};

/// A land sub-route as returned by the collaborator.
#[derive(Clone, Debug)]
pub struct LandRoute {
    pub polyline:   Vec<GeoPoint>,
    pub duration_s: f64,
    pub mode:       TransportMode,
}

/// Pluggable land routing.
///
/// Implementations must be `Send + Sync`: route computations run on worker
/// threads.  Any failure is reported by the assembler as `RouteUnreachable`.
pub trait LandRouter: Send + Sync {
    fn route(&self, from: GeoPoint, to: GeoPoint, mode: TransportMode) -> RouteResult<LandRoute>;
}

/// Great-circle fallback: a straight two-point polyline travelled at the
/// mode's nominal speed (car 13.9 m/s, walk 1.4 m/s, bike 4.2 m/s).
#[derive(Copy, Clone, Debug, Default)]
pub struct DirectLandRouter;

impl LandRouter for DirectLandRouter {
    fn route(&self, from: GeoPoint, to: GeoPoint, mode: TransportMode) -> RouteResult<LandRoute> {
        if mode.is_marine() {
            return Err(RouteError::RouteUnreachable(format!("{mode} is not a land mode")));
        }
        let polyline = vec![from, to];
        let duration_s = polyline_length_m(&polyline) / mode.nominal_speed_mps();
        Ok(LandRoute { polyline, duration_s, mode })
    }
}

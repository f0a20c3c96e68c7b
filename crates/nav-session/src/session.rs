//! The navigation session record.
//!
//! Fields are readable by anyone holding the session; only the owning
//! [`SessionEngine`](crate::SessionEngine) writes them.

use std::collections::VecDeque;
use std::sync::Arc;

use nav_core::{GeoPoint, RouteId, SessionId, Timestamp};
use nav_route::{NavigationRoute, RouteRequest};

use crate::NavigationState;

// ── Breadcrumbs ───────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Breadcrumb {
    pub location:  GeoPoint,
    pub timestamp: Timestamp,
}

// ── Metrics ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavigationMetrics {
    pub distance_traveled_m: f64,
    pub elapsed_s:           f64,
    /// Recalculation attempts started, successful or not.
    pub recalculations:      u32,
    pub off_route:           bool,
    pub max_speed_mps:       f64,
}

// ── Summary ───────────────────────────────────────────────────────────────────

/// Snapshot kept when a session is archived.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSummary {
    pub id:          SessionId,
    pub state:       NavigationState,
    pub route_id:    Option<RouteId>,
    pub metrics:     NavigationMetrics,
    pub breadcrumbs: usize,
    pub start_time:  Option<Timestamp>,
    pub end_time:    Option<Timestamp>,
}

// ── NavigationSession ─────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct NavigationSession {
    pub(crate) id:                     SessionId,
    /// `None` until the first plan succeeds.
    pub(crate) route:                  Option<Arc<NavigationRoute>>,
    pub(crate) request:                RouteRequest,
    pub(crate) state:                  NavigationState,
    pub(crate) current_location:       Option<GeoPoint>,
    pub(crate) current_bearing:        Option<f64>,
    pub(crate) current_speed_mps:      Option<f64>,
    pub(crate) current_segment_index:  usize,
    /// The waypoint being headed for.
    pub(crate) current_waypoint_index: usize,
    pub(crate) start_time:             Option<Timestamp>,
    pub(crate) end_time:               Option<Timestamp>,
    pub(crate) breadcrumbs:            VecDeque<Breadcrumb>,
    pub(crate) breadcrumb_capacity:    usize,
    pub(crate) metrics:                NavigationMetrics,
}

impl NavigationSession {
    pub(crate) fn new(id: SessionId, request: RouteRequest, breadcrumb_capacity: usize) -> Self {
        Self {
            id,
            route: None,
            request,
            state: NavigationState::Planning,
            current_location: None,
            current_bearing: None,
            current_speed_mps: None,
            current_segment_index: 0,
            current_waypoint_index: 0,
            start_time: None,
            end_time: None,
            breadcrumbs: VecDeque::with_capacity(breadcrumb_capacity.min(1_024)),
            breadcrumb_capacity,
            metrics: NavigationMetrics::default(),
        }
    }

    /// Install `route` and point progress at its first leg.
    pub(crate) fn set_route(&mut self, route: Arc<NavigationRoute>) {
        self.current_segment_index = 0;
        self.current_waypoint_index = route.waypoints.len().min(2).saturating_sub(1);
        self.route = Some(route);
    }

    /// Append a position, evicting the oldest once full.
    pub(crate) fn push_breadcrumb(&mut self, crumb: Breadcrumb) {
        if self.breadcrumb_capacity == 0 {
            return;
        }
        while self.breadcrumbs.len() >= self.breadcrumb_capacity {
            self.breadcrumbs.pop_front();
        }
        self.breadcrumbs.push_back(crumb);
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn route(&self) -> Option<&Arc<NavigationRoute>> {
        self.route.as_ref()
    }

    /// The request the session was planned from; recalculations keep its
    /// destination.
    pub fn request(&self) -> &RouteRequest {
        &self.request
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn current_location(&self) -> Option<GeoPoint> {
        self.current_location
    }

    pub fn current_bearing(&self) -> Option<f64> {
        self.current_bearing
    }

    pub fn current_speed_mps(&self) -> Option<f64> {
        self.current_speed_mps
    }

    pub fn current_segment_index(&self) -> usize {
        self.current_segment_index
    }

    pub fn current_waypoint_index(&self) -> usize {
        self.current_waypoint_index
    }

    pub fn start_time(&self) -> Option<Timestamp> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<Timestamp> {
        self.end_time
    }

    pub fn breadcrumbs(&self) -> &VecDeque<Breadcrumb> {
        &self.breadcrumbs
    }

    pub fn metrics(&self) -> &NavigationMetrics {
        &self.metrics
    }

    /// Distance left to the destination along a straight line, metres.
    pub fn distance_to_destination_m(&self) -> Option<f64> {
        let destination = self.route.as_ref()?.destination;
        self.current_location.map(|p| p.distance_m(destination))
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id:          self.id,
            state:       self.state.clone(),
            route_id:    self.route.as_ref().map(|r| r.id),
            metrics:     self.metrics.clone(),
            breadcrumbs: self.breadcrumbs.len(),
            start_time:  self.start_time,
            end_time:    self.end_time,
        }
    }
}

//! The session engine: single writer of one navigation session.
//!
//! # Recalculation
//!
//! An off-route update starts one background plan from the current position
//! to the original destination and bumps the attempt counter.  Until that
//! plan reports back, later updates are still recorded (breadcrumbs,
//! metrics) but neither advance waypoints against the stale route nor start
//! another plan.  Results are tagged with a generation number so a late
//! answer to a superseded request is dropped.
//!
//! A result replaces the route only if the session is still `Active` when
//! it is applied.  A failed plan leaves the session `Active`; the next
//! off-route update tries again while attempts remain.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info, warn};

use nav_core::{
    geo::distance_to_polyline_m, CancelToken, GeoPoint, SessionConfig, SessionId, Timestamp,
};
use nav_route::{NavigationRoute, RouteError, RoutePlanner, RouteRequest, RouteResult};

use crate::{
    Breadcrumb, ErrorReason, NavigationSession, NavigationState, RayonSpawner, SessionEvent,
    SessionResult, SessionSummary, TaskSpawner,
};

// ── Inputs and outputs ────────────────────────────────────────────────────────

/// One position fix from the traveler's device.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LocationUpdate {
    pub location:    GeoPoint,
    pub timestamp:   Timestamp,
    /// Device-reported heading; derived from consecutive fixes when absent.
    pub bearing_deg: Option<f64>,
    /// Device-reported speed; derived from consecutive fixes when absent.
    pub speed_mps:   Option<f64>,
}

impl LocationUpdate {
    pub fn new(location: GeoPoint, timestamp: Timestamp) -> Self {
        Self { location, timestamp, bearing_deg: None, speed_mps: None }
    }
}

/// What a single update did.
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateOutcome {
    /// The session was not `Active`, or the fix had non-finite
    /// coordinates; nothing recorded.
    Ignored,
    OnRoute,
    /// Progress moved past the waypoint at this index.
    WaypointReached(usize),
    /// Recorded only; a recalculation is still running.
    AwaitingRecalculation,
    /// Off-route; a new recalculation was started.
    Recalculating,
    Arrived,
    Failed(ErrorReason),
}

// ── Background plumbing ───────────────────────────────────────────────────────

struct Pending {
    generation: u64,
    cancel:     CancelToken,
}

struct RecalcOutcome {
    generation: u64,
    result:     RouteResult<NavigationRoute>,
}

// ── SessionEngine ─────────────────────────────────────────────────────────────

pub struct SessionEngine {
    session:    NavigationSession,
    config:     SessionConfig,
    planner:    Arc<dyn RoutePlanner>,
    spawner:    Arc<dyn TaskSpawner>,
    results_tx: Sender<RecalcOutcome>,
    results_rx: Receiver<RecalcOutcome>,
    pending:    Option<Pending>,
    generation: u64,
}

impl SessionEngine {
    /// A session in `Planning` for `request`.
    pub fn new(
        id: SessionId,
        request: RouteRequest,
        planner: Arc<dyn RoutePlanner>,
        config: SessionConfig,
    ) -> Self {
        let (results_tx, results_rx) = unbounded();
        Self {
            session: NavigationSession::new(id, request, config.breadcrumb_capacity),
            config,
            planner,
            spawner: Arc::new(RayonSpawner),
            results_tx,
            results_rx,
            pending: None,
            generation: 0,
        }
    }

    /// Run recalculations on `spawner` instead of the rayon pool.
    pub fn with_spawner(mut self, spawner: Arc<dyn TaskSpawner>) -> Self {
        self.spawner = spawner;
        self
    }

    pub fn session(&self) -> &NavigationSession {
        &self.session
    }

    pub fn state(&self) -> &NavigationState {
        &self.session.state
    }

    pub fn has_pending_recalculation(&self) -> bool {
        self.pending.is_some()
    }

    fn apply(&mut self, event: SessionEvent) -> SessionResult<()> {
        let next = self.session.state.transition(event)?;
        info!(
            session = %self.session.id,
            from = self.session.state.as_str(),
            to = %next,
            "session state changed"
        );
        self.session.state = next;
        Ok(())
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Compute the initial route on the calling thread.
    ///
    /// A planner failure is not returned as an error: the session moves to
    /// `Error(RouteUnreachable)` and the caller inspects the state.
    pub fn plan(&mut self, cancel: &CancelToken) -> SessionResult<()> {
        if self.session.state != NavigationState::Planning {
            return Err(crate::SessionError::InvalidTransition {
                from: self.session.state.as_str(),
                event: SessionEvent::RouteReady.name(),
            });
        }
        match self.planner.plan(&self.session.request, cancel) {
            Ok(route) => self.accept_route(route),
            Err(e) => {
                warn!(session = %self.session.id, error = %e, "initial plan failed");
                self.apply(SessionEvent::PlanFailed(e.to_string()))
            }
        }
    }

    /// Use an already assembled route: `Planning → Ready`.
    pub fn accept_route(&mut self, route: NavigationRoute) -> SessionResult<()> {
        self.apply(SessionEvent::RouteReady)?;
        self.session.set_route(Arc::new(route));
        Ok(())
    }

    /// `Ready → Active`.
    pub fn start(&mut self, now: Timestamp) -> SessionResult<()> {
        self.apply(SessionEvent::Start)?;
        self.session.start_time = Some(now);
        Ok(())
    }

    pub fn pause(&mut self) -> SessionResult<()> {
        self.apply(SessionEvent::Pause)
    }

    pub fn resume(&mut self) -> SessionResult<()> {
        self.apply(SessionEvent::Resume)
    }

    /// Any non-terminal state → `Cancelled`.  A running recalculation is
    /// told to stop.
    pub fn cancel(&mut self, now: Timestamp) -> SessionResult<()> {
        self.apply(SessionEvent::Cancel)?;
        if let Some(pending) = self.pending.take() {
            pending.cancel.cancel();
        }
        self.session.end_time = Some(now);
        Ok(())
    }

    // ── Location updates ──────────────────────────────────────────────────

    /// Process one fix.  Updates must be delivered in order from a single
    /// producer.
    pub fn on_location(&mut self, update: LocationUpdate) -> SessionResult<UpdateOutcome> {
        self.poll_recalculation();

        if !self.session.state.is_active() {
            return Ok(UpdateOutcome::Ignored);
        }
        let Some(route) = self.session.route.clone() else {
            return Ok(UpdateOutcome::Ignored);
        };

        let p = update.location;
        let now = update.timestamp;
        if !p.is_finite() {
            warn!(session = %self.session.id, lat = p.lat, lon = p.lon, "non-finite fix dropped");
            return Ok(UpdateOutcome::Ignored);
        }
        self.record_motion(update);

        if self.pending.is_some() {
            return Ok(UpdateOutcome::AwaitingRecalculation);
        }

        // ── Off-route check ───────────────────────────────────────────────
        let deviation = distance_to_polyline_m(p, &route.geometry).unwrap_or(f64::INFINITY);
        if deviation > self.config.off_route_threshold_m {
            self.session.metrics.off_route = true;
            if self.session.metrics.recalculations < self.config.max_recalculations {
                self.start_recalculation(p, deviation);
                return Ok(UpdateOutcome::Recalculating);
            }
            warn!(
                session = %self.session.id,
                deviation_m = deviation,
                attempts = self.session.metrics.recalculations,
                "still off route after the last allowed recalculation"
            );
            let reason = ErrorReason::RecalculationLimitExceeded;
            self.apply(SessionEvent::Fail(reason.clone()))?;
            self.session.end_time = Some(now);
            return Ok(UpdateOutcome::Failed(reason));
        }
        self.session.metrics.off_route = false;

        // ── Waypoint progress (forward only) ──────────────────────────────
        let proximity = self.config.waypoint_proximity_m;
        let last = route.waypoints.len().saturating_sub(1);
        let mut reached = None;

        while let Some(target) = route.waypoints.get(self.session.current_waypoint_index) {
            if p.distance_m(target.location) > proximity {
                break;
            }
            let index = self.session.current_waypoint_index;
            self.session.current_segment_index = target.segment_index;
            reached = Some(index);
            debug!(session = %self.session.id, waypoint = index, kind = ?target.kind, "waypoint reached");

            if index >= last {
                return self.arrive(now);
            }
            self.session.current_waypoint_index += 1;
        }

        if route.waypoints.is_empty() && p.distance_m(route.destination) <= proximity {
            return self.arrive(now);
        }

        Ok(reached.map_or(UpdateOutcome::OnRoute, UpdateOutcome::WaypointReached))
    }

    fn record_motion(&mut self, update: LocationUpdate) {
        let s = &mut self.session;
        let p = update.location;

        let mut derived_speed = None;
        let mut derived_bearing = None;
        if let Some(prev) = s.breadcrumbs.back() {
            let step = prev.location.distance_m(p);
            s.metrics.distance_traveled_m += step;
            let dt = update.timestamp.secs_since(prev.timestamp);
            if dt > 0.0 {
                derived_speed = Some(step / dt);
            }
            if step > 0.0 {
                derived_bearing = Some(prev.location.bearing_deg(p));
            }
        }

        s.current_location = Some(p);
        let speed = update.speed_mps.filter(|v| v.is_finite());
        let bearing = update.bearing_deg.filter(|v| v.is_finite());
        s.current_speed_mps = speed.or(derived_speed);
        s.current_bearing = bearing.or(derived_bearing).or(s.current_bearing);
        if let Some(speed) = s.current_speed_mps {
            s.metrics.max_speed_mps = s.metrics.max_speed_mps.max(speed);
        }
        if let Some(start) = s.start_time {
            s.metrics.elapsed_s = update.timestamp.secs_since(start);
        }
        s.push_breadcrumb(Breadcrumb { location: p, timestamp: update.timestamp });
    }

    fn arrive(&mut self, now: Timestamp) -> SessionResult<UpdateOutcome> {
        self.apply(SessionEvent::Arrive)?;
        self.session.end_time = Some(now);
        info!(
            session = %self.session.id,
            distance_m = self.session.metrics.distance_traveled_m,
            elapsed_s = self.session.metrics.elapsed_s,
            recalculations = self.session.metrics.recalculations,
            "destination reached"
        );
        Ok(UpdateOutcome::Arrived)
    }

    // ── Recalculation ─────────────────────────────────────────────────────

    fn start_recalculation(&mut self, from: GeoPoint, deviation_m: f64) {
        self.generation += 1;
        let generation = self.generation;
        let cancel = CancelToken::new();

        self.session.metrics.recalculations += 1;
        self.pending = Some(Pending { generation, cancel: cancel.clone() });
        info!(
            session = %self.session.id,
            deviation_m,
            attempt = self.session.metrics.recalculations,
            max = self.config.max_recalculations,
            "off route; recalculating"
        );

        let request = self.session.request.from_position(from);
        let planner = Arc::clone(&self.planner);
        let tx = self.results_tx.clone();
        self.spawner.spawn(Box::new(move || {
            let result = planner.plan(&request, &cancel);
            // The engine may have been dropped; the result is moot then.
            let _ = tx.send(RecalcOutcome { generation, result });
        }));
    }

    /// Apply every finished recalculation.  Returns `true` if the route was
    /// replaced.
    pub fn poll_recalculation(&mut self) -> bool {
        let mut replaced = false;
        while let Ok(outcome) = self.results_rx.try_recv() {
            replaced |= self.apply_outcome(outcome);
        }
        replaced
    }

    /// Block up to `timeout` for the pending recalculation.  Returns `true`
    /// if it finished and replaced the route.
    pub fn wait_for_recalculation(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.pending.is_some() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.results_rx.recv_timeout(remaining) {
                Ok(outcome) => {
                    if self.apply_outcome(outcome) {
                        return true;
                    }
                }
                Err(_) => return false,
            }
        }
        false
    }

    fn apply_outcome(&mut self, outcome: RecalcOutcome) -> bool {
        match &self.pending {
            Some(p) if p.generation == outcome.generation => {}
            _ => {
                debug!(generation = outcome.generation, "stale recalculation result dropped");
                return false;
            }
        }
        self.pending = None;

        match outcome.result {
            Ok(route) if self.session.state.is_active() => {
                info!(
                    session = %self.session.id,
                    route = %route.id,
                    distance_m = route.total_distance_m,
                    "route replaced"
                );
                self.session.set_route(Arc::new(route));
                self.session.metrics.off_route = false;
                true
            }
            Ok(route) => {
                debug!(route = %route.id, state = %self.session.state, "recalculated route discarded");
                false
            }
            Err(RouteError::Cancelled) => {
                debug!(session = %self.session.id, "recalculation cancelled");
                false
            }
            Err(e) => {
                warn!(session = %self.session.id, error = %e, "recalculation failed");
                false
            }
        }
    }

    // ── Feed driver ───────────────────────────────────────────────────────

    /// Consume `feed` until the session ends or the feed closes, applying
    /// finished recalculations between updates at the configured interval.
    pub fn run_feed(&mut self, feed: Receiver<LocationUpdate>) -> SessionResult<SessionSummary> {
        let tick = Duration::from_millis(self.config.update_interval_ms.max(1));
        while !self.session.state.is_terminal() {
            match feed.recv_timeout(tick) {
                Ok(update) => {
                    self.on_location(update)?;
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.poll_recalculation();
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        Ok(self.session.summary())
    }
}

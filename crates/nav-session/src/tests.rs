//! Unit tests for nav-session.
//!
//! Routes are built by hand and planners are scripted, so these tests need
//! no mask.  `InlineSpawner` keeps recalculation deterministic; one test
//! runs on the real rayon pool.

#[cfg(test)]
mod helpers {
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use nav_core::{CancelToken, GeoPoint, RouteId, SessionConfig, SessionId, Timestamp, TransportMode};
    use nav_route::waypoints::synthesize;
    use nav_route::{
        NavigationRoute, RouteError, RouteMetrics, RoutePlanner, RouteRequest, RouteResult,
        RouteSegment, RouteValidation, SegmentType,
    };

    use crate::{InlineSpawner, SessionEngine, TaskSpawner};

    pub const A: GeoPoint = GeoPoint { lat: 26.0, lon: 50.5 };
    pub const B: GeoPoint = GeoPoint { lat: 26.0, lon: 50.6 };

    pub fn t(secs: u64) -> Timestamp {
        Timestamp::from_secs(1_000 + secs)
    }

    /// A single marine segment along `points`.
    pub fn route_along(id: u64, points: Vec<GeoPoint>) -> NavigationRoute {
        let distance_m = nav_core::geo::polyline_length_m(&points);
        let segment = RouteSegment {
            kind: SegmentType::Marine,
            geometry: points.clone(),
            distance_m,
            duration_s: distance_m / 5.14,
            mode: Some(TransportMode::Boat),
            entry_marina: None,
            exit_marina: None,
        };
        let waypoints = synthesize(std::slice::from_ref(&segment), 30.0);
        NavigationRoute {
            id: RouteId(id),
            origin: points[0],
            destination: points[points.len() - 1],
            segments: vec![segment],
            geometry: points,
            waypoints,
            total_distance_m: distance_m,
            estimated_duration_s: distance_m / 5.14,
            validation: RouteValidation { is_valid: true, ..RouteValidation::default() },
            created_at: Timestamp::EPOCH,
            metrics: RouteMetrics { marine_distance_m: distance_m, ..RouteMetrics::default() },
        }
    }

    /// Plans a straight line from the request origin to its destination.
    #[derive(Default)]
    pub struct StraightPlanner {
        pub calls: AtomicUsize,
        next_id:   AtomicU64,
    }

    impl RoutePlanner for StraightPlanner {
        fn plan(&self, request: &RouteRequest, _: &CancelToken) -> RouteResult<NavigationRoute> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let id = 100 + self.next_id.fetch_add(1, Ordering::SeqCst);
            Ok(route_along(id, vec![request.origin, request.destination]))
        }
    }

    /// Always answers with the A → B line, wherever the traveler is.
    #[derive(Default)]
    pub struct StubbornPlanner {
        pub calls: AtomicUsize,
    }

    impl RoutePlanner for StubbornPlanner {
        fn plan(&self, _: &RouteRequest, _: &CancelToken) -> RouteResult<NavigationRoute> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as u64;
            Ok(route_along(200 + n, vec![A, B]))
        }
    }

    #[derive(Default)]
    pub struct FailingPlanner {
        pub calls: AtomicUsize,
    }

    impl RoutePlanner for FailingPlanner {
        fn plan(&self, _: &RouteRequest, _: &CancelToken) -> RouteResult<NavigationRoute> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(RouteError::RouteUnreachable("no water".into()))
        }
    }

    /// Records whether it was asked to stop.
    #[derive(Default)]
    pub struct CancelAwarePlanner {
        pub saw_cancel: AtomicBool,
    }

    impl RoutePlanner for CancelAwarePlanner {
        fn plan(&self, request: &RouteRequest, cancel: &CancelToken) -> RouteResult<NavigationRoute> {
            if cancel.is_cancelled() {
                self.saw_cancel.store(true, Ordering::SeqCst);
                return Err(RouteError::Cancelled);
            }
            Ok(route_along(300, vec![request.origin, request.destination]))
        }
    }

    /// Holds jobs until `run_all`.
    #[derive(Default)]
    pub struct ManualSpawner {
        jobs: Mutex<Vec<Box<dyn FnOnce() + Send + 'static>>>,
    }

    impl ManualSpawner {
        pub fn run_all(&self) {
            let jobs: Vec<_> = self.jobs.lock().unwrap().drain(..).collect();
            for job in jobs {
                job();
            }
        }

        pub fn queued(&self) -> usize {
            self.jobs.lock().unwrap().len()
        }
    }

    impl TaskSpawner for ManualSpawner {
        fn spawn(&self, job: Box<dyn FnOnce() + Send + 'static>) {
            self.jobs.lock().unwrap().push(job);
        }
    }

    /// An `Active` engine following A → B.
    pub fn active_engine(planner: Arc<dyn RoutePlanner>, spawner: Arc<dyn TaskSpawner>) -> SessionEngine {
        let mut engine = SessionEngine::new(
            SessionId(1),
            RouteRequest::new(A, B),
            planner,
            SessionConfig::default(),
        )
        .with_spawner(spawner);
        engine.accept_route(route_along(1, vec![A, B])).unwrap();
        engine.start(t(0)).unwrap();
        engine
    }

    pub fn inline() -> Arc<dyn TaskSpawner> {
        Arc::new(InlineSpawner)
    }
}

// ── State machine ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod state {
    use crate::{ErrorReason, NavigationState as S, SessionError, SessionEvent as E};

    #[test]
    fn happy_path() {
        let s = S::Planning.transition(E::RouteReady).unwrap();
        assert_eq!(s, S::Ready);
        let s = s.transition(E::Start).unwrap();
        assert_eq!(s, S::Active);
        let s = s.transition(E::Pause).unwrap();
        assert_eq!(s, S::Paused);
        let s = s.transition(E::Resume).unwrap();
        assert_eq!(s, S::Active);
        assert_eq!(s.transition(E::Arrive).unwrap(), S::Completed);
    }

    #[test]
    fn cancel_from_any_live_state() {
        for s in [S::Planning, S::Ready, S::Active, S::Paused] {
            assert_eq!(s.transition(E::Cancel).unwrap(), S::Cancelled);
        }
    }

    #[test]
    fn terminal_states_reject_everything() {
        let terminal = [
            S::Completed,
            S::Cancelled,
            S::Error(ErrorReason::RecalculationLimitExceeded),
        ];
        for s in terminal {
            assert!(s.is_terminal());
            for e in [E::Start, E::Resume, E::Cancel, E::Arrive] {
                assert!(matches!(s.transition(e), Err(SessionError::InvalidTransition { .. })));
            }
        }
    }

    #[test]
    fn invalid_pairs_rejected() {
        assert!(S::Ready.transition(E::Pause).is_err());
        assert!(S::Active.transition(E::Start).is_err());
        assert!(S::Paused.transition(E::Arrive).is_err());
        assert!(S::Planning.transition(E::Start).is_err());
    }

    #[test]
    fn failures_carry_reason() {
        let s = S::Paused
            .transition(E::Fail(ErrorReason::RecalculationLimitExceeded))
            .unwrap();
        assert_eq!(s, S::Error(ErrorReason::RecalculationLimitExceeded));
        let s = S::Planning.transition(E::PlanFailed("no marina".into())).unwrap();
        assert!(matches!(s, S::Error(ErrorReason::RouteUnreachable(_))));
    }
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use std::sync::Arc;

    use nav_core::{CancelToken, GeoPoint, SessionConfig, SessionId};
    use nav_route::RouteRequest;

    use super::helpers::*;
    use crate::{ErrorReason, LocationUpdate, NavigationState, SessionEngine, UpdateOutcome};

    #[test]
    fn plan_success_is_ready() {
        let mut engine = SessionEngine::new(
            SessionId(7),
            RouteRequest::new(A, B),
            Arc::new(StraightPlanner::default()),
            SessionConfig::default(),
        );
        assert_eq!(engine.state(), &NavigationState::Planning);
        engine.plan(&CancelToken::new()).unwrap();
        assert_eq!(engine.state(), &NavigationState::Ready);
        assert!(engine.session().route().is_some());
        assert_eq!(engine.session().current_waypoint_index(), 1);
    }

    #[test]
    fn plan_failure_ends_in_error() {
        let mut engine = SessionEngine::new(
            SessionId(8),
            RouteRequest::new(A, B),
            Arc::new(FailingPlanner::default()),
            SessionConfig::default(),
        );
        engine.plan(&CancelToken::new()).unwrap();
        assert!(matches!(engine.state(), NavigationState::Error(ErrorReason::RouteUnreachable(_))));
        assert!(engine.start(t(0)).is_err());
        assert!(engine.session().summary().route_id.is_none());
    }

    #[test]
    fn paused_session_ignores_updates() {
        let mut engine = active_engine(Arc::new(StraightPlanner::default()), inline());
        engine.pause().unwrap();
        let far = LocationUpdate::new(GeoPoint::new(26.5, 50.5), t(1));
        assert_eq!(engine.on_location(far).unwrap(), UpdateOutcome::Ignored);
        assert!(engine.session().breadcrumbs().is_empty());
        engine.resume().unwrap();
        assert_eq!(engine.state(), &NavigationState::Active);
    }

    #[test]
    fn cancel_sets_end_time() {
        let mut engine = active_engine(Arc::new(StraightPlanner::default()), inline());
        engine.cancel(t(30)).unwrap();
        assert_eq!(engine.state(), &NavigationState::Cancelled);
        assert_eq!(engine.session().end_time(), Some(t(30)));
        assert!(engine.cancel(t(31)).is_err());
    }
}

// ── Progress tracking ─────────────────────────────────────────────────────────

#[cfg(test)]
mod progress {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use nav_core::{GeoPoint, SessionConfig, SessionId};
    use nav_route::RouteRequest;

    use super::helpers::*;
    use crate::{LocationUpdate, NavigationState, SessionEngine, UpdateOutcome};

    #[test]
    fn staying_close_never_recalculates() {
        let planner = Arc::new(StraightPlanner::default());
        let mut engine = active_engine(planner.clone(), inline());

        // ~5.6 m north of the route line the whole way.
        for i in 0..=100u64 {
            let p = GeoPoint::new(26.00005, 50.5 + i as f64 * 0.001);
            let outcome = engine.on_location(LocationUpdate::new(p, t(i))).unwrap();
            assert!(!matches!(outcome, UpdateOutcome::Recalculating | UpdateOutcome::Failed(_)));
            assert!(!engine.session().metrics().off_route);
        }

        assert_eq!(engine.session().metrics().recalculations, 0);
        assert_eq!(planner.calls.load(Ordering::SeqCst), 0);
        assert_eq!(engine.state(), &NavigationState::Completed);
        assert_eq!(engine.session().end_time(), Some(t(100)));
        let travelled = engine.session().metrics().distance_traveled_m;
        assert!((travelled - A.distance_m(B)).abs() < 50.0);
    }

    #[test]
    fn non_finite_fix_is_dropped() {
        let planner = Arc::new(StraightPlanner::default());
        let mut engine = active_engine(planner.clone(), inline());
        engine.on_location(LocationUpdate::new(A, t(0))).unwrap();
        let index = engine.session().current_waypoint_index();
        let crumbs = engine.session().breadcrumbs().len();

        for (i, p) in [
            GeoPoint::new(f64::NAN, f64::NAN),
            GeoPoint::new(26.0, f64::NAN),
            GeoPoint::new(f64::INFINITY, 50.55),
        ]
        .into_iter()
        .enumerate()
        {
            let outcome = engine.on_location(LocationUpdate::new(p, t(i as u64 + 1))).unwrap();
            assert_eq!(outcome, UpdateOutcome::Ignored);
        }

        assert_eq!(engine.state(), &NavigationState::Active);
        assert_eq!(engine.session().current_waypoint_index(), index);
        assert_eq!(engine.session().breadcrumbs().len(), crumbs);
        assert_eq!(engine.session().current_location(), Some(A));
        assert_eq!(planner.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn nan_speed_and_bearing_fall_back() {
        let mut engine = active_engine(Arc::new(StraightPlanner::default()), inline());
        engine.on_location(LocationUpdate::new(A, t(0))).unwrap();
        let mut update = LocationUpdate::new(GeoPoint::new(26.0, 50.501), t(10));
        update.speed_mps = Some(f64::NAN);
        update.bearing_deg = Some(f64::NAN);
        engine.on_location(update).unwrap();

        let speed = engine.session().current_speed_mps().unwrap();
        assert!(speed.is_finite() && speed > 0.0);
        assert!(engine.session().current_bearing().is_some_and(f64::is_finite));
        assert!(engine.session().metrics().max_speed_mps.is_finite());
    }

    #[test]
    fn waypoints_advance_in_order() {
        let corner = GeoPoint::new(26.0, 50.55);
        let end = GeoPoint::new(26.05, 50.55);
        let mut engine = SessionEngine::new(
            SessionId(2),
            RouteRequest::new(A, end),
            Arc::new(StraightPlanner::default()),
            SessionConfig::default(),
        )
        .with_spawner(inline());
        engine.accept_route(route_along(1, vec![A, corner, end])).unwrap();
        engine.start(t(0)).unwrap();
        assert_eq!(engine.session().route().unwrap().waypoints.len(), 3);

        let mut track: Vec<GeoPoint> = (0..=50).map(|i| GeoPoint::new(26.0, 50.5 + i as f64 * 0.001)).collect();
        track.extend((1..=50).map(|i| GeoPoint::new(26.0 + i as f64 * 0.001, 50.55)));

        let mut last_index = engine.session().current_waypoint_index();
        let mut reached = Vec::new();
        for (i, p) in track.into_iter().enumerate() {
            let outcome = engine.on_location(LocationUpdate::new(p, t(i as u64))).unwrap();
            if let UpdateOutcome::WaypointReached(idx) = outcome {
                reached.push(idx);
            }
            let index = engine.session().current_waypoint_index();
            assert!(index >= last_index);
            last_index = index;
        }

        assert_eq!(reached, vec![1]);
        assert_eq!(engine.state(), &NavigationState::Completed);
        assert_eq!(engine.session().current_waypoint_index(), 2);
    }

    #[test]
    fn speed_and_bearing_derived_from_fixes() {
        let mut engine = active_engine(Arc::new(StraightPlanner::default()), inline());
        let p0 = GeoPoint::new(26.0, 50.51);
        let p1 = GeoPoint::new(26.0, 50.511);
        engine.on_location(LocationUpdate::new(p0, t(10))).unwrap();
        engine.on_location(LocationUpdate::new(p1, t(12))).unwrap();

        let s = engine.session();
        let expected = p0.distance_m(p1) / 2.0;
        assert!((s.current_speed_mps().unwrap() - expected).abs() < 1e-9);
        assert!((s.metrics().max_speed_mps - expected).abs() < 1e-9);
        assert!((s.current_bearing().unwrap() - 90.0).abs() < 0.1);
        assert_eq!(s.metrics().elapsed_s, 12.0);
    }

    #[test]
    fn breadcrumbs_are_bounded_fifo() {
        let mut engine = active_engine(Arc::new(StraightPlanner::default()), inline());
        for i in 0..1_500u64 {
            let p = GeoPoint::new(26.0, 50.5 + (i % 50) as f64 * 0.0001);
            engine.on_location(LocationUpdate::new(p, t(i))).unwrap();
            assert!(engine.session().breadcrumbs().len() <= 1_000);
        }
        let crumbs = engine.session().breadcrumbs();
        assert_eq!(crumbs.len(), 1_000);
        assert_eq!(crumbs.front().map(|c| c.timestamp), Some(t(500)));
        assert_eq!(crumbs.back().map(|c| c.timestamp), Some(t(1_499)));
    }
}

// ── Recalculation ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod recalculation {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use nav_core::GeoPoint;

    use super::helpers::*;
    use crate::{ErrorReason, LocationUpdate, NavigationState, RayonSpawner, UpdateOutcome};

    /// ~100 m north of the A → B line.
    fn off_route(i: u64) -> LocationUpdate {
        LocationUpdate::new(GeoPoint::new(26.0009, 50.51 + i as f64 * 0.001), t(i))
    }

    #[test]
    fn persistent_deviation_exhausts_attempts() {
        let planner = Arc::new(StubbornPlanner::default());
        let mut engine = active_engine(planner.clone(), inline());

        let outcomes: Vec<UpdateOutcome> =
            (0..6).map(|i| engine.on_location(off_route(i)).unwrap()).collect();

        assert!(outcomes[..5].iter().all(|o| *o == UpdateOutcome::Recalculating));
        assert_eq!(outcomes[5], UpdateOutcome::Failed(ErrorReason::RecalculationLimitExceeded));
        assert_eq!(engine.session().metrics().recalculations, 5);
        assert_eq!(planner.calls.load(Ordering::SeqCst), 5);
        assert_eq!(
            engine.state(),
            &NavigationState::Error(ErrorReason::RecalculationLimitExceeded)
        );
        assert!(engine.session().end_time().is_some());
    }

    #[test]
    fn failed_recalculations_still_count() {
        let planner = Arc::new(FailingPlanner::default());
        let mut engine = active_engine(planner.clone(), inline());
        for i in 0..6 {
            engine.on_location(off_route(i)).unwrap();
        }
        assert_eq!(planner.calls.load(Ordering::SeqCst), 5);
        assert!(matches!(engine.state(), NavigationState::Error(_)));
    }

    #[test]
    fn pending_plan_suppresses_new_attempts() {
        let spawner = Arc::new(ManualSpawner::default());
        let mut engine = active_engine(Arc::new(StraightPlanner::default()), spawner.clone());

        assert_eq!(engine.on_location(off_route(0)).unwrap(), UpdateOutcome::Recalculating);
        assert_eq!(engine.on_location(off_route(1)).unwrap(), UpdateOutcome::AwaitingRecalculation);
        assert_eq!(engine.on_location(off_route(2)).unwrap(), UpdateOutcome::AwaitingRecalculation);
        assert_eq!(engine.session().metrics().recalculations, 1);
        assert_eq!(engine.session().breadcrumbs().len(), 3);
        assert_eq!(spawner.queued(), 1);
        assert_eq!(engine.session().route().map(|r| r.id.0), Some(1));

        spawner.run_all();
        // The new route starts where the deviation was detected.
        assert_eq!(engine.on_location(off_route(3)).unwrap(), UpdateOutcome::OnRoute);
        assert_eq!(engine.session().route().map(|r| r.id.0), Some(100));
        assert!(!engine.has_pending_recalculation());
        assert!(!engine.session().metrics().off_route);
    }

    #[test]
    fn result_discarded_after_leaving_active() {
        let spawner = Arc::new(ManualSpawner::default());
        let mut engine = active_engine(Arc::new(StraightPlanner::default()), spawner.clone());
        engine.on_location(off_route(0)).unwrap();
        engine.pause().unwrap();

        spawner.run_all();
        assert!(!engine.poll_recalculation());
        assert_eq!(engine.session().route().map(|r| r.id.0), Some(1));
        assert!(!engine.has_pending_recalculation());
    }

    #[test]
    fn cancel_stops_running_plan() {
        let spawner = Arc::new(ManualSpawner::default());
        let planner = Arc::new(CancelAwarePlanner::default());
        let mut engine = active_engine(planner.clone(), spawner.clone());
        engine.on_location(off_route(0)).unwrap();
        engine.cancel(t(5)).unwrap();

        spawner.run_all();
        assert!(planner.saw_cancel.load(Ordering::SeqCst));
        assert!(!engine.poll_recalculation());
        assert_eq!(engine.state(), &NavigationState::Cancelled);
    }

    #[test]
    fn recalculates_on_rayon_pool() {
        let mut engine = active_engine(Arc::new(StraightPlanner::default()), Arc::new(RayonSpawner));
        assert_eq!(engine.on_location(off_route(0)).unwrap(), UpdateOutcome::Recalculating);
        assert!(engine.wait_for_recalculation(Duration::from_secs(10)));
        assert_eq!(engine.session().route().map(|r| r.id.0), Some(100));
        assert_eq!(engine.state(), &NavigationState::Active);
    }
}

// ── Feed driver ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod feed {
    use std::sync::Arc;

    use crossbeam_channel::unbounded;
    use nav_core::GeoPoint;

    use super::helpers::*;
    use crate::{LocationUpdate, NavigationState};

    #[test]
    fn runs_until_arrival() {
        let mut engine = active_engine(Arc::new(StraightPlanner::default()), inline());
        let (tx, rx) = unbounded();
        for i in 0..=100u64 {
            let p = GeoPoint::new(26.0, 50.5 + i as f64 * 0.001);
            tx.send(LocationUpdate::new(p, t(i))).unwrap();
        }
        // Extra fixes after arrival are never read.
        tx.send(LocationUpdate::new(A, t(200))).unwrap();

        let summary = engine.run_feed(rx).unwrap();
        assert_eq!(summary.state, NavigationState::Completed);
        assert_eq!(summary.breadcrumbs, 101);
        assert_eq!(summary.route_id.map(|r| r.0), Some(1));
        assert_eq!(summary.end_time, Some(t(100)));
    }

    #[test]
    fn closed_feed_returns_live_summary() {
        let mut engine = active_engine(Arc::new(StraightPlanner::default()), inline());
        let (tx, rx) = unbounded();
        tx.send(LocationUpdate::new(GeoPoint::new(26.0, 50.52), t(1))).unwrap();
        drop(tx);

        let summary = engine.run_feed(rx).unwrap();
        assert_eq!(summary.state, NavigationState::Active);
        assert_eq!(summary.breadcrumbs, 1);
        assert!(summary.end_time.is_none());
    }
}

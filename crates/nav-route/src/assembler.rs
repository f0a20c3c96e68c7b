//! The route assembler.
//!
//! # Concurrency
//!
//! `RouteAssembler` is `Send + Sync` and every `assemble` call works on its
//! own locals, so any number of plans may run at once on worker threads.
//! The grid is shared immutably through the [`MaskSlot`]; the weather layer
//! is an `Arc` snapshot taken at the start of each plan, and a refresh swaps
//! in a new snapshot without disturbing plans already running.

use std::iter;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use nav_core::{
    geo::polyline_length_m, CancelToken, GeoPoint, NavConfig, RouteConfig, RouteId, SearchConfig,
    Timestamp, TransportMode,
};
use nav_grid::{DepthMap, MaskSlot, NavigabilityGrid, RestrictedZones};
use nav_search::{CostLayers, MarineSearch, SearchError};
use nav_weather::{WeatherCostModel, WeatherProvider, WeatherResult};

use crate::waypoints::synthesize;
use crate::{
    LandRouter, Marina, MarinaRegistry, NavigationRoute, RouteError, RouteMetrics, RouteResult,
    RouteSegment, RouteValidation, SegmentType,
};

// ── Request and planner contract ──────────────────────────────────────────────

/// What to plan.
#[derive(Clone, Debug)]
pub struct RouteRequest {
    pub origin:      GeoPoint,
    pub destination: GeoPoint,
    /// Points to pass through, in order.
    pub via:         Vec<GeoPoint>,
    /// Mode for every land segment.
    pub land_mode:   TransportMode,
}

impl RouteRequest {
    pub fn new(origin: GeoPoint, destination: GeoPoint) -> Self {
        Self { origin, destination, via: Vec::new(), land_mode: TransportMode::Car }
    }

    pub fn with_via(mut self, via: Vec<GeoPoint>) -> Self {
        self.via = via;
        self
    }

    pub fn with_land_mode(mut self, mode: TransportMode) -> Self {
        self.land_mode = mode;
        self
    }

    /// The same request re-anchored at `origin`, dropping via points.
    /// Used by recalculation, which always heads for the original
    /// destination.
    pub fn from_position(&self, origin: GeoPoint) -> Self {
        Self { origin, via: Vec::new(), ..self.clone() }
    }
}

/// Anything that can turn a request into a route.
///
/// The session engine holds an `Arc<dyn RoutePlanner>` so tests can swap in
/// scripted planners.
pub trait RoutePlanner: Send + Sync {
    fn plan(&self, request: &RouteRequest, cancel: &CancelToken) -> RouteResult<NavigationRoute>;
}

// ── Per-plan accumulator ──────────────────────────────────────────────────────

#[derive(Default)]
struct Tally {
    restricted:      usize,
    land_crossings:  usize,
    water_crossings: usize,
    depth_sum:       f64,
    depth_count:     usize,
}

struct PlanContext<'a> {
    grid:    &'a NavigabilityGrid,
    weather: &'a WeatherCostModel,
    cancel:  &'a CancelToken,
    mode:    TransportMode,
    tally:   Tally,
}

// ── RouteAssembler ────────────────────────────────────────────────────────────

pub struct RouteAssembler {
    mask:          Arc<MaskSlot>,
    weather:       RwLock<Arc<WeatherCostModel>>,
    zones:         Arc<RestrictedZones>,
    depth:         Option<Arc<DepthMap>>,
    marinas:       Arc<MarinaRegistry>,
    land:          Arc<dyn LandRouter>,
    route_config:  RouteConfig,
    search_config: SearchConfig,
    next_id:       AtomicU64,
}

impl RouteAssembler {
    pub fn new(
        config: &NavConfig,
        mask: Arc<MaskSlot>,
        marinas: Arc<MarinaRegistry>,
        land: Arc<dyn LandRouter>,
    ) -> Self {
        Self {
            mask,
            weather: RwLock::new(Arc::new(WeatherCostModel::new(config.weather.clone()))),
            zones: Arc::new(RestrictedZones::default()),
            depth: None,
            marinas,
            land,
            route_config: config.route.clone(),
            search_config: config.search.clone(),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn with_zones(mut self, zones: RestrictedZones) -> Self {
        self.zones = Arc::new(zones);
        self
    }

    pub fn with_depth(mut self, depth: DepthMap) -> Self {
        self.depth = Some(Arc::new(depth));
        self
    }

    pub fn with_weather(self, model: WeatherCostModel) -> Self {
        self.set_weather(model);
        self
    }

    // ── Weather snapshot ──────────────────────────────────────────────────

    /// The current weather snapshot.
    pub fn weather(&self) -> Arc<WeatherCostModel> {
        match self.weather.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Replace the weather snapshot.  Plans already running keep theirs.
    pub fn set_weather(&self, model: WeatherCostModel) {
        let mut guard = match self.weather.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::new(model);
    }

    /// Pull fresh samples from `provider` if the refresh interval has
    /// elapsed.  On provider failure the previous snapshot stays in use.
    pub fn refresh_weather(&self, provider: &dyn WeatherProvider, now: Timestamp) -> WeatherResult<bool> {
        let current = self.weather();
        if !current.is_due(now) {
            return Ok(false);
        }
        let mut next = (*current).clone();
        let refreshed = next.refresh_if_due(provider, now)?;
        if refreshed {
            self.set_weather(next);
        }
        Ok(refreshed)
    }

    // ── Assembly ──────────────────────────────────────────────────────────

    /// Build a complete route for `request`.
    pub fn assemble(&self, request: &RouteRequest, cancel: &CancelToken) -> RouteResult<NavigationRoute> {
        let grid = self.mask.get()?;
        let weather = self.weather();
        let mut ctx = PlanContext {
            grid: &grid,
            weather: &weather,
            cancel,
            mode: request.land_mode,
            tally: Tally::default(),
        };

        let stops: Vec<GeoPoint> = iter::once(request.origin)
            .chain(request.via.iter().copied())
            .chain(iter::once(request.destination))
            .collect();

        let mut segments = Vec::new();
        for leg in stops.windows(2) {
            if cancel.is_cancelled() {
                return Err(RouteError::Cancelled);
            }
            self.assemble_leg(&mut ctx, leg[0], leg[1], &mut segments)?;
        }
        check_continuity(&segments, self.route_config.segment_join_tolerance_m)?;

        let mut geometry: Vec<GeoPoint> = Vec::new();
        for seg in &segments {
            let skip = usize::from(!geometry.is_empty());
            geometry.extend(seg.geometry.iter().skip(skip).copied());
        }

        let waypoints = synthesize(&segments, self.route_config.turn_threshold_deg);
        let metrics = metrics(&segments, &ctx.tally);
        let validation = RouteValidation {
            is_valid: ctx.tally.restricted == 0
                && ctx.tally.land_crossings == 0
                && ctx.tally.water_crossings == 0,
            restricted_violations: ctx.tally.restricted,
            land_crossings: ctx.tally.land_crossings,
            water_crossings: ctx.tally.water_crossings,
        };

        let route = NavigationRoute {
            id: RouteId(self.next_id.fetch_add(1, Ordering::Relaxed)),
            origin: request.origin,
            destination: request.destination,
            total_distance_m: segments.iter().map(|s| s.distance_m).sum(),
            estimated_duration_s: segments.iter().map(|s| s.duration_s).sum(),
            segments,
            geometry,
            waypoints,
            validation,
            created_at: Timestamp::now(),
            metrics,
        };

        info!(
            route = %route.id,
            segments = route.segments.len(),
            waypoints = route.waypoints.len(),
            hybrid = route.is_hybrid(),
            distance_m = route.total_distance_m,
            duration_s = route.estimated_duration_s,
            valid = route.validation.is_valid,
            "route assembled"
        );
        Ok(route)
    }

    fn assemble_leg(
        &self,
        ctx: &mut PlanContext<'_>,
        from: GeoPoint,
        to: GeoPoint,
        out: &mut Vec<RouteSegment>,
    ) -> RouteResult<()> {
        let from_water = ctx.grid.is_navigable(from);
        let to_water = ctx.grid.is_navigable(to);
        debug!(%from, %to, from_water, to_water, "assembling leg");

        match (from_water, to_water) {
            (true, true) => {
                out.push(self.marine_segment(ctx, from, to, None, None)?);
            }
            (false, true) => {
                let (marina, launch) = self.transfer_marina(ctx.grid, from)?;
                out.push(self.land_leg(ctx, from, marina.location)?);
                out.push(self.marine_segment(ctx, launch, to, Some(marina), None)?);
            }
            (true, false) => {
                let (marina, launch) = self.transfer_marina(ctx.grid, to)?;
                let land_start = marina.location;
                out.push(self.marine_segment(ctx, from, launch, None, Some(marina))?);
                out.push(self.land_leg(ctx, land_start, to)?);
            }
            (false, false) => match self.land_leg(ctx, from, to) {
                Ok(seg) => out.push(seg),
                Err(land_err) => {
                    debug!(error = %land_err, "direct land leg failed; trying a marine crossing");
                    let (board, launch) = self.transfer_marina(ctx.grid, from)?;
                    let (alight, landing) = self.transfer_marina(ctx.grid, to)?;
                    if board.id == alight.id {
                        return Err(land_err);
                    }
                    let board_at = board.location;
                    let alight_at = alight.location;
                    out.push(self.land_leg(ctx, from, board_at)?);
                    out.push(self.marine_segment(ctx, launch, landing, Some(board), Some(alight))?);
                    out.push(self.land_leg(ctx, alight_at, to)?);
                }
            },
        }
        Ok(())
    }

    /// Nearest eligible marina to `p` that has water within reach, together
    /// with its launch point.
    fn transfer_marina(
        &self,
        grid: &NavigabilityGrid,
        p: GeoPoint,
    ) -> RouteResult<(Arc<Marina>, GeoPoint)> {
        let radius_m = self.route_config.marina_search_radius_m;
        let candidates =
            self.marinas.eligible_within(p, radius_m, self.route_config.allow_private_marinas);

        for (marina, distance_m) in candidates {
            match grid.find_nearest_water(marina.location, self.route_config.marina_water_radius_m) {
                Some(launch) => {
                    info!(marina = %marina.name, id = %marina.id, distance_m, "transfer marina selected");
                    return Ok((marina, launch));
                }
                None => debug!(marina = %marina.name, "marina has no water within reach; skipped"),
            }
        }
        Err(RouteError::NoMarinaAvailable { near: p, radius_m })
    }

    /// Land segment checked against the mask.  A leg that runs mostly over
    /// open water is unreachable by land; a smaller share is tallied as a
    /// water crossing.
    fn land_leg(
        &self,
        ctx: &mut PlanContext<'_>,
        from: GeoPoint,
        to: GeoPoint,
    ) -> RouteResult<RouteSegment> {
        let seg = self.land_segment(from, to, ctx.mode)?;
        let wet = ctx.grid.water_fraction(&seg.geometry, self.route_config.samples_per_leg);
        if wet > self.route_config.max_land_water_fraction {
            return Err(RouteError::RouteUnreachable(format!(
                "land route from {from} to {to} runs {:.0}% over open water",
                wet * 100.0
            )));
        }
        if wet > 0.0 {
            debug!(%from, %to, water_fraction = wet, "land leg touches open water");
            ctx.tally.water_crossings += 1;
        }
        Ok(seg)
    }

    fn land_segment(&self, from: GeoPoint, to: GeoPoint, mode: TransportMode) -> RouteResult<RouteSegment> {
        let route = self.land.route(from, to, mode).map_err(|e| match e {
            RouteError::RouteUnreachable(msg) => RouteError::RouteUnreachable(msg),
            other => RouteError::RouteUnreachable(format!("land router failed from {from} to {to}: {other}")),
        })?;

        // Pin the collaborator's polyline to the exact leg endpoints.
        let mut geometry = route.polyline;
        if geometry.first() != Some(&from) {
            geometry.insert(0, from);
        }
        if geometry.last() != Some(&to) {
            geometry.push(to);
        }

        let distance_m = polyline_length_m(&geometry);
        let duration_s = if route.duration_s.is_finite() && route.duration_s >= 0.0 {
            route.duration_s
        } else {
            distance_m / route.mode.nominal_speed_mps()
        };

        Ok(RouteSegment {
            kind: SegmentType::Land,
            geometry,
            distance_m,
            duration_s,
            mode: Some(route.mode),
            entry_marina: None,
            exit_marina: None,
        })
    }

    fn marine_segment(
        &self,
        ctx: &mut PlanContext<'_>,
        from: GeoPoint,
        to: GeoPoint,
        entry: Option<Arc<Marina>>,
        exit: Option<Arc<Marina>>,
    ) -> RouteResult<RouteSegment> {
        let layers = CostLayers {
            weather: Some(ctx.weather),
            zones:   Some(self.zones.as_ref()),
            depth:   self.depth.as_deref(),
        };
        let search = MarineSearch::new(ctx.grid, layers, self.search_config.clone());
        let path = search.find_path(from, to, ctx.cancel).map_err(|e| match e {
            SearchError::Cancelled => RouteError::Cancelled,
            other => other.into(),
        })?;

        ctx.tally.land_crossings +=
            ctx.grid.check_polyline(&path.geometry, self.route_config.samples_per_leg).len();
        ctx.tally.restricted += path
            .cells
            .iter()
            .filter(|c| self.zones.any_contains(ctx.grid.cell_center(**c)))
            .count();
        if let Some(depth) = &self.depth {
            for d in path.cells.iter().filter_map(|c| depth.depth_at(*c)) {
                ctx.tally.depth_sum += d;
                ctx.tally.depth_count += 1;
            }
        }

        let mut geometry = path.geometry;
        if let Some(m) = &entry {
            if geometry.first() != Some(&m.location) {
                geometry.insert(0, m.location);
            }
        }
        if let Some(m) = &exit {
            if geometry.last() != Some(&m.location) {
                geometry.push(m.location);
            }
        }

        let distance_m = polyline_length_m(&geometry);
        Ok(RouteSegment {
            kind: SegmentType::Marine,
            geometry,
            distance_m,
            duration_s: distance_m / self.route_config.boat_speed_mps,
            mode: Some(TransportMode::Boat),
            entry_marina: entry,
            exit_marina: exit,
        })
    }
}

impl RoutePlanner for RouteAssembler {
    fn plan(&self, request: &RouteRequest, cancel: &CancelToken) -> RouteResult<NavigationRoute> {
        self.assemble(request, cancel)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn check_continuity(segments: &[RouteSegment], tolerance_m: f64) -> RouteResult<()> {
    for (i, pair) in segments.windows(2).enumerate() {
        let gap_m = match (pair[0].end(), pair[1].start()) {
            (Some(end), Some(start)) => end.distance_m(start),
            _ => f64::INFINITY,
        };
        if gap_m > tolerance_m {
            return Err(RouteError::SegmentDiscontinuity { index: i + 1, gap_m });
        }
    }
    Ok(())
}

fn metrics(segments: &[RouteSegment], tally: &Tally) -> RouteMetrics {
    let mut m = RouteMetrics {
        restricted_violations: tally.restricted,
        average_depth_m: (tally.depth_count > 0).then(|| tally.depth_sum / tally.depth_count as f64),
        ..RouteMetrics::default()
    };
    for seg in segments {
        match seg.kind {
            SegmentType::Land => {
                m.land_distance_m += seg.distance_m;
                m.land_duration_s += seg.duration_s;
            }
            SegmentType::Marine => {
                m.marine_distance_m += seg.distance_m;
                m.marine_duration_s += seg.duration_s;
            }
        }
    }
    m
}

//! bahrain — end-to-end demo of hybrid land/marine navigation.
//!
//! Plans a trip from central Manama to Muharraq on a synthetic two-island
//! mask, prints the assembled route, then replays a simulated device along
//! it.  Partway through, the device strays off the route so the session
//! recalculates in the background.
//!
//! Usage: `bahrain [config.json] [marinas.csv]`.  Both default to embedded
//! data.  Set `RUST_LOG=debug` for search and waypoint detail.

mod scenario;
mod traveler;

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use tracing::info;

use nav_core::{CancelToken, GeoPoint, NavConfig, SessionId, Timestamp};
use nav_grid::{MaskSlot, RestrictedZones};
use nav_route::{
    load_marinas_csv, load_marinas_reader, NavigationRoute, RouteAssembler,
    RouteRequest,
};
use nav_session::{LocationUpdate, NavigationState, SessionEngine, UpdateOutcome};

use scenario::{anchorage, build_mask, FixedForecast, IslandRoadRouter, MARINAS_CSV};
use traveler::Traveler;

// ── Constants ─────────────────────────────────────────────────────────────────

const ORIGIN:       GeoPoint = GeoPoint { lat: 26.200, lon: 50.570 }; // Manama
const DESTINATION:  GeoPoint = GeoPoint { lat: 26.270, lon: 50.655 }; // Muharraq
const START_SECS:   u64      = 1_700_000_000;
const FIX_EVERY_MS: u64      = 2_000;
const STEP_M:       f64      = 12.0;
const DETOUR_AT:    usize    = 300; // fix index where the device strays
const DETOUR_M:     f64      = 150.0;
const MAX_FIXES:    usize    = 20_000;

/// Overrides applied on top of the defaults; anything unnamed keeps its
/// production value.
const CONFIG_JSON: &str = r#"{
    "search":  { "timeout_ms": 5000 },
    "route":   { "marina_search_radius_m": 5000.0 },
    "session": { "waypoint_proximity_m": 20.0, "max_recalculations": 5 }
}"#;

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    println!("=== bahrain — hybrid land/marine navigation ===");
    println!();

    // 1. Configuration.
    let config: NavConfig = match args.first() {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?
        }
        None => serde_json::from_str(CONFIG_JSON)?,
    };
    config.validate()?;

    // 2. Navigability mask.
    let (bytes, meta) = build_mask();
    let slot = Arc::new(MaskSlot::new());
    let grid = slot.initialize(&bytes, meta)?;
    let stats = grid.area_stats();
    println!(
        "Mask: {}x{} cells, {:.1}% water ({:.0} km² land)",
        grid.width(),
        grid.height(),
        stats.water_percentage,
        stats.land_area_km2
    );

    // 3. Marinas.
    let marinas = match args.get(1) {
        Some(path) => load_marinas_csv(Path::new(path))?,
        None => load_marinas_reader(Cursor::new(MARINAS_CSV))?,
    };
    let registry = Arc::new(marinas);
    println!("Marinas: {}", registry.len());

    // 4. Assembler with zones and a first weather snapshot.
    let assembler = Arc::new(
        RouteAssembler::new(
            &config,
            Arc::clone(&slot),
            registry,
            Arc::new(IslandRoadRouter::new(Arc::clone(&grid))),
        )
        .with_zones(RestrictedZones::new(vec![anchorage()])),
    );
    let t0 = Timestamp::from_secs(START_SECS);
    if assembler.refresh_weather(&FixedForecast, t0)? {
        println!("Weather: {} cell(s) sampled", assembler.weather().sampled_cells());
    }
    println!();

    // 5. Plan.
    let request = RouteRequest::new(ORIGIN, DESTINATION);
    let mut engine = SessionEngine::new(SessionId(1), request, assembler, config.session.clone());
    let started = Instant::now();
    engine.plan(&CancelToken::new())?;
    if let NavigationState::Error(reason) = engine.state() {
        bail!("planning failed: {reason}");
    }
    let Some(route) = engine.session().route().cloned() else {
        bail!("session is ready without a route");
    };
    println!("Planned in {:.1} ms", started.elapsed().as_secs_f64() * 1e3);
    print_route(&route);

    // 6. Replay a device along the route.
    engine.start(t0)?;
    let Some(mut device) = Traveler::new(route.geometry.clone()) else {
        bail!("route has no geometry");
    };

    let mut now = t0;
    let mut fixes = 0;
    while !engine.state().is_terminal() && fixes < MAX_FIXES {
        fixes += 1;
        now = now.offset_ms(FIX_EVERY_MS);

        let mut p = device.advance(STEP_M);
        if fixes == DETOUR_AT {
            let side = device.heading().unwrap_or(0.0) + 90.0;
            p = p.destination(side, DETOUR_M);
            println!("Fix {fixes}: device strays {DETOUR_M:.0} m off the route");
        }

        let mut update = LocationUpdate::new(p, now);
        update.speed_mps = Some(STEP_M / (FIX_EVERY_MS as f64 / 1e3));
        match engine.on_location(update)? {
            UpdateOutcome::WaypointReached(i) => {
                let instruction = engine
                    .session()
                    .route()
                    .and_then(|r| r.waypoints.get(i + 1))
                    .and_then(|w| w.instruction.clone())
                    .unwrap_or_default();
                println!("Fix {fixes}: waypoint {i} reached. Next: {instruction}");
            }
            UpdateOutcome::Recalculating => {
                if engine.wait_for_recalculation(Duration::from_secs(10)) {
                    if let Some(next) = engine.session().route() {
                        println!(
                            "Fix {fixes}: rerouted as {} ({:.0} m left)",
                            next.id, next.total_distance_m
                        );
                        if let Some(t) = Traveler::new(next.geometry.clone()) {
                            device = t;
                        }
                    }
                }
            }
            UpdateOutcome::Arrived => println!("Fix {fixes}: arrived"),
            UpdateOutcome::Failed(reason) => println!("Fix {fixes}: session failed: {reason}"),
            _ => {}
        }

        if device.finished() && !engine.state().is_terminal() {
            info!(fixes, "device stopped short of the destination");
            break;
        }
    }

    // 7. Summary.
    let summary = engine.session().summary();
    println!();
    println!("Session {} ended {}", summary.id, summary.state);
    let json = serde_json::json!({
        "session":          summary.id.0,
        "state":            summary.state.to_string(),
        "route":            summary.route_id.map(|r| r.0),
        "distance_m":       summary.metrics.distance_traveled_m.round(),
        "elapsed_s":        summary.metrics.elapsed_s,
        "recalculations":   summary.metrics.recalculations,
        "max_speed_mps":    summary.metrics.max_speed_mps,
        "breadcrumbs":      summary.breadcrumbs,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);

    Ok(())
}

fn print_route(route: &NavigationRoute) {
    println!(
        "Route {}: {:.1} km, ~{:.0} min, {} segment(s){}",
        route.id,
        route.total_distance_m / 1e3,
        route.estimated_duration_s / 60.0,
        route.segments.len(),
        if route.is_hybrid() { ", hybrid" } else { "" }
    );
    println!("{:<4} {:<8} {:<6} {:>9} {:>8}", "#", "Type", "Mode", "Dist (m)", "Time (s)");
    println!("{}", "-".repeat(40));
    for (i, seg) in route.segments.iter().enumerate() {
        println!(
            "{:<4} {:<8} {:<6} {:>9.0} {:>8.0}",
            i,
            seg.kind.as_str(),
            seg.mode.map_or("-", |m| m.as_str()),
            seg.distance_m,
            seg.duration_s
        );
    }
    println!();
    for w in &route.waypoints {
        println!(
            "  [{:>2}] {:>7.0} m  {}",
            w.id.0,
            w.distance_from_start,
            w.instruction.as_deref().unwrap_or("")
        );
    }
    if !route.validation.is_valid {
        println!(
            "  warning: {} land crossing(s), {} water crossing(s), {} restricted cell(s)",
            route.validation.land_crossings,
            route.validation.water_crossings,
            route.validation.restricted_violations
        );
    }
    println!();
}

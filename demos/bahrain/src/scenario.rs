//! Synthetic Bahrain-like scenario.
//!
//! Two rectangular islands stand in for the main island and Muharraq; every
//! other cell is open water.  Resolution is 0.005° (~550 m), coarse enough
//! that the whole mask fits in a few kilobytes.

use std::sync::Arc;

use nav_core::{geo::polyline_length_m, GeoPoint, TransportMode};
use nav_grid::{MaskMetadata, NavigabilityGrid, RestrictedZone};
use nav_route::{LandRoute, LandRouter, RouteError, RouteResult};
use nav_weather::{WeatherProvider, WeatherResult, WeatherSample};

// ── Mask ──────────────────────────────────────────────────────────────────────

const MIN_LAT:    f64   = 25.90;
const MIN_LON:    f64   = 50.35;
const RESOLUTION: f64   = 0.005;
const WIDTH:      usize = 80;
const HEIGHT:     usize = 90;

/// `(min_lat, max_lat, min_lon, max_lon)` of each island.
const ISLANDS: [(f64, f64, f64, f64); 2] = [
    (25.95, 26.24, 50.40, 50.62), // main island
    (26.245, 26.29, 50.63, 50.68), // Muharraq
];

fn is_land(p: GeoPoint) -> bool {
    ISLANDS
        .iter()
        .any(|&(lat0, lat1, lon0, lon1)| p.lat >= lat0 && p.lat < lat1 && p.lon >= lon0 && p.lon < lon1)
}

/// Raw mask bytes (row 0 = southernmost) and their metadata.
pub fn build_mask() -> (Vec<u8>, MaskMetadata) {
    let meta = MaskMetadata::from_origin(MIN_LAT, MIN_LON, RESOLUTION, WIDTH, HEIGHT);
    let mut bytes = Vec::with_capacity(WIDTH * HEIGHT);
    for row in 0..HEIGHT {
        for col in 0..WIDTH {
            let centre = GeoPoint::new(
                MIN_LAT + (row as f64 + 0.5) * RESOLUTION,
                MIN_LON + (col as f64 + 0.5) * RESOLUTION,
            );
            bytes.push(if is_land(centre) { meta.land_value } else { meta.water_value });
        }
    }
    (bytes, meta)
}

// ── Marinas ───────────────────────────────────────────────────────────────────

pub const MARINAS_CSV: &str = "\
id,name,lat,lon,kind,access,depth_m,facilities\n\
1,Bahrain Yacht Club,26.170,50.618,marina,public,4.5,fuel;repair\n\
2,Manama Corniche Slipway,26.236,50.585,slipway,public,3.0,\n\
3,Muharraq Ferry Terminal,26.247,50.645,port,public,6.0,ticketing\n\
4,Amwaj Private Harbour,26.292,50.665,harbor,private,5.0,fuel\n\
";

// ── Restricted zones ──────────────────────────────────────────────────────────

/// An anchorage east of the main island that boats should skirt.
pub fn anchorage() -> RestrictedZone {
    RestrictedZone::new(
        "Sitra anchorage",
        vec![
            GeoPoint::new(26.10, 50.64),
            GeoPoint::new(26.10, 50.68),
            GeoPoint::new(26.14, 50.68),
            GeoPoint::new(26.14, 50.64),
        ],
    )
}

// ── Weather ───────────────────────────────────────────────────────────────────

/// Fixed forecast: choppy water north-east of Muharraq.
pub struct FixedForecast;

impl WeatherProvider for FixedForecast {
    fn fetch(&self) -> WeatherResult<Vec<WeatherSample>> {
        Ok(vec![WeatherSample {
            location:       GeoPoint::new(26.33, 50.72),
            wave_height_m:  1.8,
            wind_speed_kmh: 35.0,
            visibility_m:   8_000.0,
        }])
    }
}

// ── Land routing ──────────────────────────────────────────────────────────────

/// Straight-line driving that refuses to cross water.
///
/// Good enough to show the assembler falling back to a boat leg when two
/// land points sit on different islands.
pub struct IslandRoadRouter {
    grid: Arc<NavigabilityGrid>,
}

impl IslandRoadRouter {
    pub fn new(grid: Arc<NavigabilityGrid>) -> Self {
        Self { grid }
    }
}

impl LandRouter for IslandRoadRouter {
    fn route(&self, from: GeoPoint, to: GeoPoint, mode: TransportMode) -> RouteResult<LandRoute> {
        if mode.is_marine() {
            return Err(RouteError::RouteUnreachable(format!("{mode} is not a land mode")));
        }
        const SAMPLES: usize = 50;
        for i in 1..SAMPLES {
            let t = i as f64 / SAMPLES as f64;
            let p = GeoPoint::new(from.lat + (to.lat - from.lat) * t, from.lon + (to.lon - from.lon) * t);
            if self.grid.is_navigable(p) {
                return Err(RouteError::RouteUnreachable(format!(
                    "no road across water near ({:.4}, {:.4})",
                    p.lat, p.lon
                )));
            }
        }
        let polyline = vec![from, to];
        let duration_s = polyline_length_m(&polyline) / mode.nominal_speed_mps();
        Ok(LandRoute { polyline, duration_s, mode })
    }
}

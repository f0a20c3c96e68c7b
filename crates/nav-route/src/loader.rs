//! CSV marina registry loader.
//!
//! # CSV format
//!
//! One row per marina.  `depth_m` and `facilities` may be empty.
//!
//! ```csv
//! id,name,lat,lon,kind,access,depth_m,facilities
//! 1,Bahrain Yacht Club,26.1762,50.6125,marina,customers,3.5,fuel;water;repairs
//! 2,Sitra Slipway,26.1540,50.6350,slipway,public,,
//! ```
//!
//! **`kind`**: `marina`, `harbor` (or `harbour`), `slipway`, `boat_ramp`
//! (or `boatRamp`), `port`.
//!
//! **`access`**: `public`, `private`, `customers`, `permissive`.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use nav_core::{GeoPoint, MarinaId};

use crate::{AccessType, Marina, MarinaKind, MarinaRegistry, RouteError, RouteResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct MarinaRecord {
    id:         u32,
    name:       String,
    lat:        f64,
    lon:        f64,
    kind:       String,
    access:     String,
    depth_m:    Option<f64>,
    #[serde(default)]
    facilities: String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a [`MarinaRegistry`] from a CSV file.
pub fn load_marinas_csv(path: &Path) -> RouteResult<MarinaRegistry> {
    let file = std::fs::File::open(path)?;
    load_marinas_reader(file)
}

/// Like [`load_marinas_csv`] but accepts any `Read` source.
pub fn load_marinas_reader<R: Read>(reader: R) -> RouteResult<MarinaRegistry> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut marinas = Vec::new();

    for result in csv_reader.deserialize::<MarinaRecord>() {
        let row = result.map_err(|e| RouteError::Parse(e.to_string()))?;
        marinas.push(Marina {
            id:         MarinaId(row.id),
            name:       row.name,
            location:   GeoPoint::new(row.lat, row.lon),
            kind:       parse_kind(&row.kind)?,
            access:     parse_access(&row.access)?,
            depth_m:    row.depth_m,
            facilities: row
                .facilities
                .split(';')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_owned)
                .collect(),
        });
    }

    Ok(MarinaRegistry::new(marinas))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_kind(s: &str) -> RouteResult<MarinaKind> {
    match s.trim() {
        "marina" => Ok(MarinaKind::Marina),
        "harbor" | "harbour" => Ok(MarinaKind::Harbor),
        "slipway" => Ok(MarinaKind::Slipway),
        "boat_ramp" | "boatRamp" => Ok(MarinaKind::BoatRamp),
        "port" => Ok(MarinaKind::Port),
        other => Err(RouteError::Parse(format!("unknown marina kind {other:?}"))),
    }
}

fn parse_access(s: &str) -> RouteResult<AccessType> {
    match s.trim() {
        "public" => Ok(AccessType::Public),
        "private" => Ok(AccessType::Private),
        "customers" => Ok(AccessType::Customers),
        "permissive" => Ok(AccessType::Permissive),
        other => Err(RouteError::Parse(format!("unknown access type {other:?}"))),
    }
}

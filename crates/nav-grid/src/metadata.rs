//! Mask metadata record and its JSON loader.
//!
//! # JSON format
//!
//! The rasterizer writes a companion file next to each mask:
//!
//! ```json
//! {
//!   "bbox": { "min_lon": 50.3, "min_lat": 25.5, "max_lon": 50.9, "max_lat": 26.4 },
//!   "grid": { "width": 600, "height": 900, "resolution_degrees": 0.001 },
//!   "projection": "EPSG:4326",
//!   "encoding": { "water": 1, "land": 0 }
//! }
//! ```
//!
//! Extra keys (`resolution_meters_approx`, `projection`, …) are ignored.
//! `encoding` is optional and defaults to water = 1, land = 0.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use nav_core::GeoPoint;

use crate::{GridError, GridResult};

// ── MaskMetadata ──────────────────────────────────────────────────────────────

/// Everything needed to interpret the raw mask bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskMetadata {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
    /// Cell edge length in degrees (same in both axes).
    pub resolution_deg: f64,
    pub width: usize,
    pub height: usize,
    /// Byte value that marks a water cell.
    pub water_value: u8,
    /// Byte value that marks a land cell.
    pub land_value: u8,
}

impl MaskMetadata {
    /// Metadata for a grid whose bounding box is exactly `width × height`
    /// cells of `resolution_deg`, anchored at `(min_lat, min_lon)`.
    pub fn from_origin(
        min_lat: f64,
        min_lon: f64,
        resolution_deg: f64,
        width: usize,
        height: usize,
    ) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat: min_lat + resolution_deg * height as f64,
            max_lon: min_lon + resolution_deg * width as f64,
            resolution_deg,
            width,
            height,
            water_value: 1,
            land_value: 0,
        }
    }

    /// Number of cells the mask must contain.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// `true` if `p` lies inside the (closed) bounding box.
    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lat >= self.min_lat && p.lat <= self.max_lat && p.lon >= self.min_lon && p.lon <= self.max_lon
    }

    /// Sanity checks that do not depend on the mask bytes.
    pub fn validate(&self) -> GridResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GridError::InvalidMetadata(format!(
                "grid dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.resolution_deg.is_finite() && self.resolution_deg > 0.0) {
            return Err(GridError::InvalidMetadata(format!(
                "resolution must be positive, got {}",
                self.resolution_deg
            )));
        }
        if self.min_lat >= self.max_lat || self.min_lon >= self.max_lon {
            return Err(GridError::InvalidMetadata("bounding box is empty".into()));
        }
        if self.water_value == self.land_value {
            return Err(GridError::InvalidMetadata(
                "water and land encodings must differ".into(),
            ));
        }
        Ok(())
    }

    // ── Loading ───────────────────────────────────────────────────────────

    /// Parse the rasterizer's JSON metadata from a string.
    pub fn from_json_str(json: &str) -> GridResult<Self> {
        let raw: RawMetadata = serde_json::from_str(json)?;
        Ok(raw.into())
    }

    /// Like [`from_json_str`](Self::from_json_str) but accepts any `Read` source.
    pub fn from_json_reader<R: Read>(reader: R) -> GridResult<Self> {
        let raw: RawMetadata = serde_json::from_reader(reader)?;
        Ok(raw.into())
    }

    /// Load the metadata file at `path`.
    pub fn from_json_file(path: &Path) -> GridResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }
}

// ── On-disk shape ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawMetadata {
    bbox:     RawBbox,
    grid:     RawGrid,
    #[serde(default)]
    encoding: RawEncoding,
}

#[derive(Deserialize)]
struct RawBbox {
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
}

#[derive(Deserialize)]
struct RawGrid {
    width:              usize,
    height:             usize,
    resolution_degrees: f64,
}

#[derive(Deserialize)]
struct RawEncoding {
    water: u8,
    land:  u8,
}

impl Default for RawEncoding {
    fn default() -> Self {
        Self { water: 1, land: 0 }
    }
}

impl From<RawMetadata> for MaskMetadata {
    fn from(raw: RawMetadata) -> Self {
        Self {
            min_lat:        raw.bbox.min_lat,
            min_lon:        raw.bbox.min_lon,
            max_lat:        raw.bbox.max_lat,
            max_lon:        raw.bbox.max_lon,
            resolution_deg: raw.grid.resolution_degrees,
            width:          raw.grid.width,
            height:         raw.grid.height,
            water_value:    raw.encoding.water,
            land_value:     raw.encoding.land,
        }
    }
}

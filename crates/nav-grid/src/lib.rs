//! `nav-grid` — the land/water navigability mask and its overlays.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`metadata`] | `MaskMetadata` and its JSON loader                         |
//! | [`grid`]     | `NavigabilityGrid`, `CellIndex`, `CellState`, `AreaStats`  |
//! | [`slot`]     | `MaskSlot` — load-once shared handle                       |
//! | [`zones`]    | `RestrictedZone`, `RestrictedZones` (polygon overlays)     |
//! | [`depth`]    | `DepthMap` — sparse per-cell depth soundings               |
//! | [`error`]    | `GridError`, `GridResult<T>`                               |
//!
//! # Mask asset
//!
//! The mask is `width × height` single-byte cells, row-major, row 0 at
//! `min_lat`, column 0 at `min_lon`.  The byte values are declared by the
//! metadata (`1` = water, `0` = land by default).  Both files are produced
//! by an offline rasterizer; this crate only consumes them.

pub mod depth;
pub mod error;
pub mod grid;
pub mod metadata;
pub mod slot;
pub mod zones;


pub use depth::DepthMap;
pub use error::{GridError, GridResult};
pub use grid::{AreaStats, CellIndex, CellState, NavigabilityGrid};
pub use metadata::MaskMetadata;
pub use slot::MaskSlot;
pub use zones::{RestrictedZone, RestrictedZones};

//! `nav-core` — foundational types for hybrid land/marine navigation.
//!
//! This crate is a dependency of every other `nav-*` crate.  It has no
//! `nav-*` dependencies and only `thiserror` (plus optional `serde`) from the
//! outside world.
//!
//! # What lives here
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`geo`]       | `GeoPoint`, haversine, bearings, polyline distances       |
//! | [`ids`]       | `RouteId`, `SessionId`, `WaypointId`, `MarinaId`          |
//! | [`time`]      | `Timestamp` (Unix milliseconds)                           |
//! | [`transport`] | `TransportMode` enum                                      |
//! | [`config`]    | `NavConfig` and its per-component sections                |
//! | [`cancel`]    | `CancelToken` for background computations                 |
//! | [`error`]     | `NavError`, `NavResult`                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod cancel;
pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod time;
pub mod transport;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cancel::CancelToken;
pub use config::{NavConfig, RouteConfig, SearchConfig, SessionConfig, WeatherConfig};
pub use error::{NavError, NavResult};
pub use geo::{GeoPoint, EARTH_RADIUS_M, METERS_PER_DEGREE};
pub use ids::{MarinaId, RouteId, SessionId, WaypointId};
pub use time::Timestamp;
pub use transport::TransportMode;

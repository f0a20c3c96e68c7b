//! `nav-route` — assembles complete origin → destination routes.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                         |
//! |---------------|------------------------------------------------------------------|
//! | [`model`]     | `NavigationRoute`, `RouteSegment`, `Waypoint`, metrics, validation |
//! | [`marina`]    | `Marina`, `MarinaKind`, `AccessType`, `MarinaRegistry` (R-tree)  |
//! | [`loader`]    | CSV marina registry loader                                       |
//! | [`land`]      | `LandRouter` trait, `LandRoute`, `DirectLandRouter`              |
//! | [`waypoints`] | Waypoint synthesis (turns, marina handoffs, instructions)        |
//! | [`assembler`] | `RouteRequest`, `RoutePlanner` trait, `RouteAssembler`           |
//! | [`error`]     | `RouteError`, `RouteResult<T>`                                   |
//!
//! # Leg classification
//!
//! Every consecutive pair of request points (origin, via points,
//! destination) is one leg:
//!
//! | Start  | End    | Segments                                         |
//! |--------|--------|--------------------------------------------------|
//! | water  | water  | marine                                           |
//! | land   | water  | land → marina, marine                            |
//! | water  | land   | marine, marina → land                            |
//! | land   | land   | land; if the land router fails, land → marine → land through two marinas |

pub mod assembler;
pub mod error;
pub mod land;
pub mod loader;
pub mod marina;
pub mod model;
pub mod waypoints;


pub use assembler::{RouteAssembler, RoutePlanner, RouteRequest};
pub use error::{RouteError, RouteResult};
pub use land::{DirectLandRouter, LandRoute, LandRouter};
pub use loader::{load_marinas_csv, load_marinas_reader};
pub use marina::{AccessType, Marina, MarinaKind, MarinaRegistry};
pub use model::{
    NavigationRoute, RouteMetrics, RouteSegment, RouteValidation, SegmentType, Waypoint,
    WaypointType,
};

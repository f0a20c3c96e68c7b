//! `nav-session` — follows a traveler along an assembled route.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`state`]   | `NavigationState`, `SessionEvent`, the transition table        |
//! | [`session`] | `NavigationSession`, `NavigationMetrics`, breadcrumbs, summary |
//! | [`engine`]  | `SessionEngine`, `LocationUpdate`, `UpdateOutcome`             |
//! | [`tasks`]   | `TaskSpawner` trait, `RayonSpawner`, `InlineSpawner`           |
//! | [`error`]   | `SessionError`, `SessionResult<T>`                             |
//!
//! # Threading model
//!
//! The engine is the single writer of its session.  Location updates are
//! processed one at a time on the caller's thread.  Recalculations run on a
//! [`TaskSpawner`] (the rayon pool by default) and report back over a
//! crossbeam channel that the engine drains before each update and on idle
//! ticks; a result never touches the session from the worker thread.

pub mod engine;
pub mod error;
pub mod session;
pub mod state;
pub mod tasks;

#[cfg(test)]
mod tests;

pub use engine::{LocationUpdate, SessionEngine, UpdateOutcome};
pub use error::{SessionError, SessionResult};
pub use session::{Breadcrumb, NavigationMetrics, NavigationSession, SessionSummary};
pub use state::{ErrorReason, NavigationState, SessionEvent};
pub use tasks::{InlineSpawner, RayonSpawner, TaskSpawner};

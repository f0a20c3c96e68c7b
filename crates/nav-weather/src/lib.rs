//! `nav-weather` — weather samples → per-cell cost multipliers.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`severity`] | `Severity`, threshold constants, per-metric classification   |
//! | [`model`]    | `WeatherSample`, `WeatherCost`, `WeatherCostModel`           |
//! | [`provider`] | `WeatherProvider` trait (external collaborator contract)     |
//! | [`error`]    | `WeatherError`, `WeatherResult<T>`                           |
//!
//! # Cost model
//!
//! Each sample's wave height, wind speed, and visibility are classified
//! independently; the cell takes the multiplier of the worst one:
//!
//! | Severity    | Multiplier                |
//! |-------------|---------------------------|
//! | `Normal`    | 1×                        |
//! | `Caution`   | 2×                        |
//! | `Dangerous` | 5×                        |
//! | `Blocked`   | impassable (not a cost)   |
//!
//! Cells with no sample yet are `Normal` (fail-open).

pub mod error;
pub mod model;
pub mod provider;
pub mod severity;


pub use error::{WeatherError, WeatherResult};
pub use model::{WeatherCost, WeatherCostModel, WeatherSample};
pub use provider::WeatherProvider;
pub use severity::Severity;

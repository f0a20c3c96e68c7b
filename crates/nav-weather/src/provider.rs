//! Contract for the external weather data source.

use crate::{WeatherResult, WeatherSample};

/// Supplies the latest coarse weather samples.
///
/// The provider may return samples for any subset of cells; a cell left out
/// is not an error, it simply reverts to `Normal`.  Implementations must be
/// `Send + Sync` so refreshes can run off the location-update thread.
pub trait WeatherProvider: Send + Sync {
    fn fetch(&self) -> WeatherResult<Vec<WeatherSample>>;
}

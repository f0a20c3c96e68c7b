//! Wall-clock time model.
//!
//! Every timestamp in the system is a `Timestamp`: milliseconds since the
//! Unix epoch.  Location updates carry their own timestamp, so session
//! metrics are computed from the update stream rather than from the host
//! clock, which keeps replayed tracks deterministic.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Current host time.  Clocks set before 1970 read as the epoch.
    pub fn now() -> Self {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Timestamp(ms)
    }

    #[inline]
    pub fn from_secs(secs: u64) -> Self {
        Timestamp(secs * 1_000)
    }

    /// The timestamp `ms` milliseconds after `self`.
    #[inline]
    pub fn offset_ms(self, ms: u64) -> Timestamp {
        Timestamp(self.0 + ms)
    }

    /// Milliseconds elapsed from `earlier` to `self`; zero if `earlier` is later.
    #[inline]
    pub fn millis_since(self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    #[inline]
    pub fn secs_since(self, earlier: Timestamp) -> f64 {
        self.millis_since(earlier) as f64 / 1_000.0
    }
}

impl std::ops::Add<u64> for Timestamp {
    type Output = Timestamp;
    #[inline]
    fn add(self, rhs_ms: u64) -> Timestamp {
        Timestamp(self.0 + rhs_ms)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}s", self.0 / 1_000, self.0 % 1_000)
    }
}

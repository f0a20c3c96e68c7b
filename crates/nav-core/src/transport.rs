//! Transportation mode enum shared by route segments and land routers.

/// The means by which a segment of a route is travelled.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum TransportMode {
    /// Private vehicle (default land mode).
    #[default]
    Car,
    /// On foot.
    Walk,
    /// Bicycle.
    Bike,
    /// Small craft on the water.
    Boat,
}

impl TransportMode {
    /// `true` for modes that travel over water.
    #[inline]
    pub fn is_marine(self) -> bool {
        matches!(self, TransportMode::Boat)
    }

    /// Nominal cruising speed in metres per second, used when a collaborator
    /// supplies a polyline without a duration.
    pub fn nominal_speed_mps(self) -> f64 {
        match self {
            TransportMode::Car  => 13.9,
            TransportMode::Walk => 1.4,
            TransportMode::Bike => 4.2,
            TransportMode::Boat => 5.14,
        }
    }

    /// Human-readable label.
    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Car  => "car",
            TransportMode::Walk => "walk",
            TransportMode::Bike => "bike",
            TransportMode::Boat => "boat",
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

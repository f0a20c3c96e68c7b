//! Severity classes and the fixed thresholds behind them.

// ── Thresholds ────────────────────────────────────────────────────────────────

/// Wave height (m) at which each class begins: caution, dangerous, blocked.
pub const WAVE_HEIGHT_M: [f64; 3] = [1.0, 2.0, 3.0];

/// Wind speed (km/h) at which each class begins: caution, dangerous, blocked.
pub const WIND_SPEED_KMH: [f64; 3] = [20.0, 35.0, 50.0];

/// Visibility (m) below which each class begins: caution, dangerous, blocked.
pub const VISIBILITY_M: [f64; 3] = [5_000.0, 2_000.0, 500.0];

pub const CAUTION_MULTIPLIER: f64 = 2.0;
pub const DANGEROUS_MULTIPLIER: f64 = 5.0;

// ── Severity ──────────────────────────────────────────────────────────────────

/// Weather severity of one cell, ordered from best to worst.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub enum Severity {
    #[default]
    Normal,
    Caution,
    Dangerous,
    Blocked,
}

impl Severity {
    /// Classify a value where larger is worse.
    fn rising(value: f64, bounds: [f64; 3]) -> Severity {
        if value >= bounds[2] {
            Severity::Blocked
        } else if value >= bounds[1] {
            Severity::Dangerous
        } else if value >= bounds[0] {
            Severity::Caution
        } else {
            Severity::Normal
        }
    }

    pub fn from_wave_height(m: f64) -> Severity {
        Self::rising(m, WAVE_HEIGHT_M)
    }

    pub fn from_wind_speed(kmh: f64) -> Severity {
        Self::rising(kmh, WIND_SPEED_KMH)
    }

    /// Smaller visibility is worse.
    pub fn from_visibility(m: f64) -> Severity {
        if m < VISIBILITY_M[2] {
            Severity::Blocked
        } else if m < VISIBILITY_M[1] {
            Severity::Dangerous
        } else if m < VISIBILITY_M[0] {
            Severity::Caution
        } else {
            Severity::Normal
        }
    }

    /// Cost multiplier, or `None` when the cell is impassable.
    pub fn multiplier(self) -> Option<f64> {
        match self {
            Severity::Normal    => Some(1.0),
            Severity::Caution   => Some(CAUTION_MULTIPLIER),
            Severity::Dangerous => Some(DANGEROUS_MULTIPLIER),
            Severity::Blocked   => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Normal    => "normal",
            Severity::Caution   => "caution",
            Severity::Dangerous => "dangerous",
            Severity::Blocked   => "blocked",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

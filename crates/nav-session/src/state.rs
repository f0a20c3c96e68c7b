//! Session state machine.
//!
//! ```text
//!   Planning ──RouteReady──► Ready ──Start──► Active ◄──Resume── Paused
//!      │                                     │  │  └───Pause───────►│
//!      └─PlanFailed─► Error ◄──────Fail──────┘  └─Arrive─► Completed │
//!                      ▲                                             │
//!                      └──────────────────Fail───────────────────────┘
//!
//!   Cancel: any non-terminal state ──► Cancelled
//! ```
//!
//! Every state change goes through [`NavigationState::transition`]; pairs
//! not in the table are rejected with `InvalidTransition`.

use std::fmt;

use crate::{SessionError, SessionResult};

/// Why a session ended in `Error`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorReason {
    /// Still off-route after the allowed number of recalculations.
    RecalculationLimitExceeded,
    /// The initial plan could not be built.
    RouteUnreachable(String),
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorReason::RecalculationLimitExceeded => f.write_str("recalculation limit exceeded"),
            ErrorReason::RouteUnreachable(msg) => write!(f, "route unreachable: {msg}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationState {
    Planning,
    Ready,
    Active,
    Paused,
    Completed,
    Cancelled,
    Error(ErrorReason),
}

/// Inputs to the state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    RouteReady,
    PlanFailed(String),
    Start,
    Pause,
    Resume,
    Cancel,
    Arrive,
    Fail(ErrorReason),
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::RouteReady    => "route-ready",
            SessionEvent::PlanFailed(_) => "plan-failed",
            SessionEvent::Start         => "start",
            SessionEvent::Pause         => "pause",
            SessionEvent::Resume        => "resume",
            SessionEvent::Cancel        => "cancel",
            SessionEvent::Arrive        => "arrive",
            SessionEvent::Fail(_)       => "fail",
        }
    }
}

impl NavigationState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            NavigationState::Completed | NavigationState::Cancelled | NavigationState::Error(_)
        )
    }

    pub fn is_active(&self) -> bool {
        *self == NavigationState::Active
    }

    /// Short label for logs and UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationState::Planning  => "planning",
            NavigationState::Ready     => "ready",
            NavigationState::Active    => "navigating",
            NavigationState::Paused    => "paused",
            NavigationState::Completed => "arrived",
            NavigationState::Cancelled => "cancelled",
            NavigationState::Error(_)  => "error",
        }
    }

    /// The state reached by applying `event`, or `InvalidTransition`.
    pub fn transition(&self, event: SessionEvent) -> SessionResult<NavigationState> {
        use NavigationState as S;
        use SessionEvent as E;

        let next = match (self, event) {
            (S::Planning, E::RouteReady) => S::Ready,
            (S::Planning, E::PlanFailed(msg)) => S::Error(ErrorReason::RouteUnreachable(msg)),
            (S::Ready, E::Start) => S::Active,
            (S::Active, E::Pause) => S::Paused,
            (S::Paused, E::Resume) => S::Active,
            (S::Active, E::Arrive) => S::Completed,
            (S::Active | S::Paused, E::Fail(reason)) => S::Error(reason),
            (s, E::Cancel) if !s.is_terminal() => S::Cancelled,
            (s, e) => {
                return Err(SessionError::InvalidTransition { from: s.as_str(), event: e.name() });
            }
        };
        Ok(next)
    }
}

impl fmt::Display for NavigationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationState::Error(reason) => write!(f, "error ({reason})"),
            other => f.write_str(other.as_str()),
        }
    }
}

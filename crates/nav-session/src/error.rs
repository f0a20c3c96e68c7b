//! Session error type.

use thiserror::Error;

/// Errors produced by `nav-session`.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot apply {event} to a session that is {from}")]
    InvalidTransition { from: &'static str, event: &'static str },
}

pub type SessionResult<T> = Result<T, SessionError>;

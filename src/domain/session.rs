//! Recording session state machine

use std::fmt;
use thiserror::Error;

/// Session-level states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Recording,
    Paused,
    Stopping,
    Finished,
    Discarded,
}

impl SessionState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Paused => "paused",
            Self::Stopping => "stopping",
            Self::Finished => "finished",
            Self::Discarded => "discarded",
        }
    }

    /// Capture is live and the engine may still emit fragments
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Recording | Self::Paused)
    }

    /// Terminal states never transition again
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Discarded)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an operation violates a state precondition
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("recording has already been started; create a new session to record again")]
    AlreadyStarted,

    #[error("cannot {action} while the session is {state}")]
    InvalidState {
        action: &'static str,
        state: SessionState,
    },

    #[error("nothing to stop: the session is {state}")]
    NothingToStop { state: SessionState },
}

/// Session lifecycle entity.
/// Guards every transition of a recording session.
///
/// State machine:
///   IDLE -> RECORDING (begin_capture)
///   RECORDING <-> PAUSED (pause / resume)
///   RECORDING | PAUSED -> STOPPING (begin_stop / begin_discard)
///   STOPPING -> FINISHED (finish)
///   STOPPING -> DISCARDED (finish_discarded)
#[derive(Debug, Default)]
pub struct SessionLifecycle {
    state: SessionState,
}

impl SessionLifecycle {
    /// Create a new lifecycle in idle state
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
        }
    }

    /// Get the current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check that capture has never been started on this session
    pub fn ensure_unstarted(&self) -> Result<(), StateError> {
        if self.state != SessionState::Idle {
            return Err(StateError::AlreadyStarted);
        }
        Ok(())
    }

    /// Transition from IDLE to RECORDING
    pub fn begin_capture(&mut self) -> Result<(), StateError> {
        if self.state != SessionState::Idle {
            return Err(StateError::AlreadyStarted);
        }
        self.state = SessionState::Recording;
        Ok(())
    }

    /// Transition from RECORDING to PAUSED
    pub fn pause(&mut self) -> Result<(), StateError> {
        if self.state != SessionState::Recording {
            return Err(StateError::InvalidState {
                action: "pause",
                state: self.state,
            });
        }
        self.state = SessionState::Paused;
        Ok(())
    }

    /// Transition from PAUSED to RECORDING
    pub fn resume(&mut self) -> Result<(), StateError> {
        if self.state != SessionState::Paused {
            return Err(StateError::InvalidState {
                action: "resume",
                state: self.state,
            });
        }
        self.state = SessionState::Recording;
        Ok(())
    }

    /// Transition from RECORDING or PAUSED to STOPPING (keep the result)
    pub fn begin_stop(&mut self) -> Result<(), StateError> {
        if !self.state.is_active() {
            return Err(StateError::NothingToStop { state: self.state });
        }
        self.state = SessionState::Stopping;
        Ok(())
    }

    /// Transition from RECORDING or PAUSED to STOPPING (drop the result)
    pub fn begin_discard(&mut self) -> Result<(), StateError> {
        if !self.state.is_active() {
            return Err(StateError::InvalidState {
                action: "discard",
                state: self.state,
            });
        }
        self.state = SessionState::Stopping;
        Ok(())
    }

    /// Terminal transition once finalization is observed and the result is kept
    pub fn finish(&mut self) {
        self.state = SessionState::Finished;
    }

    /// Terminal transition once finalization is observed and the result is dropped
    pub fn finish_discarded(&mut self) {
        self.state = SessionState::Discarded;
    }
}

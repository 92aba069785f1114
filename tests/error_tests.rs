//! Error surface integration tests
//!
//! Every taxonomy member must carry a stable, human-readable message that is
//! distinct from every other member, so callers can branch on kind and users
//! never see an opaque "error" string.

use std::collections::HashSet;

use micclip::application::ports::EngineError;
use micclip::application::session::SessionError;
use micclip::domain::error::AcquireError;
use micclip::domain::session::{SessionState, StateError};

fn acquire_errors() -> Vec<AcquireError> {
    vec![
        AcquireError::CapabilityUnsupported,
        AcquireError::DeviceMissing,
        AcquireError::DeviceUnavailable,
        AcquireError::ConstraintsUnsatisfiable,
        AcquireError::PermissionDenied,
        AcquireError::InvalidConstraints,
        AcquireError::AcquisitionFailed {
            reason: "VendorError".to_string(),
        },
    ]
}

#[test]
fn acquire_error_messages_are_distinct() {
    let errors = acquire_errors();
    let messages: HashSet<String> = errors.iter().map(|e| e.to_string()).collect();

    assert_eq!(messages.len(), errors.len());
    assert!(messages.iter().all(|m| !m.is_empty()));
}

#[test]
fn catch_all_message_keeps_the_platform_reason() {
    let err = AcquireError::AcquisitionFailed {
        reason: "GstreamerSaidNo".to_string(),
    };
    assert!(err.to_string().contains("GstreamerSaidNo"));
}

#[test]
fn state_error_messages_name_the_offending_state() {
    let err = StateError::InvalidState {
        action: "resume",
        state: SessionState::Recording,
    };
    let msg = err.to_string();
    assert!(msg.contains("resume"));
    assert!(msg.contains("recording"));

    let err = StateError::NothingToStop {
        state: SessionState::Finished,
    };
    assert!(err.to_string().contains("finished"));
}

#[test]
fn state_error_messages_are_distinct() {
    let errors = [
        StateError::AlreadyStarted.to_string(),
        StateError::InvalidState {
            action: "pause",
            state: SessionState::Idle,
        }
        .to_string(),
        StateError::NothingToStop {
            state: SessionState::Idle,
        }
        .to_string(),
    ];
    let messages: HashSet<&String> = errors.iter().collect();
    assert_eq!(messages.len(), errors.len());
}

#[test]
fn session_error_wraps_state_errors_transparently() {
    let inner = StateError::AlreadyStarted;
    let wrapped = SessionError::from(inner.clone());
    assert_eq!(wrapped.to_string(), inner.to_string());
}

#[test]
fn session_error_wraps_acquire_errors_transparently() {
    let inner = AcquireError::PermissionDenied;
    let wrapped = SessionError::from(inner.clone());
    assert_eq!(wrapped.to_string(), inner.to_string());
}

#[test]
fn engine_errors_carry_their_detail() {
    let err = SessionError::from(EngineError::StartFailed("stream busy".to_string()));
    let msg = err.to_string();
    assert!(msg.contains("capture engine failure"));
    assert!(msg.contains("stream busy"));
}

#[test]
fn discarded_has_its_own_message() {
    let msg = SessionError::Discarded.to_string();
    assert!(msg.contains("discarded"));
}

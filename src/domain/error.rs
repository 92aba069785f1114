//! Device acquisition error taxonomy

use thiserror::Error;

/// Closed taxonomy for device-acquisition failures.
///
/// Platform-specific reason codes never escape as the primary error; anything
/// unrecognized is surfaced as `AcquisitionFailed` with the original reason
/// kept as diagnostic context.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AcquireError {
    #[error("audio capture is not supported by this runtime")]
    CapabilityUnsupported,

    #[error("no matching audio input device was found")]
    DeviceMissing,

    #[error("the audio input device is already in use or not readable")]
    DeviceUnavailable,

    #[error("no available device can satisfy the requested constraints")]
    ConstraintsUnsatisfiable,

    #[error("permission to use the audio input device was denied")]
    PermissionDenied,

    #[error("the device request constraints are malformed")]
    InvalidConstraints,

    #[error("device acquisition failed ({reason})")]
    AcquisitionFailed { reason: String },
}

//! Device acquisition use case
//!
//! Requests exclusive use of an audio input device and normalizes the
//! platform's open-ended denial reasons into the closed `AcquireError`
//! taxonomy.

use tracing::{debug, warn};

use crate::domain::capture::DeviceConstraints;
use crate::domain::error::AcquireError;

use super::ports::{CapturePlatform, PlatformDenial};

/// Map a platform denial onto the closed taxonomy.
///
/// Total over every input: reason codes not recognized here fall through to
/// `AcquisitionFailed`, keeping the original reason as diagnostic context.
pub fn normalize_denial(denial: &PlatformDenial) -> AcquireError {
    match denial.reason.as_str() {
        "NotFoundError" | "DevicesNotFoundError" => AcquireError::DeviceMissing,
        "NotReadableError" | "TrackStartError" => AcquireError::DeviceUnavailable,
        "OverconstrainedError" | "ConstraintNotSatisfiedError" => {
            AcquireError::ConstraintsUnsatisfiable
        }
        "NotAllowedError" | "PermissionDeniedError" => AcquireError::PermissionDenied,
        "TypeError" => AcquireError::InvalidConstraints,
        other => AcquireError::AcquisitionFailed {
            reason: other.to_string(),
        },
    }
}

/// Acquire an audio-only input device.
///
/// The capability probe is checked eagerly, before any platform call.
pub async fn acquire_audio_input<P: CapturePlatform>(
    platform: &P,
    constraints: &DeviceConstraints,
) -> Result<P::Device, AcquireError> {
    if !platform.is_supported() {
        return Err(AcquireError::CapabilityUnsupported);
    }

    debug!(?constraints, "requesting audio input device");
    platform.request_device(constraints).await.map_err(|denial| {
        warn!(
            reason = %denial.reason,
            detail = denial.detail.as_deref().unwrap_or(""),
            "audio input request denied"
        );
        normalize_denial(&denial)
    })
}

//! Capture platform port

use async_trait::async_trait;

use crate::domain::capture::{DeviceConstraints, Encoding};

use super::engine::{CaptureEngine, CaptureObserver, EngineError};

/// Failure reported by the platform when a device request is denied.
///
/// `reason` is an open-ended, platform-specific reason code. It must be
/// normalized into the closed `AcquireError` taxonomy before it reaches a
/// caller (see `application::acquisition`).
#[derive(Debug, Clone)]
pub struct PlatformDenial {
    pub reason: String,
    pub detail: Option<String>,
}

impl PlatformDenial {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            detail: None,
        }
    }

    pub fn with_detail(reason: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            detail: Some(detail.into()),
        }
    }
}

/// Port for the platform audio-capture capability
#[async_trait]
pub trait CapturePlatform: Send + Sync {
    /// Opaque handle for an acquired input device
    type Device: Send;

    /// Capability probe: does the runtime expose device acquisition at all?
    /// Pure check, no side effects.
    fn is_supported(&self) -> bool;

    /// Capability probe: can the platform encoder produce this format?
    fn is_format_supported(&self, format: &str) -> bool;

    /// Request exclusive use of an audio-only input device
    async fn request_device(
        &self,
        constraints: &DeviceConstraints,
    ) -> Result<Self::Device, PlatformDenial>;

    /// Build a capture engine bound to an acquired device
    fn build_engine(
        &self,
        device: Self::Device,
        encoding: Encoding,
        observer: CaptureObserver,
    ) -> Result<Box<dyn CaptureEngine>, EngineError>;
}

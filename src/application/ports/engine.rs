//! Capture engine port

use std::sync::Arc;

use thiserror::Error;

/// Capture engine runtime errors
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("failed to start the capture stream: {0}")]
    StartFailed(String),

    #[error("the capture stream failed: {0}")]
    StreamFailed(String),

    #[error("failed to encode the captured audio: {0}")]
    EncodeFailed(String),
}

/// Callback invoked with each emitted fragment, in emission order
pub type FragmentCallback = Arc<dyn Fn(Vec<u8>) + Send + Sync>;

/// Callback invoked exactly once when the engine has finalized
pub type FinalizedCallback = Arc<dyn Fn() + Send + Sync>;

/// Observers a session registers on its capture engine
#[derive(Clone)]
pub struct CaptureObserver {
    pub on_fragment: FragmentCallback,
    pub on_finalized: FinalizedCallback,
}

/// Port for a live capture engine bound to one acquired device.
///
/// `finalize` only signals the engine; completion is reported through the
/// `on_finalized` observer, exactly once per engine instance, after the
/// underlying device has been released.
pub trait CaptureEngine: Send {
    /// Begin capturing and emitting fragments
    fn start(&mut self) -> Result<(), EngineError>;

    /// Suspend fragment emission without releasing the device
    fn pause(&mut self) -> Result<(), EngineError>;

    /// Resume fragment emission after a pause
    fn resume(&mut self) -> Result<(), EngineError>;

    /// Signal the engine to flush, release the device and finalize
    fn finalize(&mut self) -> Result<(), EngineError>;
}

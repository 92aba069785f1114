//! Port interfaces (traits) for the platform capture capability
//!
//! These traits define the boundary between the application
//! and infrastructure layers.

pub mod engine;
pub mod platform;

// Re-export common types
pub use engine::{CaptureEngine, CaptureObserver, EngineError, FinalizedCallback, FragmentCallback};
pub use platform::{CapturePlatform, PlatformDenial};

//! Infrastructure layer - Adapter implementations
//!
//! Contains the concrete implementation of the capture platform port,
//! integrating with the host audio backend through cpal.

pub mod capture;

// Re-export adapters
pub use capture::{capture_supported, encoding_supported, CpalPlatform};

//! Application layer - Use cases and port interfaces
//!
//! Contains the core session operations and trait definitions
//! for the platform capture capability.

pub mod acquisition;
pub mod completion;
pub mod ports;
pub mod session;

// Re-export use cases
pub use acquisition::{acquire_audio_input, normalize_denial};
pub use completion::CompletionGate;
pub use session::{RecordingSession, SessionConfig, SessionError};

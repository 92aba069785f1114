//! Capture infrastructure module
//!
//! Cross-platform audio capture using cpal, with in-memory WAV (hound) and
//! FLAC (flacenc) encoding of the finished recording.

mod cpal_platform;
mod encoder;

pub use cpal_platform::{
    capture_supported, encoding_supported, CpalCaptureEngine, CpalDeviceSpec, CpalPlatform,
};
pub use encoder::{encode, encode_flac, encode_wav};

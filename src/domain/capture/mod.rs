//! Capture value objects: artifacts, encodings, device constraints

mod artifact;
mod constraints;

pub use artifact::{Artifact, Encoding};
pub use constraints::DeviceConstraints;

//! Audio input device request constraints

use serde::{Deserialize, Serialize};

/// Constraints for an audio-only input device request.
///
/// `None` means "whatever the device prefers". Zero values can never be
/// satisfied and are rejected as malformed before any platform call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConstraints {
    /// Preferred capture sample rate in Hz
    pub sample_rate: Option<u32>,
    /// Required input channel count
    pub channels: Option<u16>,
}

impl DeviceConstraints {
    /// Accept any audio input device
    pub fn any() -> Self {
        Self::default()
    }

    /// Require a specific capture sample rate
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Require a specific channel count
    pub fn with_channels(mut self, channels: u16) -> Self {
        self.channels = Some(channels);
        self
    }

    /// A zero rate or zero channel count is a malformed request
    pub fn is_well_formed(&self) -> bool {
        self.sample_rate != Some(0) && self.channels != Some(0)
    }
}

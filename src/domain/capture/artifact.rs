//! Finished recording artifact value object

use std::fmt;

use serde::{Deserialize, Serialize};

/// Encodings the bundled encoders can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Wav,
    Flac,
}

impl Encoding {
    /// Get the MIME type string
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Flac => "audio/flac",
        }
    }

    /// Get the file extension
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Flac => "flac",
        }
    }

    /// Parse a MIME string, tolerating a `; codecs=...` suffix
    pub fn from_mime(mime: &str) -> Option<Self> {
        let base = mime.split(';').next().unwrap_or("").trim();
        match base {
            "audio/wav" | "audio/x-wav" | "audio/wave" => Some(Self::Wav),
            "audio/flac" | "audio/x-flac" => Some(Self::Flac),
            _ => None,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mime_type())
    }
}

impl Default for Encoding {
    fn default() -> Self {
        Self::Wav
    }
}

/// Value object representing a finished recording.
/// Contains the encoded payload and its encoding tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    data: Vec<u8>,
    encoding: Encoding,
}

impl Artifact {
    /// Create an artifact from an already-assembled payload
    pub fn new(data: Vec<u8>, encoding: Encoding) -> Self {
        Self { data, encoding }
    }

    /// Assemble an artifact by concatenating fragments in arrival order
    pub fn from_fragments(fragments: &[Vec<u8>], encoding: Encoding) -> Self {
        let total: usize = fragments.iter().map(Vec::len).sum();
        let mut data = Vec::with_capacity(total);
        for fragment in fragments {
            data.extend_from_slice(fragment);
        }
        Self { data, encoding }
    }

    /// Get the encoded payload
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume and return the encoded payload
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Get the encoding tag
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Get the size in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}

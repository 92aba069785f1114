//! In-memory encoders for finished recordings
//!
//! The capture engine buffers mono i16 PCM at the device rate and hands it
//! here once finalization is signaled. Both encoders produce a complete,
//! self-contained byte stream.

use std::io::Cursor;

use flacenc::bitsink::ByteSink;
use flacenc::component::BitRepr;
use flacenc::config;
use flacenc::error::Verify;
use flacenc::source::MemSource;

use crate::application::ports::EngineError;
use crate::domain::capture::Encoding;

/// Bits per sample (16-bit audio)
const BITS_PER_SAMPLE: usize = 16;

/// Number of channels (mono)
const CHANNELS: usize = 1;

/// Encode PCM samples into the requested container
pub fn encode(
    encoding: Encoding,
    samples: &[i16],
    sample_rate: u32,
) -> Result<Vec<u8>, EngineError> {
    match encoding {
        Encoding::Wav => encode_wav(samples, sample_rate),
        Encoding::Flac => encode_flac(samples, sample_rate),
    }
}

/// Encode PCM samples to an in-memory WAV file
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, EngineError> {
    let spec = hound::WavSpec {
        channels: CHANNELS as u16,
        sample_rate,
        bits_per_sample: BITS_PER_SAMPLE as u16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec)
        .map_err(|e| EngineError::EncodeFailed(format!("WAV writer init failed: {}", e)))?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| EngineError::EncodeFailed(format!("WAV write failed: {}", e)))?;
    }
    writer
        .finalize()
        .map_err(|e| EngineError::EncodeFailed(format!("WAV finalize failed: {}", e)))?;

    Ok(cursor.into_inner())
}

/// Encode PCM samples to FLAC format
pub fn encode_flac(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, EngineError> {
    // flacenc uses i32 internally
    let samples_i32: Vec<i32> = samples.iter().map(|&s| s as i32).collect();

    let config = config::Encoder::default()
        .into_verified()
        .map_err(|(_, e)| EngineError::EncodeFailed(format!("FLAC config error: {:?}", e)))?;

    let source = MemSource::from_samples(
        &samples_i32,
        CHANNELS,
        BITS_PER_SAMPLE,
        sample_rate as usize,
    );

    let flac_stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
        .map_err(|e| EngineError::EncodeFailed(format!("FLAC encoding failed: {:?}", e)))?;

    let mut sink = ByteSink::new();
    flac_stream
        .write(&mut sink)
        .map_err(|e| EngineError::EncodeFailed(format!("FLAC write failed: {}", e)))?;

    Ok(sink.into_inner())
}

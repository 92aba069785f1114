//! cpal-backed capture platform
//!
//! The adapter speaks the same reason-code vocabulary the acquisition layer
//! normalizes ("NotFoundError", "NotReadableError", ...), so every denial it
//! produces lands on a closed taxonomy member.
//!
//! The stream is owned by a dedicated capture thread because cpal::Stream is
//! not Send; the acquired device crosses threads as a descriptor (name plus
//! negotiated config) and the capture thread re-opens it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use tracing::{debug, error, info, warn};

use crate::application::ports::{
    CaptureEngine, CaptureObserver, CapturePlatform, EngineError, PlatformDenial,
};
use crate::domain::capture::{DeviceConstraints, Encoding};

use super::encoder::encode;

/// How long the start handshake waits for the capture thread to come up
const START_TIMEOUT: Duration = Duration::from_secs(5);

/// Capability probe: true iff the host exposes input-device enumeration.
/// Pure check, no device is opened.
pub fn capture_supported() -> bool {
    cpal::default_host().input_devices().is_ok()
}

/// Capability probe: true iff the bundled encoders can produce `format`
pub fn encoding_supported(format: &str) -> bool {
    Encoding::from_mime(format).is_some()
}

/// Descriptor for an acquired input device.
///
/// Holds the device name rather than a live handle; the capture thread
/// re-opens the device when the engine starts.
#[derive(Debug, Clone)]
pub struct CpalDeviceSpec {
    name: Option<String>,
    config: StreamConfig,
    sample_format: SampleFormat,
}

impl CpalDeviceSpec {
    /// Reported device name, if the backend exposes one
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Negotiated capture sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Negotiated channel count
    pub fn channels(&self) -> u16 {
        self.config.channels
    }
}

/// The default-host cpal capture platform
#[derive(Debug, Clone, Copy, Default)]
pub struct CpalPlatform;

#[async_trait]
impl CapturePlatform for CpalPlatform {
    type Device = CpalDeviceSpec;

    fn is_supported(&self) -> bool {
        capture_supported()
    }

    fn is_format_supported(&self, format: &str) -> bool {
        encoding_supported(format)
    }

    async fn request_device(
        &self,
        constraints: &DeviceConstraints,
    ) -> Result<CpalDeviceSpec, PlatformDenial> {
        if !constraints.is_well_formed() {
            return Err(PlatformDenial::new("TypeError"));
        }

        // Device enumeration can block on some backends
        let constraints = *constraints;
        tokio::task::spawn_blocking(move || select_device(&constraints))
            .await
            .map_err(|e| PlatformDenial::with_detail("AbortError", e.to_string()))?
    }

    fn build_engine(
        &self,
        device: CpalDeviceSpec,
        encoding: Encoding,
        observer: CaptureObserver,
    ) -> Result<Box<dyn CaptureEngine>, EngineError> {
        Ok(Box::new(CpalCaptureEngine::new(device, encoding, observer)))
    }
}

/// Pick the default input device and negotiate a stream config for it
fn select_device(constraints: &DeviceConstraints) -> Result<CpalDeviceSpec, PlatformDenial> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| PlatformDenial::new("NotFoundError"))?;
    let name = device.name().ok();

    // Unconstrained requests take the device's preferred config when its
    // sample format is one we can capture
    if constraints.sample_rate.is_none() && constraints.channels.is_none() {
        let default = device
            .default_input_config()
            .map_err(|e| PlatformDenial::with_detail("NotReadableError", e.to_string()))?;
        if matches!(default.sample_format(), SampleFormat::I16 | SampleFormat::F32) {
            let sample_format = default.sample_format();
            let spec = CpalDeviceSpec {
                name,
                config: default.config(),
                sample_format,
            };
            info!(device = spec.name().unwrap_or("unknown"), rate = spec.sample_rate(), "acquired input device");
            return Ok(spec);
        }
    }

    let supported = device
        .supported_input_configs()
        .map_err(|e| PlatformDenial::with_detail("NotReadableError", e.to_string()))?;

    // Only i16 or f32 formats; prefer fewer channels
    let mut best: Option<cpal::SupportedStreamConfigRange> = None;
    for range in supported {
        if range.sample_format() != SampleFormat::I16 && range.sample_format() != SampleFormat::F32
        {
            continue;
        }
        if let Some(wanted) = constraints.channels {
            if range.channels() != wanted {
                continue;
            }
        }
        if let Some(rate) = constraints.sample_rate {
            if range.min_sample_rate().0 > rate || range.max_sample_rate().0 < rate {
                continue;
            }
        }
        let is_better = match &best {
            None => true,
            Some(current) => range.channels() < current.channels(),
        };
        if is_better {
            best = Some(range);
        }
    }

    let range = best.ok_or_else(|| PlatformDenial::new("ConstraintNotSatisfiedError"))?;

    let sample_rate = match constraints.sample_rate {
        Some(rate) => SampleRate(rate),
        None => {
            let capped = range
                .max_sample_rate()
                .0
                .min(48_000)
                .max(range.min_sample_rate().0);
            SampleRate(capped)
        }
    };

    let sample_format = range.sample_format();
    let spec = CpalDeviceSpec {
        name,
        config: StreamConfig {
            channels: range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        },
        sample_format,
    };
    info!(device = spec.name().unwrap_or("unknown"), rate = spec.sample_rate(), "acquired input device");
    Ok(spec)
}

/// Flags and buffer shared with the capture thread and the input callback
struct EngineControl {
    capturing: AtomicBool,
    paused: AtomicBool,
    samples: StdMutex<Vec<i16>>,
}

/// Capture engine running a cpal input stream on a dedicated thread.
///
/// cpal has no native pause, so pausing gates the input callback instead of
/// touching the stream. Finalization drops the stream (releasing the device),
/// encodes the buffered samples, emits them as one fragment and fires the
/// finalization observer, in that order.
pub struct CpalCaptureEngine {
    spec: CpalDeviceSpec,
    encoding: Encoding,
    observer: CaptureObserver,
    control: Arc<EngineControl>,
    started: bool,
}

impl CpalCaptureEngine {
    fn new(spec: CpalDeviceSpec, encoding: Encoding, observer: CaptureObserver) -> Self {
        Self {
            spec,
            encoding,
            observer,
            control: Arc::new(EngineControl {
                capturing: AtomicBool::new(false),
                paused: AtomicBool::new(false),
                samples: StdMutex::new(Vec::new()),
            }),
            started: false,
        }
    }

    /// Mix interleaved frames down to mono
    fn mix_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
        if channels <= 1 {
            return samples.to_vec();
        }

        samples
            .chunks(channels as usize)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    }
}

impl CaptureEngine for CpalCaptureEngine {
    fn start(&mut self) -> Result<(), EngineError> {
        if self.started {
            return Err(EngineError::StartFailed(
                "capture already started on this engine".to_string(),
            ));
        }

        self.control.capturing.store(true, Ordering::SeqCst);
        self.control.paused.store(false, Ordering::SeqCst);

        let (ready_tx, ready_rx) = mpsc::channel();
        let spec = self.spec.clone();
        let encoding = self.encoding;
        let control = Arc::clone(&self.control);
        let observer = self.observer.clone();

        std::thread::spawn(move || capture_loop(spec, encoding, control, observer, ready_tx));

        match ready_rx.recv_timeout(START_TIMEOUT) {
            Ok(Ok(())) => {
                self.started = true;
                Ok(())
            }
            Ok(Err(e)) => {
                self.control.capturing.store(false, Ordering::SeqCst);
                Err(e)
            }
            Err(_) => {
                self.control.capturing.store(false, Ordering::SeqCst);
                Err(EngineError::StartFailed(
                    "capture thread did not report readiness".to_string(),
                ))
            }
        }
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        self.control.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        self.control.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), EngineError> {
        self.control.capturing.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Body of the capture thread: open the stream, run until finalize is
/// signaled, then release the device, encode and notify.
fn capture_loop(
    spec: CpalDeviceSpec,
    encoding: Encoding,
    control: Arc<EngineControl>,
    observer: CaptureObserver,
    ready_tx: mpsc::Sender<Result<(), EngineError>>,
) {
    let stream = match open_stream(&spec, &control) {
        Ok(stream) => {
            let _ = ready_tx.send(Ok(()));
            stream
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    while control.capturing.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(50));
    }

    // Releases the input device before the finalization observer runs
    drop(stream);

    let samples = control
        .samples
        .lock()
        .map(|mut buffer| std::mem::take(&mut *buffer))
        .unwrap_or_default();
    debug!(samples = samples.len(), "capture stopped, encoding");

    match encode(encoding, &samples, spec.sample_rate()) {
        Ok(bytes) => (observer.on_fragment)(bytes),
        Err(e) => error!("failed to encode captured audio: {}", e),
    }

    (observer.on_finalized)();
}

fn resolve_device(name: Option<&str>) -> Result<cpal::Device, EngineError> {
    let host = cpal::default_host();
    match name {
        Some(wanted) => host
            .input_devices()
            .map_err(|e| EngineError::StartFailed(e.to_string()))?
            .find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
            .ok_or_else(|| {
                EngineError::StartFailed(format!("input device '{}' is no longer present", wanted))
            }),
        None => cpal::default_host()
            .default_input_device()
            .ok_or_else(|| EngineError::StartFailed("no default input device".to_string())),
    }
}

fn open_stream(
    spec: &CpalDeviceSpec,
    control: &Arc<EngineControl>,
) -> Result<cpal::Stream, EngineError> {
    let device = resolve_device(spec.name())?;
    let channels = spec.channels();
    let err_fn = |err| warn!("capture stream error: {}", err);

    let stream = match spec.sample_format {
        SampleFormat::I16 => {
            let control = Arc::clone(control);
            device
                .build_input_stream(
                    &spec.config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        if !control.capturing.load(Ordering::SeqCst)
                            || control.paused.load(Ordering::SeqCst)
                        {
                            return;
                        }
                        let mono = CpalCaptureEngine::mix_to_mono(data, channels);
                        if let Ok(mut buffer) = control.samples.lock() {
                            buffer.extend_from_slice(&mono);
                        }
                    },
                    err_fn,
                    None,
                )
                .map_err(|e| EngineError::StartFailed(e.to_string()))?
        }

        SampleFormat::F32 => {
            let control = Arc::clone(control);
            device
                .build_input_stream(
                    &spec.config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        if !control.capturing.load(Ordering::SeqCst)
                            || control.paused.load(Ordering::SeqCst)
                        {
                            return;
                        }
                        let i16_data: Vec<i16> =
                            data.iter().map(|&s| (s * 32767.0) as i16).collect();
                        let mono = CpalCaptureEngine::mix_to_mono(&i16_data, channels);
                        if let Ok(mut buffer) = control.samples.lock() {
                            buffer.extend_from_slice(&mono);
                        }
                    },
                    err_fn,
                    None,
                )
                .map_err(|e| EngineError::StartFailed(e.to_string()))?
        }

        other => {
            return Err(EngineError::StartFailed(format!(
                "unsupported sample format {:?}",
                other
            )))
        }
    };

    stream
        .play()
        .map_err(|e| EngineError::StartFailed(e.to_string()))?;

    Ok(stream)
}

//! Recording session use case
//!
//! Owns one capture engine per session, buffers the fragments it emits and
//! drives the state machine in `domain::session`. The session is intended for
//! a single control flow at a time; the engine's callbacks arrive on its own
//! capture thread, so the half the engine touches lives behind `Arc`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::capture::{Artifact, DeviceConstraints, Encoding};
use crate::domain::error::AcquireError;
use crate::domain::session::{SessionLifecycle, SessionState, StateError};

use super::acquisition::acquire_audio_input;
use super::completion::CompletionGate;
use super::ports::{CaptureEngine, CaptureObserver, CapturePlatform, EngineError};

/// Errors surfaced by a recording session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Acquire(#[from] AcquireError),

    #[error("capture engine failure: {0}")]
    Engine(#[from] EngineError),

    #[error("the recording was discarded before it finished")]
    Discarded,
}

/// Configuration for a recording session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Encoding of the finished artifact
    pub encoding: Encoding,
    /// Constraints for the input device request
    pub constraints: DeviceConstraints,
}

/// The half of the session reachable from the engine's capture thread.
struct SessionShared {
    lifecycle: StdMutex<SessionLifecycle>,
    fragments: StdMutex<Vec<Vec<u8>>>,
    discard_requested: AtomicBool,
    artifact: StdMutex<Option<Artifact>>,
    encoding: Encoding,
    finalized: CompletionGate,
}

impl SessionShared {
    fn new(encoding: Encoding) -> Self {
        Self {
            lifecycle: StdMutex::new(SessionLifecycle::new()),
            fragments: StdMutex::new(Vec::new()),
            discard_requested: AtomicBool::new(false),
            artifact: StdMutex::new(None),
            encoding,
            finalized: CompletionGate::new(),
        }
    }

    fn state(&self) -> SessionState {
        self.lifecycle.lock().unwrap().state()
    }

    /// Append an emitted fragment. The buffer is frozen the instant
    /// finalization occurs; anything emitted after that is dropped.
    fn push_fragment(&self, chunk: Vec<u8>) {
        if self.finalized.is_complete() {
            debug!(len = chunk.len(), "dropping fragment emitted after finalization");
            return;
        }
        if let Ok(mut fragments) = self.fragments.lock() {
            fragments.push(chunk);
        }
    }

    /// Terminal transition, run when the engine reports finalization.
    ///
    /// Observes the discard flag to decide Finished vs Discarded, then opens
    /// the gate. The decision happens under the lifecycle lock and only once,
    /// so a woken `stop()` always sees a fully decided session.
    fn observe_finalization(&self) {
        let mut lifecycle = self.lifecycle.lock().unwrap();
        if self.finalized.is_complete() {
            return;
        }

        if self.discard_requested.load(Ordering::Acquire) {
            lifecycle.finish_discarded();
            info!("recording finalized: discarded");
        } else {
            let fragments = self.fragments.lock().unwrap();
            let artifact = Artifact::from_fragments(&fragments, self.encoding);
            info!(
                fragments = fragments.len(),
                bytes = artifact.size_bytes(),
                "recording finalized"
            );
            drop(fragments);
            *self.artifact.lock().unwrap() = Some(artifact);
            lifecycle.finish();
        }

        self.finalized.complete();
    }
}

/// A managed recording session over a platform capture capability.
///
/// One session produces at most one artifact; once it reaches a terminal
/// state, a new recording requires a new session.
pub struct RecordingSession<P: CapturePlatform> {
    platform: P,
    config: SessionConfig,
    engine: Option<Box<dyn CaptureEngine>>,
    shared: Arc<SessionShared>,
}

impl<P: CapturePlatform> RecordingSession<P> {
    pub fn new(platform: P, config: SessionConfig) -> Self {
        let shared = Arc::new(SessionShared::new(config.encoding));
        Self {
            platform,
            config,
            engine: None,
            shared,
        }
    }

    /// Get the current session state
    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// Capture is live (recording or paused)
    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Number of fragments buffered so far
    pub fn fragment_count(&self) -> usize {
        self.shared.fragments.lock().unwrap().len()
    }

    /// Acquire the input device and begin capturing.
    ///
    /// Fails with `AlreadyStarted` if capture was ever started on this
    /// session. On any failure the session stays idle and no engine is
    /// retained, so no partial session is left behind.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        self.shared.lifecycle.lock().unwrap().ensure_unstarted()?;

        let device = acquire_audio_input(&self.platform, &self.config.constraints).await?;

        let mut engine =
            self.platform
                .build_engine(device, self.config.encoding, self.observer())?;
        engine.start()?;

        self.shared.lifecycle.lock().unwrap().begin_capture()?;
        self.engine = Some(engine);
        info!(encoding = %self.config.encoding, "recording session started");
        Ok(())
    }

    /// Suspend fragment emission. Only valid while recording.
    pub fn pause(&mut self) -> Result<(), SessionError> {
        self.ensure_engine_in(SessionState::Recording, "pause")?;
        if let Some(engine) = self.engine.as_mut() {
            engine.pause()?;
        }
        self.shared.lifecycle.lock().unwrap().pause()?;
        debug!("recording paused");
        Ok(())
    }

    /// Resume fragment emission. Only valid while paused.
    pub fn resume(&mut self) -> Result<(), SessionError> {
        self.ensure_engine_in(SessionState::Paused, "resume")?;
        if let Some(engine) = self.engine.as_mut() {
            engine.resume()?;
        }
        self.shared.lifecycle.lock().unwrap().resume()?;
        debug!("recording resumed");
        Ok(())
    }

    /// Stop capturing and wait for the finished artifact.
    ///
    /// Fails fast with `NothingToStop` unless the session is recording or
    /// paused. Resolves with the concatenated artifact once the engine
    /// reports finalization, or fails with `Discarded` if a discard took
    /// effect first.
    pub async fn stop(&mut self) -> Result<Artifact, SessionError> {
        {
            let mut lifecycle = self.shared.lifecycle.lock().unwrap();
            if self.engine.is_none() {
                return Err(StateError::NothingToStop {
                    state: lifecycle.state(),
                }
                .into());
            }
            lifecycle.begin_stop()?;
            // A stop accepted while capture was still live overrides any
            // discard intent that has not taken effect yet.
            self.shared.discard_requested.store(false, Ordering::Release);
        }

        if let Some(engine) = self.engine.as_mut() {
            engine.finalize()?;
        }

        self.shared.finalized.wait().await;

        if self.shared.state() == SessionState::Discarded {
            return Err(SessionError::Discarded);
        }
        let artifact = self.shared.artifact.lock().unwrap().clone();
        artifact.ok_or(SessionError::Discarded)
    }

    /// Stop capturing and drop the result. No artifact is ever constructed;
    /// any pending `stop()` is rejected once finalization is observed.
    pub fn discard(&mut self) -> Result<(), SessionError> {
        {
            let mut lifecycle = self.shared.lifecycle.lock().unwrap();
            if self.engine.is_none() {
                return Err(StateError::InvalidState {
                    action: "discard",
                    state: lifecycle.state(),
                }
                .into());
            }
            lifecycle.begin_discard()?;
            // Set before the engine is signaled, so the finalization
            // observer cannot miss it.
            self.shared.discard_requested.store(true, Ordering::Release);
        }

        if let Some(engine) = self.engine.as_mut() {
            engine.finalize()?;
        }
        info!("recording discard requested");
        Ok(())
    }

    fn ensure_engine_in(
        &self,
        expected: SessionState,
        action: &'static str,
    ) -> Result<(), SessionError> {
        let state = self.shared.state();
        if self.engine.is_none() || state != expected {
            return Err(StateError::InvalidState { action, state }.into());
        }
        Ok(())
    }

    fn observer(&self) -> CaptureObserver {
        let fragment_target = Arc::clone(&self.shared);
        let finalize_target = Arc::clone(&self.shared);
        CaptureObserver {
            on_fragment: Arc::new(move |chunk| fragment_target.push_fragment(chunk)),
            on_finalized: Arc::new(move || finalize_target.observe_finalization()),
        }
    }
}

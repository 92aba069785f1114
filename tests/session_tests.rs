//! Recording session integration tests
//!
//! Drives the public session surface against fake platform and engine
//! adapters, including both orders of the finalization race.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use micclip::application::ports::{
    CaptureEngine, CaptureObserver, CapturePlatform, EngineError, PlatformDenial,
};
use micclip::application::session::{RecordingSession, SessionConfig, SessionError};
use micclip::domain::capture::{DeviceConstraints, Encoding};
use micclip::domain::error::AcquireError;
use micclip::domain::session::{SessionState, StateError};

/// Test double standing in for the platform capture capability
struct FakePlatform {
    supported: bool,
    deny: Option<&'static str>,
    fragments: Vec<Vec<u8>>,
    finalize_delay: Option<Duration>,
    finalize_calls: Arc<AtomicUsize>,
}

impl FakePlatform {
    fn new() -> Self {
        Self {
            supported: true,
            deny: None,
            fragments: Vec::new(),
            finalize_delay: None,
            finalize_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn with_fragments(mut self, fragments: &[&[u8]]) -> Self {
        self.fragments = fragments.iter().map(|f| f.to_vec()).collect();
        self
    }

    fn with_finalize_delay(mut self, delay: Duration) -> Self {
        self.finalize_delay = Some(delay);
        self
    }

    fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    fn denying(reason: &'static str) -> Self {
        Self {
            deny: Some(reason),
            ..Self::new()
        }
    }

    fn finalize_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.finalize_calls)
    }
}

#[async_trait]
impl CapturePlatform for FakePlatform {
    type Device = ();

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn is_format_supported(&self, format: &str) -> bool {
        Encoding::from_mime(format).is_some()
    }

    async fn request_device(
        &self,
        _constraints: &DeviceConstraints,
    ) -> Result<(), PlatformDenial> {
        match self.deny {
            Some(reason) => Err(PlatformDenial::new(reason)),
            None => Ok(()),
        }
    }

    fn build_engine(
        &self,
        _device: (),
        _encoding: Encoding,
        observer: CaptureObserver,
    ) -> Result<Box<dyn CaptureEngine>, EngineError> {
        Ok(Box::new(FakeEngine {
            observer,
            fragments: self.fragments.clone(),
            finalize_delay: self.finalize_delay,
            finalize_calls: Arc::clone(&self.finalize_calls),
        }))
    }
}

/// Engine double: emits its canned fragments on start, and reports
/// finalization either synchronously or from a background thread.
struct FakeEngine {
    observer: CaptureObserver,
    fragments: Vec<Vec<u8>>,
    finalize_delay: Option<Duration>,
    finalize_calls: Arc<AtomicUsize>,
}

impl CaptureEngine for FakeEngine {
    fn start(&mut self) -> Result<(), EngineError> {
        for fragment in self.fragments.drain(..) {
            (self.observer.on_fragment)(fragment);
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), EngineError> {
        self.finalize_calls.fetch_add(1, Ordering::SeqCst);
        let on_finalized = Arc::clone(&self.observer.on_finalized);
        match self.finalize_delay {
            Some(delay) => {
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    on_finalized();
                });
            }
            None => on_finalized(),
        }
        Ok(())
    }
}

fn session(platform: FakePlatform) -> RecordingSession<FakePlatform> {
    RecordingSession::new(platform, SessionConfig::default())
}

async fn wait_for_state(session: &RecordingSession<FakePlatform>, wanted: SessionState) {
    for _ in 0..100 {
        if session.state() == wanted {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("session never reached {wanted}, still {}", session.state());
}

#[tokio::test]
async fn stop_concatenates_fragments_in_order() {
    let platform = FakePlatform::new().with_fragments(&[b"f1", b"f2", b"f3"]);
    let mut session = session(platform);

    session.start().await.unwrap();
    assert_eq!(session.state(), SessionState::Recording);
    assert_eq!(session.fragment_count(), 3);

    let artifact = session.stop().await.unwrap();
    assert_eq!(artifact.data(), b"f1f2f3");
    assert_eq!(session.state(), SessionState::Finished);
}

#[tokio::test]
async fn stop_resolves_after_deferred_finalization() {
    // Finalization fires from a background thread while stop() is awaiting
    let platform = FakePlatform::new()
        .with_fragments(&[b"abc"])
        .with_finalize_delay(Duration::from_millis(30));
    let mut session = session(platform);

    session.start().await.unwrap();
    let artifact = session.stop().await.unwrap();

    assert_eq!(artifact.data(), b"abc");
    assert_eq!(session.state(), SessionState::Finished);
}

#[tokio::test]
async fn artifact_carries_the_negotiated_encoding() {
    let config = SessionConfig {
        encoding: Encoding::Flac,
        constraints: DeviceConstraints::any(),
    };
    let mut session =
        RecordingSession::new(FakePlatform::new().with_fragments(&[b"x"]), config);

    session.start().await.unwrap();
    let artifact = session.stop().await.unwrap();
    assert_eq!(artifact.encoding(), Encoding::Flac);
}

#[tokio::test]
async fn second_start_fails_with_already_started() {
    let mut session = session(FakePlatform::new().with_fragments(&[b"f1"]));

    session.start().await.unwrap();
    let err = session.start().await.unwrap_err();

    assert!(matches!(
        err,
        SessionError::State(StateError::AlreadyStarted)
    ));
    // The first capture handle is untouched
    assert_eq!(session.state(), SessionState::Recording);
    assert_eq!(session.fragment_count(), 1);
}

#[tokio::test]
async fn stop_on_unstarted_session_fails_with_nothing_to_stop() {
    let mut session = session(FakePlatform::new());

    let err = session.stop().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::State(StateError::NothingToStop {
            state: SessionState::Idle,
        })
    ));
    assert_eq!(session.state(), SessionState::Idle);
}

#[tokio::test]
async fn second_stop_fails_with_nothing_to_stop() {
    let mut session = session(FakePlatform::new().with_fragments(&[b"f1"]));

    session.start().await.unwrap();
    session.stop().await.unwrap();

    let err = session.stop().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::State(StateError::NothingToStop {
            state: SessionState::Finished,
        })
    ));
}

#[tokio::test]
async fn pause_and_resume_preconditions() {
    let mut session = session(FakePlatform::new());

    // Not started yet
    assert!(matches!(
        session.pause().unwrap_err(),
        SessionError::State(StateError::InvalidState { .. })
    ));
    assert!(matches!(
        session.resume().unwrap_err(),
        SessionError::State(StateError::InvalidState { .. })
    ));

    session.start().await.unwrap();

    // Resume while recording
    assert!(matches!(
        session.resume().unwrap_err(),
        SessionError::State(StateError::InvalidState {
            state: SessionState::Recording,
            ..
        })
    ));

    session.pause().unwrap();
    assert_eq!(session.state(), SessionState::Paused);

    // Pause while already paused
    assert!(matches!(
        session.pause().unwrap_err(),
        SessionError::State(StateError::InvalidState {
            state: SessionState::Paused,
            ..
        })
    ));

    session.resume().unwrap();
    assert_eq!(session.state(), SessionState::Recording);
}

#[tokio::test]
async fn full_cycle_with_pause() {
    let mut session = session(FakePlatform::new().with_fragments(&[b"f1", b"f2"]));

    session.start().await.unwrap();
    session.pause().unwrap();
    session.resume().unwrap();

    let artifact = session.stop().await.unwrap();
    assert_eq!(artifact.data(), b"f1f2");
}

#[tokio::test]
async fn stop_from_paused_resolves() {
    let mut session = session(FakePlatform::new().with_fragments(&[b"f1"]));

    session.start().await.unwrap();
    session.pause().unwrap();

    let artifact = session.stop().await.unwrap();
    assert_eq!(artifact.data(), b"f1");
    assert_eq!(session.state(), SessionState::Finished);
}

#[tokio::test]
async fn discard_suppresses_the_artifact() {
    let mut session = session(FakePlatform::new().with_fragments(&[b"f1"]));

    session.start().await.unwrap();
    session.discard().unwrap();

    wait_for_state(&session, SessionState::Discarded).await;

    // The session terminated without ever producing an artifact
    let err = session.stop().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::State(StateError::NothingToStop {
            state: SessionState::Discarded,
        })
    ));
}

#[tokio::test]
async fn discard_with_deferred_finalization_passes_through_stopping() {
    let platform = FakePlatform::new()
        .with_fragments(&[b"f1"])
        .with_finalize_delay(Duration::from_millis(30));
    let mut session = session(platform);

    session.start().await.unwrap();
    session.discard().unwrap();
    assert_eq!(session.state(), SessionState::Stopping);

    wait_for_state(&session, SessionState::Discarded).await;
}

#[tokio::test]
async fn discard_twice_is_safe() {
    let platform = FakePlatform::new().with_fragments(&[b"f1"]);
    let finalize_calls = platform.finalize_calls();
    let mut session = session(platform);

    session.start().await.unwrap();
    session.discard().unwrap();

    // The second call is rejected without re-finalizing the engine
    let err = session.discard().unwrap_err();
    assert!(matches!(
        err,
        SessionError::State(StateError::InvalidState { .. })
    ));

    wait_for_state(&session, SessionState::Discarded).await;
    assert_eq!(finalize_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn discard_on_finished_session_fails() {
    let mut session = session(FakePlatform::new().with_fragments(&[b"f1"]));

    session.start().await.unwrap();
    session.stop().await.unwrap();

    let err = session.discard().unwrap_err();
    assert!(matches!(
        err,
        SessionError::State(StateError::InvalidState {
            state: SessionState::Finished,
            ..
        })
    ));
}

#[tokio::test]
async fn start_on_unsupported_platform_fails_eagerly() {
    let mut session = session(FakePlatform::unsupported());

    let err = session.start().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Acquire(AcquireError::CapabilityUnsupported)
    ));
    assert_eq!(session.state(), SessionState::Idle);
}

#[tokio::test]
async fn permission_denial_is_normalized() {
    let mut session = session(FakePlatform::denying("NotAllowedError"));

    let err = session.start().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Acquire(AcquireError::PermissionDenied)
    ));
    // No partial session is left behind
    assert_eq!(session.state(), SessionState::Idle);
}

#[tokio::test]
async fn unknown_denial_reason_is_normalized_to_catch_all() {
    let mut session = session(FakePlatform::denying("EsotericBackendError"));

    let err = session.start().await.unwrap_err();
    match err {
        SessionError::Acquire(AcquireError::AcquisitionFailed { reason }) => {
            assert_eq!(reason, "EsotericBackendError");
        }
        other => panic!("expected AcquisitionFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_start_allows_retry_on_same_session() {
    // Acquisition failure leaves the session idle; a later start on the
    // same instance is still allowed because no capture handle was created.
    let mut session = session(FakePlatform::denying("NotReadableError"));

    let err = session.start().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Acquire(AcquireError::DeviceUnavailable)
    ));

    let err = session.start().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Acquire(AcquireError::DeviceUnavailable)
    ));
    assert_eq!(session.state(), SessionState::Idle);
}

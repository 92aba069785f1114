//! micclip - managed microphone recording sessions
//!
//! This crate provides a recording session with a small, strictly guarded
//! control surface (start, pause, resume, stop, discard) on top of a
//! platform audio-capture capability. A session acquires one input device,
//! buffers the fragments the capture engine emits, and hands back a single
//! finished artifact exactly once - or suppresses it when the caller
//! discards the recording.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: the session state machine, artifact/encoding value objects,
//!   and the closed acquisition error taxonomy
//! - **Application**: port interfaces (traits), device acquisition, the
//!   recording session use case and its completion gate
//! - **Infrastructure**: the cpal-backed capture platform and the WAV/FLAC
//!   encoders

pub mod application;
pub mod domain;
pub mod infrastructure;

//! Record a short clip from the default microphone and write it to disk.
//!
//! Usage: cargo run --example record_clip [seconds] [output-path]

use std::time::Duration;

use micclip::application::session::{RecordingSession, SessionConfig};
use micclip::infrastructure::{capture_supported, CpalPlatform};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if !capture_supported() {
        eprintln!("audio capture is not available on this host");
        std::process::exit(1);
    }

    let seconds: u64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(3);
    let output = std::env::args().nth(2).unwrap_or_else(|| "clip.wav".to_string());

    let config = SessionConfig::default();
    let mut session = RecordingSession::new(CpalPlatform, config);

    session.start().await?;
    println!("recording for {seconds}s...");
    tokio::time::sleep(Duration::from_secs(seconds)).await;

    let artifact = session.stop().await?;
    std::fs::write(&output, artifact.data())?;
    println!(
        "wrote {} ({}, {})",
        output,
        artifact.encoding().mime_type(),
        artifact.human_readable_size()
    );

    Ok(())
}

// Live Dictation Example: scripted engine through the full controller
//
// This example demonstrates the complete dictation pipeline:
// 1. A replay engine plays a scripted recognition timeline
// 2. The session controller launches it and keeps it alive across the
//    engine's own session end (watch for the transparent restart)
// 3. Interim hypotheses and committed segments accumulate in the transcript
// 4. We watch status changes in real time, then stop and print the result

use anyhow::Result;
use dicta::{ControllerHandle, ReplayEngine, SessionConfig, SharedTranscript, TranscriptConfig};
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    info!("🎙️  Starting live dictation demo");

    // 1. Load the scripted recognition timeline
    let engine = ReplayEngine::from_file("tests/fixtures/sample-dictation.json")?;

    // 2. Spawn the session controller
    let transcript = SharedTranscript::new(TranscriptConfig::default());
    let controller = ControllerHandle::spawn(
        Box::new(engine),
        transcript.clone(),
        SessionConfig::default(),
    );

    // 3. Watch status changes in the background
    let mut status_rx = controller.subscribe();
    let watcher = tokio::spawn(async move {
        while status_rx.changed().await.is_ok() {
            let status = status_rx.borrow().clone();
            if status.interim.is_empty() {
                info!(
                    "📋 [{}] {} segment(s), {} word(s)",
                    status.state, status.segments_committed, status.word_count
                );
            } else {
                info!("📋 [{}] interim: \"{}\"", status.state, status.interim);
            }
        }
    });

    // 4. Dictate for a while; the script ends itself around the 5s mark,
    //    so the controller restarts the engine once before we stop
    let session_id = controller.start(None).await?;
    info!("✅ Session started: {}", session_id);

    sleep(Duration::from_secs(8)).await;

    let status = controller.stop().await?;
    let restarts = status
        .session
        .as_ref()
        .map(|s| s.engine_restarts)
        .unwrap_or(0);
    info!("🛑 Stopped after {} engine restart(s)", restarts);

    // 5. Print the final transcript
    info!("📝 Transcript: \"{}\"", transcript.full_text());

    controller.shutdown().await;
    watcher.abort();

    Ok(())
}

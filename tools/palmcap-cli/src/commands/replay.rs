//! Replay a landmark recording through the full capture flow.

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use palmcap_capture_engine::{
    load_recording, replay, run_detection_loop, test_pattern, AppConfig, CaptureController,
    CaptureStore, LoopOptions,
};
use palmcap_common::clock::SessionClock;
use palmcap_common::config::default_captures_dir;
use palmcap_hand_model::FacingMode;

pub async fn run(
    mut config: AppConfig,
    recording: PathBuf,
    image: Option<PathBuf>,
    output: Option<PathBuf>,
    facing: Option<FacingMode>,
    any_order: bool,
) -> anyhow::Result<()> {
    if let Some(facing) = facing {
        config.capture.classifier.facing_mode = facing;
    }
    if any_order {
        config.capture.enforce_order = false;
    }

    let frames = load_recording(&recording)
        .map_err(|e| anyhow::anyhow!("Failed to load recording: {e}"))?;
    let still = match &image {
        Some(path) => image::open(path)
            .map_err(|e| anyhow::anyhow!("Failed to open {}: {e}", path.display()))?
            .to_rgb8(),
        None => test_pattern(1280, 720),
    };

    println!("Replaying: {}", recording.display());
    println!("  Frames: {}", frames.len());
    println!("  Facing: {:?}", config.capture.facing_mode());
    println!("  Still: {}x{}", still.width(), still.height());
    println!();

    let clock = SessionClock::start();
    let mut controller = CaptureController::new(config.capture.clone())?;
    let (mut source, mut detector) = replay(frames, still);
    let options = LoopOptions {
        target_fps: config.capture.target_fps,
        init_retry: config.retry.clone(),
        ..LoopOptions::default()
    };

    let stop = options.stop_flag();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.store(true, Ordering::Relaxed);
        }
    });
    let summary = run_detection_loop(&mut controller, &mut source, &mut detector, &options).await;
    ctrl_c.abort();
    let summary = summary?;

    println!("Finished: {:?}", summary.exit);
    println!(
        "  Frames: {} seen, {} skipped, {} detector errors",
        summary.frames_seen, summary.frames_skipped, summary.detector_errors
    );
    for entry in controller.checklist().entries() {
        let mark = if entry.captured { "x" } else { " " };
        println!("  [{mark}] {}", entry.gesture);
    }
    if let Some(instruction) = controller.instruction() {
        println!("  Next: {instruction}");
    }

    if controller.captures().is_empty() {
        println!("\nNo captures to save.");
        return Ok(());
    }

    let dir = output.unwrap_or_else(|| {
        default_captures_dir().join(clock.epoch_wall().replace([':', '+'], "-"))
    });
    let store = CaptureStore::create(&dir)?;
    let manifest = store.save(
        controller.captures(),
        clock.epoch_wall(),
        config.capture.facing_mode(),
    )?;

    println!("\nSaved {} capture(s) to {}", manifest.entries.len(), dir.display());
    for entry in &manifest.entries {
        let note = if entry.degraded { " (degraded)" } else { "" };
        println!(
            "  {:<12} {:<16} variance {:>8.1}{note}",
            entry.label, entry.file, entry.variance
        );
    }
    tracing::debug!(elapsed_secs = clock.elapsed_secs(), "Replay finished");

    Ok(())
}

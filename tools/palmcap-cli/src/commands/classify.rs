//! Frame-by-frame classification of a recording.

use std::path::PathBuf;

use palmcap_capture_engine::{load_recording, AppConfig};
use palmcap_common::clock::SessionClock;
use palmcap_gesture_core::{GestureClassifier, StabilityFilter};
use palmcap_hand_model::FacingMode;

pub fn run(config: &AppConfig, recording: PathBuf, facing: Option<FacingMode>) -> anyhow::Result<()> {
    let mut classifier_config = config.capture.classifier;
    if let Some(facing) = facing {
        classifier_config.facing_mode = facing;
    }
    config.capture.stability.validate()?;
    let classifier = GestureClassifier::new(classifier_config);
    let mut stability = StabilityFilter::new(config.capture.stability);

    let frames = load_recording(&recording)
        .map_err(|e| anyhow::anyhow!("Failed to load recording: {e}"))?;

    println!("{:>9}  {:>5}  {:<12}  confirmed", "time", "hands", "gesture");
    let mut confirmed_frames = 0usize;
    for frame in &frames {
        let gesture = classifier.classify(&frame.hands);
        let confirmed = stability.observe(gesture).is_some();
        confirmed_frames += usize::from(confirmed);
        println!(
            "{:>8.3}s  {:>5}  {:<12}  {}",
            SessionClock::ns_to_secs(frame.timestamp_ns),
            frame.hands.len(),
            gesture.label(),
            if confirmed { "yes" } else { "no" }
        );
    }

    println!();
    println!("Frames: {} ({} confirmed)", frames.len(), confirmed_frames);
    match stability.dominant() {
        Some(gesture) => println!("Dominant gesture (last {} frames): {gesture}", stability.len()),
        None => println!("No gesture in the last {} frames", stability.len()),
    }
    Ok(())
}

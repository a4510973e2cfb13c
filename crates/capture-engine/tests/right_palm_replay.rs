use std::path::PathBuf;
use std::sync::Arc;

use image::{Rgb, RgbImage};
use palmcap_capture_engine::{
    load_recording, replay, run_detection_loop, test_pattern, CaptureConfig, CaptureController,
    CaptureStore, Frame, FrameOutcome, LoopExit, LoopOptions, SessionPhase,
};
use palmcap_common::retry::RetryPolicy;
use palmcap_hand_model::{DetectionFrame, FacingMode, Gesture};

const FIVE_SECONDS_NS: u64 = 5_000_000_000;

fn fixture_recording() -> Vec<DetectionFrame> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("right-palm-session")
        .join("landmarks.jsonl");
    load_recording(&path).expect("fixture recording should parse")
}

fn output_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("palmcap-replay-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn fixture_spans_five_seconds_at_30fps() {
    let recording = fixture_recording();
    assert_eq!(recording.len(), 151);
    assert_eq!(recording.first().map(|f| f.timestamp_ns), Some(0));
    assert_eq!(recording.last().map(|f| f.timestamp_ns), Some(FIVE_SECONDS_NS));
}

#[test]
fn blurry_hold_then_clear_frame_captures_right_palm_once() {
    let recording = fixture_recording();
    let blurry = Arc::new(RgbImage::from_pixel(320, 240, Rgb([120, 110, 100])));
    let clear = Arc::new(test_pattern(320, 240));

    let mut controller = CaptureController::new(CaptureConfig::default()).unwrap();
    controller.start().unwrap();

    let last = recording.len() - 1;
    let outcomes: Vec<FrameOutcome> = recording
        .iter()
        .enumerate()
        .map(|(i, detection)| {
            let image = if i == last { clear.clone() } else { blurry.clone() };
            let frame = Frame::new(detection.timestamp_ns, image);
            controller.process_frame(&frame, &detection.hands).outcome
        })
        .collect();

    assert!(outcomes[..last].iter().all(|o| matches!(
        o,
        FrameOutcome::Holding { .. } | FrameOutcome::NoGesture | FrameOutcome::Unconfirmed { .. }
    )));
    assert_eq!(
        outcomes[last],
        FrameOutcome::Captured {
            gesture: Gesture::RightPalm,
            degraded: false
        }
    );

    let captures = controller.captures();
    assert_eq!(captures.len(), 1);
    assert_eq!(captures[0].gesture, Gesture::RightPalm);
    assert_eq!(captures[0].timestamp_ns, FIVE_SECONDS_NS);

    let checklist = controller.checklist();
    assert!(checklist.is_captured(Gesture::RightPalm));
    assert!(checklist.is_pending(Gesture::LeftPalm));
    assert!(checklist.is_pending(Gesture::BothThumbs));
}

#[tokio::test]
async fn replay_loop_writes_one_capture() {
    let (mut source, mut detector) = replay(fixture_recording(), test_pattern(1280, 720));
    let mut controller = CaptureController::new(CaptureConfig::default()).unwrap();
    let options = LoopOptions {
        init_retry: RetryPolicy::none(),
        ..LoopOptions::default()
    };

    let summary = run_detection_loop(&mut controller, &mut source, &mut detector, &options)
        .await
        .unwrap();

    assert_eq!(summary.exit, LoopExit::EndOfStream);
    assert_eq!(summary.frames_seen, 151);
    assert_eq!(summary.frames_skipped, 0);
    assert_eq!(summary.captures, 1);
    assert_eq!(controller.phase(), SessionPhase::Running);

    let dir = output_dir("loop");
    let store = CaptureStore::create(&dir).unwrap();
    let manifest = store
        .save(
            controller.captures(),
            "2026-01-01T00:00:00Z",
            controller.config().facing_mode(),
        )
        .unwrap();

    assert_eq!(manifest.entries.len(), 1);
    let entry = manifest.entry(Gesture::RightPalm).unwrap();
    assert_eq!(entry.file, "right-palm.jpg");
    assert_eq!(entry.timestamp_ns, FIVE_SECONDS_NS);
    assert!(!entry.degraded);

    let saved = image::open(dir.join(&entry.file)).unwrap();
    assert_eq!((saved.width(), saved.height()), (640, 360));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn front_camera_reads_the_recording_as_left_palm() {
    let mut config = CaptureConfig {
        enforce_order: false,
        ..CaptureConfig::default()
    };
    config.classifier.facing_mode = FacingMode::Front;
    let mut controller = CaptureController::new(config).unwrap();
    controller.start().unwrap();

    let still = Arc::new(test_pattern(320, 240));
    for detection in fixture_recording() {
        let frame = Frame::new(detection.timestamp_ns, still.clone());
        controller.process_frame(&frame, &detection.hands);
    }

    let captured: Vec<Gesture> = controller.captures().iter().map(|c| c.gesture).collect();
    assert_eq!(captured, vec![Gesture::LeftPalm]);
}

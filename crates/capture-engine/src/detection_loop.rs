//! Cooperative detection loop.
//!
//! One loop per session. Each cycle checks the stop and pause flags, pulls
//! a frame, paces it against the target rate, runs the landmark detector
//! and hands the result to the controller, then yields to the runtime. The
//! source and detector are released on every exit path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use palmcap_common::clock::RateController;
use palmcap_common::error::{PalmcapError, PalmcapResult};
use palmcap_common::retry::RetryPolicy;

use crate::controller::{CaptureController, FrameOutcome};
use crate::session::SessionPhase;
use crate::source::{FrameSource, LandmarkDetector};

/// Loop settings.
#[derive(Debug, Clone)]
pub struct LoopOptions {
    /// Set to `true` from anywhere to end the loop after the current cycle.
    pub stop_flag: Arc<AtomicBool>,
    /// While `true` the session is paused and frames are drained unseen.
    pub pause_flag: Arc<AtomicBool>,
    /// Frames closer together than `1 / target_fps` are skipped. 0 disables
    /// pacing.
    pub target_fps: u32,
    /// Applied to detector start-up.
    pub init_retry: RetryPolicy,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            stop_flag: Arc::new(AtomicBool::new(false)),
            pause_flag: Arc::new(AtomicBool::new(false)),
            target_fps: 30,
            init_retry: RetryPolicy::default(),
        }
    }
}

impl LoopOptions {
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    pub fn pause_flag(&self) -> Arc<AtomicBool> {
        self.pause_flag.clone()
    }
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The stop flag was raised.
    Cancelled,
    /// Every checklist entry was captured.
    ChecklistComplete,
    /// The source ran out of frames.
    EndOfStream,
    /// The controller was stopped or failed from outside the loop.
    SessionEnded(SessionPhase),
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    pub exit: LoopExit,
    /// Frames pulled from the source.
    pub frames_seen: u64,
    /// Frames skipped by pacing.
    pub frames_skipped: u64,
    /// Frames the detector failed on.
    pub detector_errors: u64,
    /// Stills accepted during this run.
    pub captures: u64,
}

impl LoopSummary {
    fn new() -> Self {
        Self {
            exit: LoopExit::EndOfStream,
            frames_seen: 0,
            frames_skipped: 0,
            detector_errors: 0,
            captures: 0,
        }
    }
}

/// Run the detection loop until it is cancelled, the checklist completes or
/// the source ends.
///
/// An idle controller is started first. Failing to open the source, or to
/// initialize the detector within `options.init_retry`, fails the session
/// and returns the error. A per-frame detector error only skips that frame.
pub async fn run_detection_loop<S, D>(
    controller: &mut CaptureController,
    source: &mut S,
    detector: &mut D,
    options: &LoopOptions,
) -> PalmcapResult<LoopSummary>
where
    S: FrameSource + ?Sized,
    D: LandmarkDetector + ?Sized,
{
    if controller.phase() == SessionPhase::Idle {
        controller.start()?;
    }

    let result = match initialize(source, detector, &options.init_retry).await {
        Ok(()) => drive(controller, source, detector, options).await,
        Err(e) => Err(e),
    };

    if let Err(e) = &result {
        if e.is_fatal_to_session() {
            controller.fail(e.to_string());
        }
    }

    release(source, detector).await;

    if let Ok(summary) = &result {
        tracing::info!(
            exit = ?summary.exit,
            frames = summary.frames_seen,
            skipped = summary.frames_skipped,
            detector_errors = summary.detector_errors,
            captures = summary.captures,
            "Detection loop finished"
        );
    }
    result
}

async fn initialize<S, D>(source: &mut S, detector: &mut D, retry: &RetryPolicy) -> PalmcapResult<()>
where
    S: FrameSource + ?Sized,
    D: LandmarkDetector + ?Sized,
{
    let info = source.open().await.map_err(|e| match e {
        PalmcapError::Camera { .. } => e,
        other => PalmcapError::camera(format!(
            "Unable to access the camera. Check that it is connected and that permission is granted: {other}"
        )),
    })?;
    tracing::info!(
        width = info.width,
        height = info.height,
        facing_mode = ?info.facing_mode,
        "Frame source opened"
    );

    let mut retries = 0u32;
    loop {
        match detector.init().await {
            Ok(()) => {
                tracing::info!(attempts = retries + 1, "Landmark detector ready");
                return Ok(());
            }
            Err(e) => match retry.next_delay(retries) {
                Some(delay) => {
                    retries += 1;
                    tracing::warn!(
                        error = %e,
                        attempt = retries,
                        max_attempts = retry.max_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        "Landmark detector failed to start, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    return Err(PalmcapError::detector(format!(
                        "Hand tracking could not start after {} of {} attempt(s). Reload and try again: {e}",
                        retries + 1,
                        retry.max_attempts()
                    )));
                }
            },
        }
    }
}

async fn drive<S, D>(
    controller: &mut CaptureController,
    source: &mut S,
    detector: &mut D,
    options: &LoopOptions,
) -> PalmcapResult<LoopSummary>
where
    S: FrameSource + ?Sized,
    D: LandmarkDetector + ?Sized,
{
    let mut summary = LoopSummary::new();
    let mut pacer = RateController::new(options.target_fps);

    loop {
        if options.stop_flag.load(Ordering::Relaxed) {
            controller.stop();
            summary.exit = LoopExit::Cancelled;
            break;
        }
        match (options.pause_flag.load(Ordering::Relaxed), controller.phase()) {
            (true, SessionPhase::Running) => controller.pause()?,
            (false, SessionPhase::Paused) => {
                controller.resume()?;
                pacer.reset();
            }
            _ => {}
        }
        match controller.phase() {
            SessionPhase::Complete => {
                summary.exit = LoopExit::ChecklistComplete;
                break;
            }
            phase @ (SessionPhase::Stopped | SessionPhase::Failed | SessionPhase::Idle) => {
                summary.exit = LoopExit::SessionEnded(phase);
                break;
            }
            SessionPhase::Running | SessionPhase::Paused => {}
        }

        let frame = match source.next_frame().await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                summary.exit = LoopExit::EndOfStream;
                break;
            }
            Err(e) => {
                return Err(PalmcapError::camera(format!(
                    "Camera stream interrupted: {e}"
                )));
            }
        };
        summary.frames_seen += 1;

        if controller.phase() == SessionPhase::Paused {
            tokio::task::yield_now().await;
            continue;
        }
        if !pacer.should_tick(frame.timestamp_ns) {
            summary.frames_skipped += 1;
            continue;
        }

        let hands = match detector.detect(&frame).await {
            Ok(hands) => hands,
            Err(e) => {
                summary.detector_errors += 1;
                tracing::warn!(
                    error = %e,
                    timestamp_ns = frame.timestamp_ns,
                    "Landmark detection failed, skipping frame"
                );
                continue;
            }
        };

        let report = controller.process_frame(&frame, &hands);
        if let FrameOutcome::Captured { gesture, degraded } = report.outcome {
            summary.captures += 1;
            tracing::debug!(gesture = %gesture, degraded, "Loop observed capture");
        }

        tokio::task::yield_now().await;
    }

    Ok(summary)
}

async fn release<S, D>(source: &mut S, detector: &mut D)
where
    S: FrameSource + ?Sized,
    D: LandmarkDetector + ?Sized,
{
    if let Err(e) = detector.shutdown().await {
        tracing::warn!(error = %e, "Failed to shut down landmark detector");
    }
    if let Err(e) = source.close().await {
        tracing::warn!(error = %e, "Failed to close frame source");
    }
}

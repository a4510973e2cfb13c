//! Capture controller.
//!
//! Turns per-frame landmark detections into accepted stills. For every
//! frame while running:
//!
//! 1. classify the hands into one [`Gesture`];
//! 2. vote it into the stability history;
//! 3. track how long the confirmed gesture has been held;
//! 4. once the gesture is pending on the checklist, held long enough, past
//!    the debounce window and (optionally) well framed, run the blur check
//!    on the frame and capture it.
//!
//! A capture is the only thing that marks a checklist entry, and only
//! [`CaptureController::restart`] clears one.

use palmcap_common::error::{PalmcapError, PalmcapResult};
use palmcap_gesture_core::framing::downscale_to_fit;
use palmcap_gesture_core::{GestureClassifier, QualityGate, QualityVerdict, StabilityFilter};
use palmcap_hand_model::{CaptureChecklist, FacingMode, Gesture, HandLandmarks};

use crate::config::{CaptureConfig, QualityFallback};
use crate::session::{CapturedImage, Hold, SessionPhase, SessionState};
use crate::source::Frame;

/// What happened to one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// The session is not running; the frame was ignored.
    Inactive(SessionPhase),
    /// No hand matched a pose.
    NoGesture,
    /// A gesture was seen but the history does not back it yet.
    Unconfirmed { candidate: Gesture },
    /// Confirmed, but not on the checklist.
    NotRequired,
    /// Confirmed, but already captured.
    AlreadyCaptured,
    /// Confirmed, but another entry has to be captured first.
    OutOfOrder { expected: Gesture },
    /// Confirmed and required; keep still for `remaining_ns` more.
    Holding { remaining_ns: u64 },
    /// Too soon after the previous capture.
    Debouncing { remaining_ns: u64 },
    /// No hand passed the coverage check.
    OutOfFrame,
    /// The frame was too blurry. The next frame is tried again.
    QualityRejected(QualityVerdict),
    Captured { gesture: Gesture, degraded: bool },
}

impl FrameOutcome {
    pub fn is_capture(&self) -> bool {
        matches!(self, Self::Captured { .. })
    }
}

/// Per-frame result handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Raw classification of this frame.
    pub gesture: Gesture,
    /// The gesture if the stability history backs it.
    pub confirmed: Option<Gesture>,
    pub outcome: FrameOutcome,
}

impl FrameReport {
    fn inactive(phase: SessionPhase) -> Self {
        Self {
            gesture: Gesture::None,
            confirmed: None,
            outcome: FrameOutcome::Inactive(phase),
        }
    }
}

/// Drives one capture session.
#[derive(Debug)]
pub struct CaptureController {
    config: CaptureConfig,
    classifier: GestureClassifier,
    quality: QualityGate,
    state: SessionState,
}

impl CaptureController {
    /// Build an idle session. Fails on invalid configuration.
    pub fn new(config: CaptureConfig) -> PalmcapResult<Self> {
        config.validate()?;
        let checklist = config.checklist()?;
        Ok(Self {
            classifier: GestureClassifier::new(config.classifier),
            quality: QualityGate::new(config.quality),
            state: SessionState::new(checklist, StabilityFilter::new(config.stability)),
            config,
        })
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn checklist(&self) -> &CaptureChecklist {
        &self.state.checklist
    }

    pub fn captures(&self) -> &[CapturedImage] {
        &self.state.captures
    }

    /// Hand over accepted stills, leaving the checklist as it is.
    pub fn take_captures(&mut self) -> Vec<CapturedImage> {
        std::mem::take(&mut self.state.captures)
    }

    /// Blur check for an arbitrary image, using the session's settings.
    pub fn quality_gate(&self) -> &QualityGate {
        &self.quality
    }

    /// Instruction for the next pending gesture, if any.
    pub fn instruction(&self) -> Option<&'static str> {
        self.state.checklist.next_pending().map(Gesture::instruction)
    }

    /// Idle → Running.
    pub fn start(&mut self) -> PalmcapResult<()> {
        if self.state.phase != SessionPhase::Idle {
            return Err(PalmcapError::session(format!(
                "Session already started (phase: {})",
                self.state.phase
            )));
        }
        self.state.phase = SessionPhase::Running;
        tracing::info!(
            required = self.state.checklist.len(),
            facing_mode = ?self.config.facing_mode(),
            "Capture session started"
        );
        Ok(())
    }

    /// Running → Paused. The current hold is dropped, so the countdown
    /// starts over on resume.
    pub fn pause(&mut self) -> PalmcapResult<()> {
        if self.state.phase != SessionPhase::Running {
            return Err(PalmcapError::session(format!(
                "Cannot pause a session that is {}",
                self.state.phase
            )));
        }
        self.state.phase = SessionPhase::Paused;
        self.state.hold = None;
        tracing::info!("Capture session paused");
        Ok(())
    }

    /// Paused → Running.
    pub fn resume(&mut self) -> PalmcapResult<()> {
        if self.state.phase != SessionPhase::Paused {
            return Err(PalmcapError::session(format!(
                "Cannot resume a session that is {}",
                self.state.phase
            )));
        }
        self.state.phase = SessionPhase::Running;
        tracing::info!("Capture session resumed");
        Ok(())
    }

    /// End the session early. Completed and failed sessions keep their phase.
    pub fn stop(&mut self) {
        if !self.state.phase.is_terminal() {
            self.state.phase = SessionPhase::Stopped;
            self.state.hold = None;
            tracing::info!(
                captured = self.state.checklist.captured_count(),
                required = self.state.checklist.len(),
                "Capture session stopped"
            );
        }
    }

    /// Discard all progress and start again from the first entry.
    pub fn restart(&mut self) {
        self.state.reset();
        self.state.phase = SessionPhase::Running;
        tracing::info!("Capture session restarted");
    }

    /// Mark the session as failed.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(error = %message, "Capture session failed");
        self.state.phase = SessionPhase::Failed;
        self.state.hold = None;
        self.state.failure = Some(message);
    }

    /// Switch cameras mid-session. Recent labels were produced under the
    /// old mirroring, so the history and hold are discarded.
    pub fn set_facing_mode(&mut self, facing_mode: FacingMode) {
        if facing_mode == self.config.facing_mode() {
            return;
        }
        self.config.classifier.facing_mode = facing_mode;
        self.classifier.set_facing_mode(facing_mode);
        self.state.stability.clear();
        self.state.hold = None;
        tracing::info!(?facing_mode, "Camera facing mode changed");
    }

    /// Evaluate one frame and the hands detected in it.
    pub fn process_frame(&mut self, frame: &Frame, hands: &[HandLandmarks]) -> FrameReport {
        let phase = self.state.phase;
        if !phase.is_active() {
            return FrameReport::inactive(phase);
        }
        self.state.frames_processed += 1;

        let gesture = self.classifier.classify(hands);
        let confirmed = self.state.stability.observe(gesture);
        let outcome = match confirmed {
            Some(confirmed) => self.evaluate(confirmed, frame, hands),
            None => {
                self.release_stale_hold();
                if gesture.is_none() {
                    FrameOutcome::NoGesture
                } else {
                    FrameOutcome::Unconfirmed { candidate: gesture }
                }
            }
        };

        tracing::trace!(
            timestamp_ns = frame.timestamp_ns,
            hands = hands.len(),
            ?gesture,
            ?outcome,
            "Frame processed"
        );
        FrameReport {
            gesture,
            confirmed,
            outcome,
        }
    }

    /// A noisy frame keeps the hold alive as long as the history still
    /// backs the held gesture.
    fn release_stale_hold(&mut self) {
        if let Some(hold) = self.state.hold {
            if !self.state.stability.is_confirmed(hold.gesture) {
                tracing::debug!(gesture = %hold.gesture, "Hold released");
                self.state.hold = None;
            }
        }
    }

    fn evaluate(&mut self, gesture: Gesture, frame: &Frame, hands: &[HandLandmarks]) -> FrameOutcome {
        let now = frame.timestamp_ns;
        let hold = match self.state.hold {
            Some(hold) if hold.gesture == gesture => hold,
            _ => {
                let hold = Hold::new(gesture, now);
                self.state.hold = Some(hold);
                tracing::debug!(gesture = %gesture, since_ns = now, "Hold started");
                hold
            }
        };

        let checklist = &self.state.checklist;
        if !checklist.contains(gesture) {
            return FrameOutcome::NotRequired;
        }
        if checklist.is_captured(gesture) {
            return FrameOutcome::AlreadyCaptured;
        }
        if self.config.enforce_order {
            if let Some(expected) = checklist.next_pending() {
                if expected != gesture {
                    return FrameOutcome::OutOfOrder { expected };
                }
            }
        }

        let held = hold.held_ns(now);
        let needed = self.config.stabilization_ns();
        if held < needed {
            return FrameOutcome::Holding {
                remaining_ns: needed - held,
            };
        }

        if let Some(last) = self.state.last_capture_ns {
            let since = now.saturating_sub(last);
            let debounce = self.config.debounce_ns();
            if since < debounce {
                return FrameOutcome::Debouncing {
                    remaining_ns: debounce - since,
                };
            }
        }

        if let Some(gate) = &self.config.hand_coverage {
            if !gate.admits_any(hands) {
                return FrameOutcome::OutOfFrame;
            }
        }

        let verdict = self.quality.assess_rgb(&frame.image);
        let degraded = !verdict.acceptable;
        if degraded && !self.accept_degraded() {
            tracing::debug!(
                gesture = %gesture,
                variance = verdict.variance,
                threshold = verdict.threshold,
                "Frame too blurry, waiting for a sharper one"
            );
            return FrameOutcome::QualityRejected(verdict);
        }

        self.capture(gesture, frame, verdict, degraded)
    }

    /// Count a blur rejection against the current hold and decide whether
    /// the fallback lets this frame through anyway.
    fn accept_degraded(&mut self) -> bool {
        let Some(hold) = self.state.hold.as_mut() else {
            return false;
        };
        match self.config.quality_fallback {
            QualityFallback::Retry => {
                hold.quality_rejections += 1;
                false
            }
            QualityFallback::AcceptDegraded { after_attempts } => {
                if hold.quality_rejections >= after_attempts {
                    true
                } else {
                    hold.quality_rejections += 1;
                    false
                }
            }
        }
    }

    fn capture(
        &mut self,
        gesture: Gesture,
        frame: &Frame,
        verdict: QualityVerdict,
        degraded: bool,
    ) -> FrameOutcome {
        let image = downscale_to_fit(
            &frame.image,
            self.config.max_capture_width,
            self.config.max_capture_height,
        );
        self.state.checklist.mark_captured(gesture);
        self.state.captures.push(CapturedImage {
            gesture,
            timestamp_ns: frame.timestamp_ns,
            image,
            verdict,
            degraded,
        });
        self.state.last_capture_ns = Some(frame.timestamp_ns);
        self.state.hold = None;

        tracing::info!(
            gesture = %gesture,
            timestamp_ns = frame.timestamp_ns,
            variance = verdict.variance,
            degraded,
            captured = self.state.checklist.captured_count(),
            required = self.state.checklist.len(),
            "Captured gesture"
        );

        if self.state.checklist.is_complete() {
            self.state.phase = SessionPhase::Complete;
            tracing::info!(captures = self.state.captures.len(), "Checklist complete");
        }
        FrameOutcome::Captured { gesture, degraded }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use image::{Rgb, RgbImage};
    use palmcap_common::clock::NANOS_PER_SEC;
    use palmcap_gesture_core::CoverageGate;
    use palmcap_hand_model::{Handedness, Landmark, LandmarkIdx, LANDMARK_COUNT};
    use proptest::prelude::*;

    #[derive(Clone, Copy, Debug)]
    enum Shown {
        Nothing,
        Palm(Handedness),
        Thumb(Handedness),
        BothThumbs,
    }

    fn hand(handedness: Handedness, palm: bool, extent: f32) -> HandLandmarks {
        let mut hand = HandLandmarks::from_array(
            [Landmark::new(0.2, 0.2, 0.0); LANDMARK_COUNT],
            handedness,
            0.95,
        );
        hand.landmark_mut(LandmarkIdx::PinkyTip).x = 0.2 + extent;
        hand.landmark_mut(LandmarkIdx::PinkyTip).y = 0.2 + extent;
        if palm {
            hand.landmark_mut(LandmarkIdx::MiddleFingerMcp).z = 0.06;
        } else {
            hand.landmark_mut(LandmarkIdx::ThumbTip).z = -0.04;
        }
        hand
    }

    fn hands(shown: Shown) -> Vec<HandLandmarks> {
        match shown {
            Shown::Nothing => Vec::new(),
            Shown::Palm(h) => vec![hand(h, true, 0.5)],
            Shown::Thumb(h) => vec![hand(h, false, 0.5)],
            Shown::BothThumbs => vec![
                hand(Handedness::Left, false, 0.5),
                hand(Handedness::Right, false, 0.5),
            ],
        }
    }

    fn sharp() -> Arc<RgbImage> {
        Arc::new(RgbImage::from_fn(64, 48, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        }))
    }

    fn blurry() -> Arc<RgbImage> {
        Arc::new(RgbImage::from_pixel(64, 48, Rgb([128, 128, 128])))
    }

    /// Timestamp of frame `i` at 30 fps.
    fn at(i: u64) -> u64 {
        i * NANOS_PER_SEC / 30
    }

    fn running(config: CaptureConfig) -> CaptureController {
        let mut controller = CaptureController::new(config).unwrap();
        controller.start().unwrap();
        controller
    }

    fn feed(
        controller: &mut CaptureController,
        frames: std::ops::Range<u64>,
        shown: Shown,
        image: &Arc<RgbImage>,
    ) -> Vec<FrameOutcome> {
        frames
            .map(|i| {
                let frame = Frame::new(at(i), image.clone());
                controller.process_frame(&frame, &hands(shown)).outcome
            })
            .collect()
    }

    const RIGHT_PALM: Shown = Shown::Palm(Handedness::Right);
    const LEFT_PALM: Shown = Shown::Palm(Handedness::Left);

    #[test]
    fn idle_session_ignores_frames() {
        let mut controller = CaptureController::new(CaptureConfig::default()).unwrap();
        let outcomes = feed(&mut controller, 0..3, RIGHT_PALM, &sharp());
        assert!(outcomes
            .iter()
            .all(|o| *o == FrameOutcome::Inactive(SessionPhase::Idle)));
        assert_eq!(controller.state().frames_processed(), 0);
    }

    #[test]
    fn right_palm_held_five_seconds_is_captured_once() {
        let mut controller = running(CaptureConfig::default());
        let outcomes = feed(&mut controller, 0..151, RIGHT_PALM, &sharp());

        assert_eq!(
            outcomes[0],
            FrameOutcome::Holding {
                remaining_ns: 5 * NANOS_PER_SEC
            }
        );
        assert!(outcomes[..150]
            .iter()
            .all(|o| matches!(o, FrameOutcome::Holding { .. })));
        assert_eq!(
            outcomes[150],
            FrameOutcome::Captured {
                gesture: Gesture::RightPalm,
                degraded: false
            }
        );

        let later = feed(&mut controller, 151..200, RIGHT_PALM, &sharp());
        assert!(later.iter().all(|o| *o == FrameOutcome::AlreadyCaptured));

        assert_eq!(controller.captures().len(), 1);
        assert_eq!(controller.captures()[0].timestamp_ns, 5 * NANOS_PER_SEC);
        let checklist = controller.checklist();
        assert!(checklist.is_captured(Gesture::RightPalm));
        assert!(checklist.is_pending(Gesture::LeftPalm));
        assert!(checklist.is_pending(Gesture::BothThumbs));
        assert_eq!(controller.phase(), SessionPhase::Running);
    }

    #[test]
    fn holding_counts_down() {
        let mut controller = running(CaptureConfig::default());
        let outcomes = feed(&mut controller, 0..31, RIGHT_PALM, &sharp());
        assert_eq!(
            outcomes[30],
            FrameOutcome::Holding {
                remaining_ns: 4 * NANOS_PER_SEC
            }
        );
    }

    #[test]
    fn brief_noise_does_not_reset_the_hold() {
        let mut controller = running(CaptureConfig::default());
        let image = sharp();
        feed(&mut controller, 0..40, RIGHT_PALM, &image);
        let gap = feed(&mut controller, 40..42, Shown::Nothing, &image);
        assert!(gap.iter().all(|o| *o == FrameOutcome::NoGesture));
        feed(&mut controller, 42..90, RIGHT_PALM, &image);
        let glitch = feed(&mut controller, 90..91, LEFT_PALM, &image);
        assert_eq!(
            glitch[0],
            FrameOutcome::Unconfirmed {
                candidate: Gesture::LeftPalm
            }
        );
        let rest = feed(&mut controller, 91..151, RIGHT_PALM, &image);
        assert!(rest[59].is_capture());
    }

    #[test]
    fn losing_the_hand_releases_the_hold() {
        let mut controller = running(CaptureConfig::default());
        let image = sharp();
        feed(&mut controller, 0..60, RIGHT_PALM, &image);
        feed(&mut controller, 60..90, Shown::Nothing, &image);
        assert!(controller.state().hold().is_none());

        let outcomes = feed(&mut controller, 90..91, RIGHT_PALM, &image);
        assert_eq!(
            outcomes[0],
            FrameOutcome::Holding {
                remaining_ns: 5 * NANOS_PER_SEC
            }
        );
    }

    #[test]
    fn blurry_frames_are_retried_until_sharp() {
        let mut controller = running(CaptureConfig::default());
        let outcomes = feed(&mut controller, 0..160, RIGHT_PALM, &blurry());
        assert!(outcomes[150..]
            .iter()
            .all(|o| matches!(o, FrameOutcome::QualityRejected(v) if !v.acceptable)));
        assert!(controller.checklist().is_pending(Gesture::RightPalm));
        assert!(controller.captures().is_empty());

        let outcomes = feed(&mut controller, 160..161, RIGHT_PALM, &sharp());
        assert_eq!(
            outcomes[0],
            FrameOutcome::Captured {
                gesture: Gesture::RightPalm,
                degraded: false
            }
        );
        assert_eq!(controller.state().hold(), None);
    }

    #[test]
    fn degraded_fallback_accepts_after_repeated_rejections() {
        let config = CaptureConfig {
            quality_fallback: QualityFallback::AcceptDegraded { after_attempts: 3 },
            ..CaptureConfig::default()
        };
        let mut controller = running(config);
        let outcomes = feed(&mut controller, 0..154, RIGHT_PALM, &blurry());
        assert!(outcomes[150..153]
            .iter()
            .all(|o| matches!(o, FrameOutcome::QualityRejected(_))));
        assert_eq!(
            outcomes[153],
            FrameOutcome::Captured {
                gesture: Gesture::RightPalm,
                degraded: true
            }
        );
        assert!(controller.captures()[0].degraded);
    }

    #[test]
    fn ordered_checklist_refuses_later_entries() {
        let mut controller = running(CaptureConfig::default());
        let outcomes = feed(&mut controller, 0..200, LEFT_PALM, &sharp());
        assert!(outcomes.iter().all(|o| *o
            == FrameOutcome::OutOfOrder {
                expected: Gesture::RightPalm
            }));
        assert!(controller.captures().is_empty());
    }

    #[test]
    fn unordered_checklist_accepts_any_pending_entry() {
        let config = CaptureConfig {
            enforce_order: false,
            ..CaptureConfig::default()
        };
        let mut controller = running(config);
        let outcomes = feed(&mut controller, 0..151, LEFT_PALM, &sharp());
        assert!(outcomes[150].is_capture());
        assert!(controller.checklist().is_captured(Gesture::LeftPalm));
    }

    #[test]
    fn single_thumb_is_not_required_by_default() {
        let mut controller = running(CaptureConfig::default());
        let outcomes = feed(
            &mut controller,
            0..5,
            Shown::Thumb(Handedness::Right),
            &sharp(),
        );
        assert!(outcomes.iter().all(|o| *o == FrameOutcome::NotRequired));
    }

    #[test]
    fn debounce_spaces_out_captures() {
        let config = CaptureConfig {
            required_gestures: vec![Gesture::RightPalm, Gesture::LeftPalm],
            stabilization_secs: 0.0,
            ..CaptureConfig::default()
        };
        let mut controller = running(config);
        let image = sharp();
        let first = feed(&mut controller, 0..1, RIGHT_PALM, &image);
        assert!(first[0].is_capture());

        let outcomes = feed(&mut controller, 1..151, LEFT_PALM, &image);
        assert_eq!(
            outcomes[0],
            FrameOutcome::Debouncing {
                remaining_ns: 5 * NANOS_PER_SEC - at(1)
            }
        );
        assert!(outcomes[..149]
            .iter()
            .all(|o| matches!(o, FrameOutcome::Debouncing { .. })));
        assert_eq!(
            outcomes[149],
            FrameOutcome::Captured {
                gesture: Gesture::LeftPalm,
                degraded: false
            }
        );
        assert_eq!(controller.phase(), SessionPhase::Complete);

        let after = feed(&mut controller, 151..152, LEFT_PALM, &image);
        assert_eq!(after[0], FrameOutcome::Inactive(SessionPhase::Complete));
    }

    #[test]
    fn full_palm_reading_flow_completes() {
        let config = CaptureConfig {
            stabilization_secs: 1.0,
            debounce_secs: 1.0,
            ..CaptureConfig::default()
        };
        let mut controller = running(config);
        let image = sharp();
        feed(&mut controller, 0..60, RIGHT_PALM, &image);
        feed(&mut controller, 60..150, LEFT_PALM, &image);
        feed(&mut controller, 150..240, Shown::BothThumbs, &image);

        assert_eq!(controller.phase(), SessionPhase::Complete);
        let captured: Vec<Gesture> = controller.captures().iter().map(|c| c.gesture).collect();
        assert_eq!(
            captured,
            vec![Gesture::RightPalm, Gesture::LeftPalm, Gesture::BothThumbs]
        );
    }

    #[test]
    fn coverage_gate_rejects_tiny_hands() {
        let config = CaptureConfig {
            stabilization_secs: 0.0,
            hand_coverage: Some(CoverageGate::default()),
            ..CaptureConfig::default()
        };
        let mut controller = running(config);
        let frame = Frame::new(0, sharp());
        let tiny = vec![hand(Handedness::Right, true, 0.1)];
        assert_eq!(
            controller.process_frame(&frame, &tiny).outcome,
            FrameOutcome::OutOfFrame
        );
        let framed = vec![hand(Handedness::Right, true, 0.7)];
        assert!(controller.process_frame(&frame, &framed).outcome.is_capture());
    }

    #[test]
    fn captures_fit_inside_max_dimensions() {
        let config = CaptureConfig {
            stabilization_secs: 0.0,
            ..CaptureConfig::default()
        };
        let mut controller = running(config);
        let large = Arc::new(RgbImage::from_fn(1280, 960, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        }));
        feed(&mut controller, 0..1, RIGHT_PALM, &large);
        let captured = &controller.captures()[0];
        assert_eq!(captured.image.dimensions(), (640, 480));
    }

    #[test]
    fn front_camera_mirrors_handedness() {
        let mut config = CaptureConfig {
            stabilization_secs: 0.0,
            ..CaptureConfig::default()
        };
        config.classifier.facing_mode = FacingMode::Front;
        let mut controller = running(config);
        let outcomes = feed(&mut controller, 0..1, LEFT_PALM, &sharp());
        assert_eq!(
            outcomes[0],
            FrameOutcome::Captured {
                gesture: Gesture::RightPalm,
                degraded: false
            }
        );
    }

    #[test]
    fn pause_drops_the_hold_and_ignores_frames() {
        let mut controller = running(CaptureConfig::default());
        let image = sharp();
        feed(&mut controller, 0..100, RIGHT_PALM, &image);
        controller.pause().unwrap();
        assert!(controller.state().hold().is_none());
        let paused = feed(&mut controller, 100..110, RIGHT_PALM, &image);
        assert!(paused
            .iter()
            .all(|o| *o == FrameOutcome::Inactive(SessionPhase::Paused)));
        assert!(controller.pause().is_err());

        controller.resume().unwrap();
        let outcomes = feed(&mut controller, 110..111, RIGHT_PALM, &image);
        assert_eq!(
            outcomes[0],
            FrameOutcome::Holding {
                remaining_ns: 5 * NANOS_PER_SEC
            }
        );
    }

    #[test]
    fn lifecycle_transitions() {
        let mut controller = CaptureController::new(CaptureConfig::default()).unwrap();
        assert!(controller.resume().is_err());
        controller.start().unwrap();
        assert!(controller.start().is_err());

        controller.stop();
        assert_eq!(controller.phase(), SessionPhase::Stopped);

        controller.fail("camera unplugged");
        assert_eq!(controller.phase(), SessionPhase::Failed);
        assert_eq!(controller.state().failure(), Some("camera unplugged"));
        controller.stop();
        assert_eq!(controller.phase(), SessionPhase::Failed);
    }

    #[test]
    fn restart_is_the_only_checklist_reset() {
        let config = CaptureConfig {
            stabilization_secs: 0.0,
            ..CaptureConfig::default()
        };
        let mut controller = running(config);
        feed(&mut controller, 0..1, RIGHT_PALM, &sharp());
        controller.pause().unwrap();
        controller.resume().unwrap();
        assert!(controller.checklist().is_captured(Gesture::RightPalm));

        let taken = controller.take_captures();
        assert_eq!(taken.len(), 1);
        assert!(controller.captures().is_empty());
        assert!(controller.checklist().is_captured(Gesture::RightPalm));

        controller.restart();
        assert_eq!(controller.phase(), SessionPhase::Running);
        assert_eq!(controller.checklist().captured_count(), 0);
        assert_eq!(controller.instruction(), Some(Gesture::RightPalm.instruction()));
    }

    #[test]
    fn switching_cameras_clears_history() {
        let mut controller = running(CaptureConfig::default());
        feed(&mut controller, 0..20, RIGHT_PALM, &sharp());
        controller.set_facing_mode(FacingMode::Front);
        assert!(controller.state().stability().is_empty());
        assert!(controller.state().hold().is_none());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = CaptureConfig {
            required_gestures: Vec::new(),
            ..CaptureConfig::default()
        };
        assert!(CaptureController::new(config).is_err());
    }

    fn shown_strategy() -> impl Strategy<Value = Shown> {
        prop_oneof![
            Just(Shown::Nothing),
            Just(Shown::Palm(Handedness::Left)),
            Just(Shown::Palm(Handedness::Right)),
            Just(Shown::Thumb(Handedness::Left)),
            Just(Shown::Thumb(Handedness::Right)),
            Just(Shown::BothThumbs),
        ]
    }

    proptest! {
        #[test]
        fn entries_are_captured_at_most_once(
            script in prop::collection::vec(shown_strategy(), 1..120),
            enforce_order in any::<bool>(),
        ) {
            let config = CaptureConfig {
                stabilization_secs: 0.0,
                debounce_secs: 0.0,
                enforce_order,
                ..CaptureConfig::default()
            };
            let mut controller = running(config);
            let image = Arc::new(RgbImage::from_fn(8, 8, |x, y| {
                if (x + y) % 2 == 0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
            }));
            for (i, shown) in script.into_iter().enumerate() {
                let frame = Frame::new(at(i as u64), image.clone());
                controller.process_frame(&frame, &hands(shown));
            }

            let captures = controller.captures();
            prop_assert_eq!(captures.len(), controller.checklist().captured_count());
            for (i, capture) in captures.iter().enumerate() {
                prop_assert!(controller.checklist().is_captured(capture.gesture));
                prop_assert!(captures[i + 1..].iter().all(|c| c.gesture != capture.gesture));
            }
            prop_assert_eq!(
                controller.phase() == SessionPhase::Complete,
                controller.checklist().is_complete()
            );
        }
    }
}

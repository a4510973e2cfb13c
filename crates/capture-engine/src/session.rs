//! Capture session state.
//!
//! All mutable state of a session lives in [`SessionState`], owned by the
//! [`CaptureController`](crate::controller::CaptureController). Nothing is
//! kept in globals, so two controllers never interfere.

use image::RgbImage;
use palmcap_gesture_core::{QualityVerdict, StabilityFilter};
use palmcap_hand_model::{CaptureChecklist, Gesture, TimestampNs};
use serde::{Deserialize, Serialize};

/// Lifecycle of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Created but not started.
    Idle,
    /// Processing frames.
    Running,
    /// Frames are ignored until resumed.
    Paused,
    /// Stopped by the user before the checklist was done.
    Stopped,
    /// Every checklist entry has been captured.
    Complete,
    /// A collaborator failed to start. Only `restart` leaves this phase.
    Failed,
}

impl SessionPhase {
    /// Whether frames are being evaluated.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Complete | Self::Failed)
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Complete => "complete",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The confirmed gesture currently being held still.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hold {
    pub gesture: Gesture,
    /// Timestamp of the first confirmed frame of this hold.
    pub since_ns: TimestampNs,
    /// Frames of this hold turned down by the blur check.
    pub quality_rejections: u32,
}

impl Hold {
    pub fn new(gesture: Gesture, since_ns: TimestampNs) -> Self {
        Self {
            gesture,
            since_ns,
            quality_rejections: 0,
        }
    }

    pub fn held_ns(&self, now_ns: TimestampNs) -> u64 {
        now_ns.saturating_sub(self.since_ns)
    }
}

/// An accepted still.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub gesture: Gesture,
    pub timestamp_ns: TimestampNs,
    /// Downscaled copy of the frame that passed the gates.
    pub image: RgbImage,
    pub verdict: QualityVerdict,
    /// Accepted by the degraded-quality fallback rather than on merit.
    pub degraded: bool,
}

/// Mutable state of one session.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub(crate) phase: SessionPhase,
    pub(crate) checklist: CaptureChecklist,
    pub(crate) stability: StabilityFilter,
    pub(crate) hold: Option<Hold>,
    pub(crate) last_capture_ns: Option<TimestampNs>,
    pub(crate) captures: Vec<CapturedImage>,
    pub(crate) frames_processed: u64,
    pub(crate) failure: Option<String>,
}

impl SessionState {
    pub fn new(checklist: CaptureChecklist, stability: StabilityFilter) -> Self {
        Self {
            phase: SessionPhase::Idle,
            checklist,
            stability,
            hold: None,
            last_capture_ns: None,
            captures: Vec::new(),
            frames_processed: 0,
            failure: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn checklist(&self) -> &CaptureChecklist {
        &self.checklist
    }

    pub fn stability(&self) -> &StabilityFilter {
        &self.stability
    }

    pub fn hold(&self) -> Option<&Hold> {
        self.hold.as_ref()
    }

    pub fn last_capture_ns(&self) -> Option<TimestampNs> {
        self.last_capture_ns
    }

    pub fn captures(&self) -> &[CapturedImage] {
        &self.captures
    }

    /// Frames evaluated while running.
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Why the session failed, if it did.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Back to a fresh, idle session with the same checklist.
    pub(crate) fn reset(&mut self) {
        self.phase = SessionPhase::Idle;
        self.checklist.reset();
        self.stability.clear();
        self.hold = None;
        self.last_capture_ns = None;
        self.captures.clear();
        self.frames_processed = 0;
        self.failure = None;
    }
}

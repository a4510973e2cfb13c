//! Landmark-depth gesture classification.
//!
//! A hand is classified from two depth comparisons:
//!
//! 1. **Palm:** the wrist is nearer the camera than the middle-finger MCP
//!    by more than `depth_tolerance`.
//! 2. **Thumb-back:** otherwise, the thumb tip is nearer than the thumb's
//!    second joint (landmark 2).
//!
//! The detector's handedness is then corrected for mirrored cameras and
//! combined with the pose.

use palmcap_hand_model::{FacingMode, Gesture, HandLandmarks, Handedness, LandmarkIdx, Pose};
use serde::{Deserialize, Serialize};

/// How to choose between several hands that each classify to a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The last qualifying hand in detector order wins.
    #[default]
    LastDetected,
    /// The hand with the highest handedness score wins; equal scores go to
    /// the later hand.
    HighestConfidence,
}

/// Classifier settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Active camera. Front cameras mirror handedness.
    pub facing_mode: FacingMode,

    /// Minimum depth margin (ε) by which the wrist must lead the
    /// middle-finger MCP for a palm.
    pub depth_tolerance: f32,

    /// Report two thumb-back hands of opposite handedness as
    /// [`Gesture::BothThumbs`].
    pub combine_both_thumbs: bool,

    /// Choice between multiple qualifying hands.
    pub tie_break: TieBreak,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::default(),
            depth_tolerance: 0.02,
            combine_both_thumbs: true,
            tie_break: TieBreak::default(),
        }
    }
}

/// Classification of one hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandClassification {
    /// Subject's real hand, after mirroring correction.
    pub handedness: Handedness,
    pub pose: Pose,
    pub score: f32,
}

impl HandClassification {
    pub fn gesture(&self) -> Gesture {
        Gesture::from_parts(self.handedness, self.pose)
    }
}

/// Map a detector handedness label to the subject's real hand.
///
/// Front cameras produce a mirrored image, so a raw "Left" is the
/// subject's right hand. Rear cameras are taken as-is.
pub fn resolve_handedness(raw: Handedness, facing: FacingMode) -> Handedness {
    if facing.is_mirrored() {
        raw.mirrored()
    } else {
        raw
    }
}

/// Stateless per-frame gesture classifier.
#[derive(Debug, Clone, Default)]
pub struct GestureClassifier {
    config: ClassifierConfig,
}

impl GestureClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Switch cameras without rebuilding the classifier.
    pub fn set_facing_mode(&mut self, facing_mode: FacingMode) {
        self.config.facing_mode = facing_mode;
    }

    /// Pose of one hand, or `None` if neither condition holds.
    pub fn classify_pose(&self, hand: &HandLandmarks) -> Option<Pose> {
        let wrist = hand.landmark(LandmarkIdx::Wrist);
        let middle_mcp = hand.landmark(LandmarkIdx::MiddleFingerMcp);
        if wrist.is_nearer_than(&middle_mcp, self.config.depth_tolerance) {
            return Some(Pose::Palm);
        }

        let thumb_tip = hand.landmark(LandmarkIdx::ThumbTip);
        let thumb_joint = hand.landmark(LandmarkIdx::ThumbMcp);
        if thumb_tip.is_nearer_than(&thumb_joint, 0.0) {
            return Some(Pose::ThumbBack);
        }

        None
    }

    pub fn classify_hand(&self, hand: &HandLandmarks) -> Option<HandClassification> {
        let pose = self.classify_pose(hand)?;
        Some(HandClassification {
            handedness: resolve_handedness(hand.raw_handedness(), self.config.facing_mode),
            pose,
            score: hand.score(),
        })
    }

    /// Classify every hand of one detection cycle into a single gesture.
    ///
    /// No hands, or no hand matching either pose, yields [`Gesture::None`].
    pub fn classify(&self, hands: &[HandLandmarks]) -> Gesture {
        let classified: Vec<HandClassification> =
            hands.iter().filter_map(|h| self.classify_hand(h)).collect();

        if self.config.combine_both_thumbs && shows_both_thumbs(&classified) {
            return Gesture::BothThumbs;
        }

        let chosen = match self.config.tie_break {
            TieBreak::LastDetected => classified.last(),
            TieBreak::HighestConfidence => classified
                .iter()
                .fold(None, |best: Option<&HandClassification>, c| match best {
                    Some(b) if b.score > c.score => Some(b),
                    _ => Some(c),
                }),
        };

        let gesture = chosen.map_or(Gesture::None, HandClassification::gesture);
        if classified.len() > 1 {
            tracing::trace!(
                hands = classified.len(),
                ?gesture,
                tie_break = ?self.config.tie_break,
                "Resolved multiple qualifying hands"
            );
        }
        gesture
    }
}

fn shows_both_thumbs(classified: &[HandClassification]) -> bool {
    let thumb = |hand: Handedness| {
        classified
            .iter()
            .any(|c| c.pose == Pose::ThumbBack && c.handedness == hand)
    };
    thumb(Handedness::Left) && thumb(Handedness::Right)
}

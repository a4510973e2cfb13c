//! Hand landmark types.

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Number of landmarks in one hand skeleton.
pub const LANDMARK_COUNT: usize = 21;

/// A single detector keypoint.
///
/// `x` and `y` are normalized to the frame width and height; `z` is depth
/// relative to the wrist, negative towards the camera.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Whether this point is nearer the camera than `other` by more than
    /// `margin`.
    pub fn is_nearer_than(&self, other: &Landmark, margin: f32) -> bool {
        self.z < other.z - margin
    }
}

/// Which hand the detector believes it saw.
///
/// Detectors label hands as they appear in the image they were given, so a
/// mirrored (selfie) image reports the opposite of the subject's real hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    #[serde(alias = "Left")]
    Left,
    #[serde(alias = "Right")]
    Right,
}

impl Handedness {
    /// The opposite hand.
    pub fn mirrored(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl std::fmt::Display for Handedness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => f.write_str("Left"),
            Self::Right => f.write_str("Right"),
        }
    }
}

/// Names for the hand landmarks, in detector output order.
///
/// - **CMC**: carpometacarpal joint, the thumb joint nearest the wrist.
/// - **MCP**: metacarpophalangeal joint, the knuckles where fingers meet the palm.
/// - **PIP/DIP**: proximal and distal interphalangeal finger joints.
/// - **IP**: the thumb's single interphalangeal joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIdx {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Axis-aligned bounds of a hand, in normalized frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// Area as a fraction of the whole frame.
    ///
    /// Points the detector places outside the frame are clipped first.
    pub fn frame_coverage(&self) -> f32 {
        let w = self.max_x.min(1.0) - self.min_x.max(0.0);
        let h = self.max_y.min(1.0) - self.min_y.max(0.0);
        w.max(0.0) * h.max(0.0)
    }
}

/// One detected hand: 21 landmarks plus the detector's handedness guess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HandRecord", into = "HandRecord")]
pub struct HandLandmarks {
    landmarks: [Landmark; LANDMARK_COUNT],
    handedness: Handedness,
    score: f32,
}

/// Wire form of [`HandLandmarks`]; the landmark count is checked on load.
#[derive(Serialize, Deserialize)]
struct HandRecord {
    handedness: Handedness,
    #[serde(default = "default_score")]
    score: f32,
    landmarks: Vec<Landmark>,
}

fn default_score() -> f32 {
    1.0
}

impl TryFrom<HandRecord> for HandLandmarks {
    type Error = ModelError;

    fn try_from(record: HandRecord) -> Result<Self, Self::Error> {
        Self::new(record.landmarks, record.handedness, record.score)
    }
}

impl From<HandLandmarks> for HandRecord {
    fn from(hand: HandLandmarks) -> Self {
        Self {
            handedness: hand.handedness,
            score: hand.score,
            landmarks: hand.landmarks.to_vec(),
        }
    }
}

impl HandLandmarks {
    /// Build a hand from detector output.
    ///
    /// Fails unless exactly [`LANDMARK_COUNT`] landmarks are given. The score
    /// is clamped to `[0.0, 1.0]`.
    pub fn new(
        landmarks: Vec<Landmark>,
        handedness: Handedness,
        score: f32,
    ) -> Result<Self, ModelError> {
        let actual = landmarks.len();
        let landmarks: [Landmark; LANDMARK_COUNT] =
            landmarks.try_into().map_err(|_| ModelError::LandmarkCount {
                expected: LANDMARK_COUNT,
                actual,
            })?;
        Ok(Self::from_array(landmarks, handedness, score))
    }

    pub fn from_array(
        landmarks: [Landmark; LANDMARK_COUNT],
        handedness: Handedness,
        score: f32,
    ) -> Self {
        Self {
            landmarks,
            handedness,
            score: score.clamp(0.0, 1.0),
        }
    }

    #[inline]
    pub fn landmark(&self, idx: LandmarkIdx) -> Landmark {
        self.landmarks[idx as usize]
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn landmark_mut(&mut self, idx: LandmarkIdx) -> &mut Landmark {
        &mut self.landmarks[idx as usize]
    }

    /// Handedness exactly as the detector reported it, before any mirroring
    /// correction.
    pub fn raw_handedness(&self) -> Handedness {
        self.handedness
    }

    /// Detector confidence for the handedness label.
    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let first = self.landmarks[0];
        let init = BoundingBox {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        self.landmarks[1..].iter().fold(init, |bb, lm| BoundingBox {
            min_x: bb.min_x.min(lm.x),
            min_y: bb.min_y.min(lm.y),
            max_x: bb.max_x.max(lm.x),
            max_y: bb.max_y.max(lm.y),
        })
    }
}

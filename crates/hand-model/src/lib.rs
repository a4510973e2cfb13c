//! palmcap Hand Model
//!
//! Defines the data contracts shared by the classifier and the capture
//! controller:
//! - **Landmarks:** 21-point hand skeletons as reported by a landmark detector
//! - **Detections:** Timestamped per-frame detector output, stored as JSONL
//! - **Gestures:** The discrete poses a capture session asks for
//! - **Checklist:** Which required gestures have been captured so far
//!
//! Landmark `x`/`y` are normalized to the frame; `z` is relative depth where
//! smaller values are nearer the camera.

pub mod checklist;
pub mod detection;
pub mod gesture;
pub mod landmark;

pub use checklist::*;
pub use detection::*;
pub use gesture::*;
pub use landmark::*;

/// Errors raised while building or parsing model values.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("expected {expected} landmarks, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },

    #[error("checklist already contains {gesture}")]
    DuplicateGesture { gesture: Gesture },

    #[error("{gesture} cannot be a checklist entry")]
    InvalidChecklistEntry { gesture: Gesture },

    #[error("unknown gesture name: {name}")]
    UnknownGesture { name: String },

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

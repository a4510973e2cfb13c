//! Gesture labels and camera facing modes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::landmark::Handedness;
use crate::ModelError;

/// Pose of a single hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pose {
    /// Palm facing the camera.
    Palm,
    /// Back of the hand towards the camera with the thumb tip forward.
    ThumbBack,
}

/// Which way the active camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    /// User-facing camera. Its preview is mirrored, so detector handedness
    /// is the opposite of the subject's real hand.
    #[serde(alias = "user")]
    Front,
    /// Environment-facing camera; no mirroring.
    #[default]
    #[serde(alias = "environment")]
    Back,
}

impl FacingMode {
    pub fn is_mirrored(self) -> bool {
        matches!(self, Self::Front)
    }
}

impl FromStr for FacingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "front" | "user" => Ok(Self::Front),
            "back" | "rear" | "environment" => Ok(Self::Back),
            other => Err(format!("unknown facing mode: {other} (expected front|back)")),
        }
    }
}

/// A classified gesture for one detection cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    LeftPalm,
    RightPalm,
    LeftThumb,
    RightThumb,
    /// Both hands showing thumb-back at once. Only produced when the
    /// classifier is configured to combine thumbs.
    BothThumbs,
    #[default]
    None,
}

impl Gesture {
    /// Every capturable gesture. The first three form the default checklist.
    pub const CAPTURABLE: [Gesture; 5] = [
        Gesture::RightPalm,
        Gesture::LeftPalm,
        Gesture::BothThumbs,
        Gesture::RightThumb,
        Gesture::LeftThumb,
    ];

    /// Combine a resolved hand and pose.
    pub fn from_parts(hand: Handedness, pose: Pose) -> Self {
        match (hand, pose) {
            (Handedness::Left, Pose::Palm) => Self::LeftPalm,
            (Handedness::Right, Pose::Palm) => Self::RightPalm,
            (Handedness::Left, Pose::ThumbBack) => Self::LeftThumb,
            (Handedness::Right, Pose::ThumbBack) => Self::RightThumb,
        }
    }

    pub fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Human-readable label, as shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            Self::LeftPalm => "Left Palm",
            Self::RightPalm => "Right Palm",
            Self::LeftThumb => "Left Thumb",
            Self::RightThumb => "Right Thumb",
            Self::BothThumbs => "Thumbs Back",
            Self::None => "None",
        }
    }

    /// Filesystem-friendly name.
    pub fn slug(self) -> &'static str {
        match self {
            Self::LeftPalm => "left-palm",
            Self::RightPalm => "right-palm",
            Self::LeftThumb => "left-thumb",
            Self::RightThumb => "right-thumb",
            Self::BothThumbs => "thumbs-back",
            Self::None => "none",
        }
    }

    /// Instruction shown while waiting for this gesture.
    pub fn instruction(self) -> &'static str {
        match self {
            Self::LeftPalm => "Show your left palm to the camera",
            Self::RightPalm => "Show your right palm to the camera",
            Self::LeftThumb => "Show the back of your left thumb to the camera",
            Self::RightThumb => "Show the back of your right thumb to the camera",
            Self::BothThumbs => "Show the back of both thumbs to the camera",
            Self::None => "",
        }
    }
}

impl std::fmt::Display for Gesture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Gesture {
    type Err = ModelError;

    /// Accepts slugs (`right-palm`), snake case (`right_palm`) and labels
    /// (`Right Palm`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '_' | ' ' => '-',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        if normalized == "both-thumbs" {
            return Ok(Self::BothThumbs);
        }
        Gesture::CAPTURABLE
            .into_iter()
            .chain(std::iter::once(Gesture::None))
            .find(|g| g.slug() == normalized)
            .ok_or_else(|| ModelError::UnknownGesture {
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_combine_into_gestures() {
        assert_eq!(
            Gesture::from_parts(Handedness::Left, Pose::Palm),
            Gesture::LeftPalm
        );
        assert_eq!(
            Gesture::from_parts(Handedness::Right, Pose::ThumbBack),
            Gesture::RightThumb
        );
    }

    #[test]
    fn parses_every_spelling() {
        assert_eq!("right-palm".parse::<Gesture>().unwrap(), Gesture::RightPalm);
        assert_eq!("Right Palm".parse::<Gesture>().unwrap(), Gesture::RightPalm);
        assert_eq!("left_thumb".parse::<Gesture>().unwrap(), Gesture::LeftThumb);
        assert_eq!("Thumbs Back".parse::<Gesture>().unwrap(), Gesture::BothThumbs);
        assert_eq!("both_thumbs".parse::<Gesture>().unwrap(), Gesture::BothThumbs);
        assert!("fist".parse::<Gesture>().is_err());
    }

    #[test]
    fn facing_mode_accepts_browser_names() {
        assert_eq!("user".parse::<FacingMode>().unwrap(), FacingMode::Front);
        assert_eq!(
            "environment".parse::<FacingMode>().unwrap(),
            FacingMode::Back
        );
        let parsed: FacingMode = serde_json::from_str("\"environment\"").unwrap();
        assert_eq!(parsed, FacingMode::Back);
        assert!(FacingMode::Front.is_mirrored());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Gesture::BothThumbs).unwrap();
        assert_eq!(json, "\"both_thumbs\"");
    }
}

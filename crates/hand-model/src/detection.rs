//! Per-frame detector output and its JSONL recording format.
//!
//! A recording holds one [`DetectionFrame`] per line. Lines starting with
//! `#` are comments (recordings usually open with a header comment).

use serde::{Deserialize, Serialize};

use crate::landmark::HandLandmarks;
use crate::ModelError;

/// Monotonic timestamp in nanoseconds since session start.
pub type TimestampNs = u64;

/// Everything the landmark detector reported for one video frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    /// Detected hands in detector order. Empty when no hand is visible.
    #[serde(default)]
    pub hands: Vec<HandLandmarks>,
}

impl DetectionFrame {
    pub fn new(timestamp_ns: TimestampNs, hands: Vec<HandLandmarks>) -> Self {
        Self {
            timestamp_ns,
            hands,
        }
    }

    /// A frame in which nothing was detected.
    pub fn empty(timestamp_ns: TimestampNs) -> Self {
        Self::new(timestamp_ns, Vec::new())
    }

    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp_ns as f64 / 1_000_000_000.0
    }
}

/// Parse a JSONL recording, skipping blank and `#` lines.
///
/// Errors report the 1-based line number of the offending record.
pub fn parse_detections(jsonl: &str) -> Result<Vec<DetectionFrame>, ModelError> {
    jsonl
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, text)| {
            serde_json::from_str(text).map_err(|source| ModelError::Parse { line, source })
        })
        .collect()
}

/// Serialize frames to JSONL, one record per line.
pub fn serialize_detections(frames: &[DetectionFrame]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for frame in frames {
        output.push_str(&serde_json::to_string(frame)?);
        output.push('\n');
    }
    Ok(output)
}

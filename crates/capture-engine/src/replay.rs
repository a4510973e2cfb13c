//! Replay of recorded landmark sessions.
//!
//! A recording is a JSONL file of [`DetectionFrame`]s. Replaying it pairs
//! every recorded timestamp with a still image, so the whole capture flow
//! can run without a camera or a model.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use image::{Rgb, RgbImage};
use palmcap_common::error::{PalmcapError, PalmcapResult};
use palmcap_hand_model::{parse_detections, DetectionFrame, HandLandmarks, TimestampNs};

use crate::source::{Frame, FrameSource, LandmarkDetector, SourceInfo};

/// Read a landmark recording from disk.
pub fn load_recording(path: &Path) -> PalmcapResult<Vec<DetectionFrame>> {
    if !path.exists() {
        return Err(PalmcapError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path)?;
    let frames = parse_detections(&text).map_err(|e| {
        PalmcapError::landmarks(format!("{}: {e}", path.display()))
    })?;
    tracing::debug!(path = %path.display(), frames = frames.len(), "Loaded landmark recording");
    Ok(frames)
}

/// Build a matching source and detector from a recording.
///
/// Every frame shows `still`.
pub fn replay(recording: Vec<DetectionFrame>, still: RgbImage) -> (ReplaySource, ReplayDetector) {
    let still = Arc::new(still);
    let frames: Vec<Frame> = recording
        .iter()
        .map(|d| Frame::new(d.timestamp_ns, still.clone()))
        .collect();
    (ReplaySource::new(frames), ReplayDetector::new(recording))
}

/// Frames from memory.
#[derive(Debug, Default)]
pub struct ReplaySource {
    frames: VecDeque<Frame>,
    opened: bool,
}

impl ReplaySource {
    pub fn new(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            opened: false,
        }
    }

    /// Frames not yet delivered.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait::async_trait]
impl FrameSource for ReplaySource {
    async fn open(&mut self) -> PalmcapResult<SourceInfo> {
        let (width, height) = self.frames.front().map_or((0, 0), Frame::dimensions);
        self.opened = true;
        Ok(SourceInfo {
            width,
            height,
            facing_mode: None,
        })
    }

    async fn next_frame(&mut self) -> PalmcapResult<Option<Frame>> {
        if !self.opened {
            return Err(PalmcapError::camera("replay source read before open"));
        }
        Ok(self.frames.pop_front())
    }

    async fn close(&mut self) -> PalmcapResult<()> {
        self.opened = false;
        Ok(())
    }
}

/// Detector answering from a recording, consumed in recording order.
///
/// Each recorded entry answers at most one frame. Entries older than the
/// frame being detected were skipped by the caller and are dropped; frames
/// with no entry at their timestamp have no hands.
#[derive(Debug, Default)]
pub struct ReplayDetector {
    pending: VecDeque<DetectionFrame>,
    ready: bool,
}

impl ReplayDetector {
    pub fn new(recording: impl IntoIterator<Item = DetectionFrame>) -> Self {
        Self {
            pending: recording.into_iter().collect(),
            ready: false,
        }
    }

    /// Entries not yet matched to a frame.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    fn take(&mut self, timestamp_ns: TimestampNs) -> Vec<HandLandmarks> {
        while self
            .pending
            .front()
            .is_some_and(|d| d.timestamp_ns < timestamp_ns)
        {
            self.pending.pop_front();
        }
        match self.pending.front() {
            Some(d) if d.timestamp_ns == timestamp_ns => self
                .pending
                .pop_front()
                .map(|d| d.hands)
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl LandmarkDetector for ReplayDetector {
    async fn init(&mut self) -> PalmcapResult<()> {
        self.ready = true;
        Ok(())
    }

    async fn detect(&mut self, frame: &Frame) -> PalmcapResult<Vec<HandLandmarks>> {
        if !self.ready {
            return Err(PalmcapError::detector("replay detector used before init"));
        }
        Ok(self.take(frame.timestamp_ns))
    }

    async fn shutdown(&mut self) -> PalmcapResult<()> {
        self.ready = false;
        Ok(())
    }
}

/// Synthetic still with sharp edges everywhere, for replays run without a
/// photo.
pub fn test_pattern(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let v = if (x / 2 + y / 2) % 2 == 0 { 32 } else { 224 };
        Rgb([v, v.saturating_sub(16), v.saturating_sub(32)])
    })
}

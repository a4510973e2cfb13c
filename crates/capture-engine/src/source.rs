//! Collaborator interfaces: where frames and landmarks come from.

use std::sync::Arc;

use image::RgbImage;
use palmcap_common::error::PalmcapResult;
use palmcap_hand_model::{FacingMode, HandLandmarks, TimestampNs};

/// One camera frame.
///
/// The image is shared so that sources replaying a single still, and the
/// controller snapshotting a frame for capture, avoid copying pixels.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Capture time relative to the session epoch.
    pub timestamp_ns: TimestampNs,
    pub image: Arc<RgbImage>,
}

impl Frame {
    pub fn new(timestamp_ns: TimestampNs, image: Arc<RgbImage>) -> Self {
        Self {
            timestamp_ns,
            image,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// What an opened source reports about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo {
    pub width: u32,
    pub height: u32,
    /// Known when the source is a physical camera.
    pub facing_mode: Option<FacingMode>,
}

/// A stream of frames, typically a camera.
#[async_trait::async_trait]
pub trait FrameSource: Send {
    /// Acquire the device. Failure here is fatal to the session.
    async fn open(&mut self) -> PalmcapResult<SourceInfo>;

    /// Next frame, or `None` once the stream has ended.
    async fn next_frame(&mut self) -> PalmcapResult<Option<Frame>>;

    /// Release the device. Called on every loop exit.
    async fn close(&mut self) -> PalmcapResult<()>;
}

/// Hand landmark model.
#[async_trait::async_trait]
pub trait LandmarkDetector: Send {
    /// Load the model. May fail transiently (downloads, GPU start-up).
    async fn init(&mut self) -> PalmcapResult<()>;

    /// Landmarks for every hand visible in `frame`. An empty vector means
    /// no hands.
    async fn detect(&mut self, frame: &Frame) -> PalmcapResult<Vec<HandLandmarks>>;

    async fn shutdown(&mut self) -> PalmcapResult<()> {
        Ok(())
    }
}

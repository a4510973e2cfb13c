//! Hand framing and capture sizing.

use image::imageops::{self, FilterType};
use image::RgbImage;
use palmcap_common::error::{PalmcapError, PalmcapResult};
use palmcap_hand_model::HandLandmarks;
use serde::{Deserialize, Serialize};

/// Accepts hands whose bounding box covers a given share of the frame.
///
/// Too small and palm lines are unreadable; too large and fingers are cut
/// off. Bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageGate {
    pub min: f32,
    pub max: f32,
}

impl Default for CoverageGate {
    fn default() -> Self {
        Self { min: 0.3, max: 0.7 }
    }
}

impl CoverageGate {
    pub fn validate(&self) -> PalmcapResult<()> {
        if !(0.0..=1.0).contains(&self.min) || !(0.0..=1.0).contains(&self.max) {
            return Err(PalmcapError::config(format!(
                "hand coverage bounds must lie in [0, 1], got ({}, {})",
                self.min, self.max
            )));
        }
        if self.min >= self.max {
            return Err(PalmcapError::config(format!(
                "hand coverage min ({}) must be below max ({})",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn admits(&self, hand: &HandLandmarks) -> bool {
        let coverage = hand.bounding_box().frame_coverage();
        coverage > self.min && coverage < self.max
    }

    /// At least one hand is framed correctly.
    pub fn admits_any(&self, hands: &[HandLandmarks]) -> bool {
        hands.iter().any(|h| self.admits(h))
    }
}

/// Largest size with the same aspect ratio as `width`×`height` that fits
/// inside `max_width`×`max_height`. Images that already fit keep their size.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 || (width <= max_width && height <= max_height) {
        return (width, height);
    }
    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let w = ((width as f64 * scale).round() as u32).clamp(1, max_width.max(1));
    let h = ((height as f64 * scale).round() as u32).clamp(1, max_height.max(1));
    (w, h)
}

/// Downscale a still so it fits inside the capture size cap.
pub fn downscale_to_fit(image: &RgbImage, max_width: u32, max_height: u32) -> RgbImage {
    let (w, h) = fit_within(image.width(), image.height(), max_width, max_height);
    if (w, h) == image.dimensions() {
        return image.clone();
    }
    imageops::resize(image, w, h, FilterType::Triangle)
}

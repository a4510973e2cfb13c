//! Blur detection via Laplacian variance.
//!
//! A sharp image has strong, varied second derivatives at edges; a blurry
//! one is smooth everywhere. The gate converts sampled pixels to luma,
//! applies the 4-neighbour Laplacian
//!
//! ```text
//!  0 -1  0
//! -1  4 -1
//!  0 -1  0
//! ```
//!
//! and compares the variance of the responses against a threshold.
//! Sampling every `sample_stride`-th interior pixel in both axes bounds the
//! cost of a check so it fits inside one frame of the detection loop.

use image::{DynamicImage, GrayImage, RgbImage};
use palmcap_common::error::{PalmcapError, PalmcapResult};
use serde::{Deserialize, Serialize};

/// Quality gate settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Variance (8-bit luma scale) a frame must exceed to count as sharp.
    pub blur_threshold: f64,

    /// Step between sampled pixels, in both axes. 1 samples every interior
    /// pixel.
    pub sample_stride: u32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            blur_threshold: 20.0,
            sample_stride: 3,
        }
    }
}

impl QualityConfig {
    pub fn validate(&self) -> PalmcapResult<()> {
        if !self.blur_threshold.is_finite() || self.blur_threshold < 0.0 {
            return Err(PalmcapError::config(format!(
                "blur_threshold must be a non-negative number, got {}",
                self.blur_threshold
            )));
        }
        if self.sample_stride == 0 {
            return Err(PalmcapError::config("sample_stride must be at least 1"));
        }
        Ok(())
    }
}

/// Outcome of one quality check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityVerdict {
    /// Variance of the Laplacian response.
    pub variance: f64,
    /// Threshold the variance was compared against.
    pub threshold: f64,
    /// Number of pixels sampled.
    pub samples: usize,
    /// `variance > threshold`.
    pub acceptable: bool,
}

/// Summary statistics of the sampled Laplacian response.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LaplacianStats {
    pub mean: f64,
    pub variance: f64,
    pub samples: usize,
}

/// Rec. 601 luma, matching what a browser canvas grayscale pass produces.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> f64 {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

/// Laplacian statistics over interior pixels of a `width`×`height` image
/// whose luma is read through `luma_at`.
///
/// Images narrower or shorter than 3 pixels have no interior and return
/// zero samples.
pub fn laplacian_stats(
    width: u32,
    height: u32,
    stride: u32,
    luma_at: impl Fn(u32, u32) -> f64,
) -> LaplacianStats {
    if width < 3 || height < 3 {
        return LaplacianStats::default();
    }
    let stride = stride.max(1) as usize;

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut samples = 0usize;
    for y in (1..height - 1).step_by(stride) {
        for x in (1..width - 1).step_by(stride) {
            let response = 4.0 * luma_at(x, y)
                - luma_at(x, y - 1)
                - luma_at(x, y + 1)
                - luma_at(x - 1, y)
                - luma_at(x + 1, y);
            sum += response;
            sum_sq += response * response;
            samples += 1;
        }
    }

    let n = samples as f64;
    let mean = sum / n;
    LaplacianStats {
        mean,
        variance: (sum_sq / n - mean * mean).max(0.0),
        samples,
    }
}

/// Laplacian variance of a grayscale image.
pub fn laplacian_variance(image: &GrayImage, stride: u32) -> f64 {
    laplacian_stats(image.width(), image.height(), stride, |x, y| {
        image.get_pixel(x, y).0[0] as f64
    })
    .variance
}

/// Sharpness gate applied to candidate stills.
#[derive(Debug, Clone, Default)]
pub struct QualityGate {
    config: QualityConfig,
}

impl QualityGate {
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Assess an RGB frame, converting only the sampled neighbourhoods to
    /// luma.
    pub fn assess_rgb(&self, image: &RgbImage) -> QualityVerdict {
        let stats = laplacian_stats(
            image.width(),
            image.height(),
            self.config.sample_stride,
            |x, y| {
                let [r, g, b] = image.get_pixel(x, y).0;
                luma(r, g, b)
            },
        );
        self.verdict(stats)
    }

    pub fn assess_gray(&self, image: &GrayImage) -> QualityVerdict {
        let stats = laplacian_stats(
            image.width(),
            image.height(),
            self.config.sample_stride,
            |x, y| image.get_pixel(x, y).0[0] as f64,
        );
        self.verdict(stats)
    }

    /// Assess any decoded image.
    pub fn assess(&self, image: &DynamicImage) -> QualityVerdict {
        match image {
            DynamicImage::ImageLuma8(gray) => self.assess_gray(gray),
            DynamicImage::ImageRgb8(rgb) => self.assess_rgb(rgb),
            other => self.assess_rgb(&other.to_rgb8()),
        }
    }

    fn verdict(&self, stats: LaplacianStats) -> QualityVerdict {
        let acceptable = stats.samples > 0 && stats.variance > self.config.blur_threshold;
        tracing::debug!(
            variance = stats.variance,
            threshold = self.config.blur_threshold,
            samples = stats.samples,
            acceptable,
            "Quality check"
        );
        QualityVerdict {
            variance: stats.variance,
            threshold: self.config.blur_threshold,
            samples: stats.samples,
            acceptable,
        }
    }
}

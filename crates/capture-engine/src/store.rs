//! On-disk capture output.
//!
//! ```text
//! <dir>/
//!   right-palm.jpg
//!   left-palm.jpg
//!   thumbs-back.jpg
//!   manifest.json
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use palmcap_common::error::{PalmcapError, PalmcapResult};
use palmcap_hand_model::{FacingMode, Gesture, TimestampNs};
use serde::{Deserialize, Serialize};

use crate::session::CapturedImage;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const MANIFEST_SCHEMA_VERSION: &str = "1.0";
pub const JPEG_QUALITY: u8 = 80;

/// One saved still.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub gesture: Gesture,
    pub label: String,
    /// Path relative to the manifest.
    pub file: String,
    pub timestamp_ns: TimestampNs,
    /// Laplacian variance of the accepted frame.
    pub variance: f64,
    #[serde(default)]
    pub degraded: bool,
}

/// Index of a capture directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureManifest {
    pub schema_version: String,
    /// Session start, RFC 3339.
    pub started_at: String,
    pub facing_mode: FacingMode,
    pub entries: Vec<ManifestEntry>,
}

impl CaptureManifest {
    pub fn new(started_at: impl Into<String>, facing_mode: FacingMode) -> Self {
        Self {
            schema_version: MANIFEST_SCHEMA_VERSION.to_string(),
            started_at: started_at.into(),
            facing_mode,
            entries: Vec::new(),
        }
    }

    pub fn entry(&self, gesture: Gesture) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.gesture == gesture)
    }
}

/// Writes captures into a directory.
#[derive(Debug, Clone)]
pub struct CaptureStore {
    root: PathBuf,
}

impl CaptureStore {
    /// Use `root`, creating it if needed.
    pub fn create(root: impl Into<PathBuf>) -> PalmcapResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// Encode every capture as JPEG and write the manifest.
    pub fn save(
        &self,
        captures: &[CapturedImage],
        started_at: &str,
        facing_mode: FacingMode,
    ) -> PalmcapResult<CaptureManifest> {
        let mut manifest = CaptureManifest::new(started_at, facing_mode);
        for capture in captures {
            let file = format!("{}.jpg", capture.gesture.slug());
            self.write_jpeg(&self.root.join(&file), capture)?;
            manifest.entries.push(ManifestEntry {
                gesture: capture.gesture,
                label: capture.gesture.label().to_string(),
                file,
                timestamp_ns: capture.timestamp_ns,
                variance: capture.verdict.variance,
                degraded: capture.degraded,
            });
        }

        let json = serde_json::to_string_pretty(&manifest)?;
        std::fs::write(self.manifest_path(), json)?;
        tracing::info!(
            dir = %self.root.display(),
            captures = manifest.entries.len(),
            "Saved captures"
        );
        Ok(manifest)
    }

    /// Read back the manifest of this directory.
    pub fn load_manifest(&self) -> PalmcapResult<CaptureManifest> {
        let path = self.manifest_path();
        if !path.exists() {
            return Err(PalmcapError::FileNotFound { path });
        }
        let text = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn write_jpeg(&self, path: &Path, capture: &CapturedImage) -> PalmcapResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY)
            .encode_image(&capture.image)
            .map_err(|e| {
                PalmcapError::capture(format!("Failed to encode {}: {e}", path.display()))
            })?;
        writer.flush()?;
        tracing::debug!(path = %path.display(), gesture = %capture.gesture, "Wrote capture");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use palmcap_gesture_core::QualityVerdict;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("palmcap-store-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn capture(gesture: Gesture, degraded: bool) -> CapturedImage {
        CapturedImage {
            gesture,
            timestamp_ns: 5_000_000_000,
            image: RgbImage::from_pixel(40, 30, Rgb([200, 150, 120])),
            verdict: QualityVerdict {
                variance: 42.5,
                threshold: 20.0,
                samples: 100,
                acceptable: !degraded,
            },
            degraded,
        }
    }

    #[test]
    fn writes_jpegs_and_manifest() {
        let dir = temp_dir("save");
        let store = CaptureStore::create(&dir).unwrap();
        let manifest = store
            .save(
                &[
                    capture(Gesture::RightPalm, false),
                    capture(Gesture::BothThumbs, true),
                ],
                "2026-01-01T00:00:00Z",
                FacingMode::Front,
            )
            .unwrap();

        assert!(dir.join("right-palm.jpg").exists());
        assert!(dir.join("thumbs-back.jpg").exists());
        let decoded = image::open(dir.join("right-palm.jpg")).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 30));

        let loaded = store.load_manifest().unwrap();
        assert_eq!(loaded, manifest);
        assert_eq!(loaded.schema_version, "1.0");
        let thumbs = loaded.entry(Gesture::BothThumbs).unwrap();
        assert_eq!(thumbs.label, "Thumbs Back");
        assert!(thumbs.degraded);
        assert!(loaded.entry(Gesture::LeftPalm).is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_manifest_is_reported() {
        let dir = temp_dir("missing");
        let store = CaptureStore::create(&dir).unwrap();
        assert!(matches!(
            store.load_manifest(),
            Err(PalmcapError::FileNotFound { .. })
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}

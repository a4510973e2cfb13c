//! Capture and application configuration.
//!
//! Everything a session can be tuned with lives in [`CaptureConfig`];
//! [`AppConfig`] wraps it together with logging and retry settings and is
//! what `config.json` deserializes into. Every field has a default, so a
//! partial file only overrides what it names.

use std::path::Path;

use palmcap_common::clock::SessionClock;
use palmcap_common::config::{
    config_file_path, load_json, load_json_or_default, save_json, LoggingConfig,
};
use palmcap_common::error::{PalmcapError, PalmcapResult};
use palmcap_common::retry::RetryPolicy;
use palmcap_gesture_core::{ClassifierConfig, CoverageGate, QualityConfig, StabilityConfig};
use palmcap_hand_model::{CaptureChecklist, FacingMode, Gesture};
use serde::{Deserialize, Serialize};

/// What to do when a held gesture keeps failing the blur check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum QualityFallback {
    /// Keep rejecting until a sharp frame arrives.
    #[default]
    Retry,
    /// Accept the frame, flagged as degraded, once this many frames of the
    /// current hold have been rejected.
    AcceptDegraded { after_attempts: u32 },
}

/// Capture session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Pose and handedness classification.
    pub classifier: ClassifierConfig,

    /// Rolling-history vote.
    pub stability: StabilityConfig,

    /// Blur gate.
    pub quality: QualityConfig,

    /// Gestures to collect, in presentation order.
    pub required_gestures: Vec<Gesture>,

    /// Only the first pending gesture may be captured.
    pub enforce_order: bool,

    /// How long a confirmed gesture must be held before capture.
    pub stabilization_secs: f64,

    /// Minimum gap between two accepted captures.
    pub debounce_secs: f64,

    pub quality_fallback: QualityFallback,

    /// Optional hand-size check. `None` disables it.
    pub hand_coverage: Option<CoverageGate>,

    /// Captured stills are downscaled to fit these bounds.
    pub max_capture_width: u32,
    pub max_capture_height: u32,

    /// Detection rate cap. 0 processes every frame.
    pub target_fps: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            stability: StabilityConfig::default(),
            quality: QualityConfig::default(),
            required_gestures: Gesture::CAPTURABLE[..3].to_vec(),
            enforce_order: true,
            stabilization_secs: 5.0,
            debounce_secs: 5.0,
            quality_fallback: QualityFallback::Retry,
            hand_coverage: None,
            max_capture_width: 640,
            max_capture_height: 480,
            target_fps: 30,
        }
    }
}

impl CaptureConfig {
    pub fn facing_mode(&self) -> FacingMode {
        self.classifier.facing_mode
    }

    /// Build the checklist described by `required_gestures`.
    pub fn checklist(&self) -> PalmcapResult<CaptureChecklist> {
        CaptureChecklist::new(self.required_gestures.iter().copied())
            .map_err(|e| PalmcapError::config(e.to_string()))
    }

    pub fn stabilization_ns(&self) -> u64 {
        SessionClock::secs_to_ns(self.stabilization_secs)
    }

    pub fn debounce_ns(&self) -> u64 {
        SessionClock::secs_to_ns(self.debounce_secs)
    }

    /// Reject settings no session could run with.
    pub fn validate(&self) -> PalmcapResult<()> {
        self.stability.validate()?;
        self.quality.validate()?;
        if let Some(gate) = &self.hand_coverage {
            gate.validate()?;
        }

        let checklist = self.checklist()?;
        if checklist.is_empty() {
            return Err(PalmcapError::config("required_gestures must not be empty"));
        }
        if checklist.contains(Gesture::BothThumbs) && !self.classifier.combine_both_thumbs {
            return Err(PalmcapError::config(
                "both_thumbs is required but classifier.combine_both_thumbs is off",
            ));
        }

        let tolerance = self.classifier.depth_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(PalmcapError::config(format!(
                "depth_tolerance must be a non-negative number, got {tolerance}"
            )));
        }
        for (name, secs) in [
            ("stabilization_secs", self.stabilization_secs),
            ("debounce_secs", self.debounce_secs),
        ] {
            if !secs.is_finite() || secs < 0.0 {
                return Err(PalmcapError::config(format!(
                    "{name} must be a non-negative number, got {secs}"
                )));
            }
        }
        if self.max_capture_width == 0 || self.max_capture_height == 0 {
            return Err(PalmcapError::config("max capture dimensions must be non-zero"));
        }
        Ok(())
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub capture: CaptureConfig,
    pub logging: LoggingConfig,
    /// Applied to landmark detector start-up.
    pub retry: RetryPolicy,
}

impl AppConfig {
    /// Load from the user config file, falling back to defaults when it is
    /// missing or unreadable.
    pub fn load() -> Self {
        Self::load_or_default(&config_file_path())
    }

    /// Load `path`, falling back to defaults when it is missing, unreadable
    /// or fails validation.
    pub fn load_or_default(path: &Path) -> Self {
        let config: Self = load_json_or_default(path);
        match config.capture.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring invalid config file");
                Self::default()
            }
        }
    }

    /// Load and validate an explicit config file.
    pub fn load_from(path: &Path) -> PalmcapResult<Self> {
        let config: Self = load_json(path)?;
        config.capture.validate()?;
        Ok(config)
    }

    /// Write to the user config file.
    pub fn save(&self) -> PalmcapResult<()> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> PalmcapResult<()> {
        save_json(path, self)
    }
}

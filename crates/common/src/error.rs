//! Error types shared across palmcap crates.

use std::path::PathBuf;

/// Top-level error type for palmcap operations.
///
/// Classification and quality-gate rejections are not errors; they are
/// reported as frame outcomes. Only conditions that stop a session or a
/// tool invocation end up here.
#[derive(Debug, thiserror::Error)]
pub enum PalmcapError {
    #[error("Camera error: {message}")]
    Camera { message: String },

    #[error("Landmark detector error: {message}")]
    Detector { message: String },

    #[error("Invalid landmarks: {message}")]
    Landmarks { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using PalmcapError.
pub type PalmcapResult<T> = Result<T, PalmcapError>;

impl PalmcapError {
    pub fn camera(msg: impl Into<String>) -> Self {
        Self::Camera {
            message: msg.into(),
        }
    }

    pub fn detector(msg: impl Into<String>) -> Self {
        Self::Detector {
            message: msg.into(),
        }
    }

    pub fn landmarks(msg: impl Into<String>) -> Self {
        Self::Landmarks {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error ends the capture session.
    ///
    /// Camera and detector failures surface to the user as a terminal
    /// session state; everything else is reported to the caller as-is.
    pub fn is_fatal_to_session(&self) -> bool {
        matches!(self, Self::Camera { .. } | Self::Detector { .. })
    }
}

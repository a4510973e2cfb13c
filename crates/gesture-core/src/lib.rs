//! palmcap Gesture Core
//!
//! Turns raw detector output and frame pixels into capture decisions:
//! - **Classifier:** Palm-facing vs thumb-back from landmark depth, with
//!   handedness corrected for mirrored cameras
//! - **Stability:** Rolling-history vote that suppresses single-frame noise
//! - **Quality:** Laplacian-variance blur gate for candidate stills
//! - **Framing:** Hand coverage checks and capture downscaling
//!
//! Pure computation: inputs and outputs are plain data, and nothing here
//! touches the filesystem or the clock.

pub mod classifier;
pub mod framing;
pub mod quality;
pub mod stability;

pub use classifier::{ClassifierConfig, GestureClassifier, TieBreak};
pub use framing::CoverageGate;
pub use quality::{QualityConfig, QualityGate, QualityVerdict};
pub use stability::{StabilityConfig, StabilityFilter};

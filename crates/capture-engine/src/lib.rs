//! palmcap Capture Engine
//!
//! Runs capture sessions: frames come in from a [`FrameSource`], hands
//! from a [`LandmarkDetector`], and the [`CaptureController`] decides which
//! frames become stills for the checklist.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │               run_detection_loop                 │
//! │  ┌─────────────┐   Frame   ┌──────────────────┐  │
//! │  │ FrameSource ├──────────►│ LandmarkDetector │  │
//! │  └─────────────┘           └────────┬─────────┘  │
//! │                    Frame + hands    │            │
//! │                                     ▼            │
//! │  ┌────────────────────────────────────────────┐  │
//! │  │             CaptureController              │  │
//! │  │ classify → stability → hold → gates → blur │  │
//! │  │              SessionState                  │  │
//! │  └─────────────────────┬──────────────────────┘  │
//! └────────────────────────┼─────────────────────────┘
//!                          ▼
//!              CaptureStore (jpg + manifest.json)
//! ```

pub mod config;
pub mod controller;
pub mod detection_loop;
pub mod replay;
pub mod session;
pub mod source;
pub mod store;

pub use config::{AppConfig, CaptureConfig, QualityFallback};
pub use controller::{CaptureController, FrameOutcome, FrameReport};
pub use detection_loop::{run_detection_loop, LoopExit, LoopOptions, LoopSummary};
pub use replay::{load_recording, replay, test_pattern, ReplayDetector, ReplaySource};
pub use session::{CapturedImage, Hold, SessionPhase, SessionState};
pub use source::{Frame, FrameSource, LandmarkDetector, SourceInfo};
pub use store::{CaptureManifest, CaptureStore, ManifestEntry};

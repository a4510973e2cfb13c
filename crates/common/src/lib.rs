//! palmcap Common Utilities
//!
//! Shared infrastructure for all palmcap crates:
//! - Error types and result aliases
//! - Session clock and frame pacing
//! - Tracing/logging initialization
//! - Configuration loading
//! - Retry policy for collaborators that can fail transiently

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod retry;

pub use clock::*;
pub use config::*;
pub use error::*;
pub use retry::RetryPolicy;

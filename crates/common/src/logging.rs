//! Tracing subscriber setup.
//!
//! Library crates only emit `tracing` events; binaries decide where they go
//! by calling [`init_logging`] once at startup.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::PalmcapResult;

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` overrides `config.level` when set. When `config.file` is set,
/// output is appended to that file instead of stderr.
pub fn init_logging(config: &LoggingConfig) -> PalmcapResult<()> {
    let filter = env_filter(&config.level);

    match (&config.file, config.json) {
        (Some(path), json) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let builder = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            if json {
                tracing::subscriber::set_global_default(builder.json().finish()).ok();
            } else {
                tracing::subscriber::set_global_default(builder.finish()).ok();
            }
        }
        (None, true) => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok();
        }
        (None, false) => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok();
        }
    }

    Ok(())
}

/// Route tracing output through the test harness capture.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_logging() {
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter("debug"))
        .with_test_writer()
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

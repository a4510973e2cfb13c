//! palmcap CLI: replay landmark recordings through the capture flow and
//! inspect its building blocks.
//!
//! Usage:
//!   palmcap replay <RECORDING>     Run a recorded session and save captures
//!   palmcap classify <RECORDING>   Print per-frame gesture classification
//!   palmcap quality <IMAGE>...     Report Laplacian-variance sharpness
//!   palmcap config                 Show or initialize the config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use palmcap_capture_engine::AppConfig;
use palmcap_hand_model::FacingMode;

mod commands;

#[derive(Parser)]
#[command(
    name = "palmcap",
    about = "Guided palm and thumb capture driven by hand landmarks",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/palmcap/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a landmark recording through the capture controller
    Replay {
        /// JSONL landmark recording
        recording: PathBuf,

        /// Still shown on every frame (a synthetic pattern when omitted)
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Directory to write captures and manifest.json into
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Camera facing mode: front|back
        #[arg(long)]
        facing: Option<FacingMode>,

        /// Accept checklist entries in any order
        #[arg(long)]
        any_order: bool,
    },

    /// Print the gesture classification of every frame in a recording
    Classify {
        /// JSONL landmark recording
        recording: PathBuf,

        /// Camera facing mode: front|back
        #[arg(long)]
        facing: Option<FacingMode>,
    },

    /// Check images against the blur threshold
    Quality {
        /// Images to check
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Override the configured blur threshold
        #[arg(long)]
        threshold: Option<f64>,

        /// Override the configured sample stride
        #[arg(long)]
        stride: Option<u32>,
    },

    /// Show the effective configuration
    Config {
        /// Write the defaults to the config file
        #[arg(long)]
        init: bool,

        /// Overwrite an existing file with --init
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let initializing = matches!(cli.command, Commands::Config { init: true, .. });
    let mut config = match &cli.config {
        Some(path) if !initializing => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load {}: {e}", path.display()))?,
        _ => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    palmcap_common::logging::init_logging(&config.logging)?;

    match cli.command {
        Commands::Replay {
            recording,
            image,
            output,
            facing,
            any_order,
        } => commands::replay::run(config, recording, image, output, facing, any_order).await,
        Commands::Classify { recording, facing } => {
            commands::classify::run(&config, recording, facing)
        }
        Commands::Quality {
            images,
            threshold,
            stride,
        } => commands::quality::run(&config, images, threshold, stride),
        Commands::Config { init, force } => {
            commands::config::run(&config, cli.config.as_deref(), init, force)
        }
    }
}

use std::path::PathBuf;

use canvas_compare::{EngineKind, RawCompareParams};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "canvas-compare",
    about = "Pixel-by-pixel comparison of raster images"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create .canvas-compare/config.toml with commented defaults
    Init {
        /// Overwrite an existing config
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Compare two images and report the share of changed pixels
    Compare {
        /// Base image: file path, http(s) URL or data URI
        #[arg(long)]
        base: String,
        /// Target image: file path, http(s) URL or data URI
        #[arg(long)]
        target: String,
        /// Save the diff image here (format from extension)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Delta algorithm
        #[arg(long, value_enum)]
        engine: Option<EngineKind>,
        #[command(flatten)]
        params: RawCompareParams,
    },

    /// Poll a frame file and report movement between consecutive frames
    Watch {
        /// Frame file that a capture tool keeps overwriting
        #[arg(long)]
        frame: PathBuf,
        /// Polling interval in milliseconds (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Percentage of changed pixels above which a frame counts as movement
        #[arg(long)]
        movement_gate: Option<f64>,
        /// Stop after this many compared frames
        #[arg(long)]
        max_frames: Option<u64>,
        /// Delta algorithm
        #[arg(long, value_enum)]
        engine: Option<EngineKind>,
        #[command(flatten)]
        params: RawCompareParams,
    },
}

//! # Garment Studio CLI
//!
//! Headless host for the garment studio canvas core.
//!
//! Replays a scripted design session against a fresh composition and
//! prints the resulting design document as JSON.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p studio-cli -- --script session.json --pretty
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `StudioConfig` - Canvas geometry, zoom and pen used for the session
//! - `Script` / `Command` - JSON command list replayed by [`replay`]

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod script;

pub use script::{replay, Command, Script, ScriptError};

use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments for garment-studio.
#[derive(Debug, Clone, Parser)]
#[command(name = "garment-studio")]
#[command(about = "Replay a garment design session and print the design document")]
#[command(version)]
pub struct CliArgs {
    /// Path to the JSON session script
    #[arg(long, env = "STUDIO_SCRIPT")]
    pub script: PathBuf,

    /// Canvas width in pixels
    #[arg(long, default_value = "800")]
    pub canvas_width: f32,

    /// Canvas height in pixels
    #[arg(long, default_value = "600")]
    pub canvas_height: f32,

    /// Zoom level in percent
    #[arg(long, default_value = "100")]
    pub zoom: f32,

    /// Pen color for freehand strokes
    #[arg(long, default_value = "#000000")]
    pub pen_color: String,

    /// Pen size for freehand strokes and the eraser
    #[arg(long, default_value = "2")]
    pub pen_size: f32,

    /// Pretty-print the design document
    #[arg(long)]
    pub pretty: bool,
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StudioConfig {
    /// Script to replay.
    pub script: PathBuf,
    /// Canvas width in pixels.
    pub canvas_width: f32,
    /// Canvas height in pixels.
    pub canvas_height: f32,
    /// Zoom level in percent.
    pub zoom: f32,
    /// Pen color as hex.
    pub pen_color: String,
    /// Pen size in canvas pixels.
    pub pen_size: f32,
    /// Whether to pretty-print output.
    pub pretty: bool,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl StudioConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: PathBuf::from("session.json"),
            canvas_width: 800.0,
            canvas_height: 600.0,
            zoom: 100.0,
            pen_color: "#000000".to_string(),
            pen_size: 2.0,
            pretty: false,
        }
    }
}

impl From<CliArgs> for StudioConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            script: args.script,
            canvas_width: args.canvas_width,
            canvas_height: args.canvas_height,
            zoom: args.zoom,
            pen_color: args.pen_color,
            pen_size: args.pen_size,
            pretty: args.pretty,
        }
    }
}

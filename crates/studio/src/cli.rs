//! Command-line argument parsing for the terrain studio.

use std::path::PathBuf;

use clap::Parser;

/// Terrain studio command-line arguments.
///
/// CLI values override settings loaded from the session file.
#[derive(Parser, Debug)]
#[command(name = "terrain-studio", about = "Procedural terrain studio")]
pub struct CliArgs {
    /// Session file (RON).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Frames to run.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Gradient table seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Grid cells along X.
    #[arg(long)]
    pub width: Option<u32>,

    /// Grid cells along Z.
    #[arg(long)]
    pub height: Option<u32>,

    /// Write the final height field as a grayscale PNG.
    #[arg(long)]
    pub export_heightmap: Option<PathBuf>,

    /// Write the final elevation band colors as a PNG.
    #[arg(long)]
    pub export_colors: Option<PathBuf>,

    /// Upload to a headless GPU device instead of the CPU sink.
    #[arg(long)]
    pub gpu: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,
}

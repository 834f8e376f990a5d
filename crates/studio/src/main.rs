//! Terrain studio: builds a procedural terrain, replays a scripted editing
//! session against it and optionally exports PNG snapshots.

mod cli;
mod config;
mod export;
mod session;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use terrain_procgen::TerrainController;
use terrain_renderer::{request_headless_device, GpuMeshSink};

use cli::CliArgs;
use config::SessionConfig;
use session::{SessionReport, StatsSink};

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let filter = args.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => {
            log::info!("No session file given, using defaults");
            SessionConfig::default()
        }
    };
    config.apply_cli_overrides(&args);

    let mut terrain =
        TerrainController::new(config.terrain.clone()).context("building initial terrain")?;

    let report = if args.gpu {
        let (device, queue) = pollster::block_on(request_headless_device())?;
        let mut sink = GpuMeshSink::new(Arc::new(device), Arc::new(queue));
        let report = session::run(&mut terrain, &config, &mut sink)?;
        log::info!(
            "GPU sink: {} uploads, {} buffer reallocations",
            sink.uploads(),
            sink.reallocations()
        );
        report
    } else {
        let mut sink = StatsSink::default();
        let report = session::run(&mut terrain, &config, &mut sink)?;
        log::info!(
            "CPU sink: {} uploads ({} bytes), {} draws",
            sink.uploads,
            sink.bytes_uploaded,
            sink.draws
        );
        report
    };

    log_summary(&terrain, &report);

    if let Some(path) = &config.export.heightmap {
        export::save_heightmap(terrain.height_field(), path)?;
    }
    if let Some(path) = &config.export.colors {
        export::save_band_colors(terrain.height_field(), path)?;
    }

    Ok(())
}

fn log_summary(terrain: &TerrainController, report: &SessionReport) {
    let stats = terrain.stats();
    let params = terrain.parameters();
    log::info!(
        "{} frames, {} rebuilds, {} uploads, {} rejected edits",
        report.frames,
        report.rebuilds.len(),
        report.uploads,
        report.rejected
    );
    log::info!(
        "Terrain {}x{} (seed {}): {} vertices, {} triangles, samples {:.3}..{:.3}",
        params.width,
        params.height,
        params.seed,
        stats.vertices,
        stats.triangles,
        stats.min_sample,
        stats.max_sample
    );
    for (band, count) in stats.bands.iter() {
        let share = 100.0 * count as f32 / stats.bands.total().max(1) as f32;
        log::info!("  {:?}: {} ({:.1}%)", band, count, share);
    }
}

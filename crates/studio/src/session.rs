//! Frame loop that replays scripted parameter edits against a terrain.

use std::convert::Infallible;

use anyhow::Result;
use terrain_procgen::{MeshSink, Rebuild, TerrainController, TerrainVertex, VertexLayout};

use crate::config::SessionConfig;

/// CPU-side sink: records what would have gone to the GPU.
#[derive(Debug, Default)]
pub struct StatsSink {
    pub uploads: u32,
    pub draws: u32,
    pub bytes_uploaded: u64,
}

impl MeshSink for StatsSink {
    type Error = Infallible;

    fn upload(
        &mut self,
        vertices: &[TerrainVertex],
        indices: &[u32],
        layout: &VertexLayout,
    ) -> Result<(), Self::Error> {
        let bytes = (vertices.len() * layout.stride + std::mem::size_of_val(indices)) as u64;
        log::debug!(
            "Upload #{}: {} vertices, {} indices ({} bytes)",
            self.uploads + 1,
            vertices.len(),
            indices.len(),
            bytes
        );
        self.uploads += 1;
        self.bytes_uploaded += bytes;
        Ok(())
    }

    fn draw(&mut self) -> Result<(), Self::Error> {
        self.draws += 1;
        Ok(())
    }
}

/// What happened over a session.
#[derive(Debug, Default)]
pub struct SessionReport {
    pub frames: u32,
    /// Frame and rebuild path of every frame that rebuilt something.
    pub rebuilds: Vec<(u32, Rebuild)>,
    pub uploads: u32,
    /// Frames whose parameters were rejected.
    pub rejected: u32,
}

/// Run `config.frames` frames. Each frame applies that frame's edits, updates the
/// terrain and syncs it into `sink`. Rejected edits are logged and stay pending,
/// like an invalid value left in a UI field.
pub fn run<S>(
    terrain: &mut TerrainController,
    config: &SessionConfig,
    sink: &mut S,
) -> Result<SessionReport>
where
    S: MeshSink,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let mut params = terrain.parameters().clone();
    let mut report = SessionReport::default();

    for frame in 0..config.frames {
        for edit in config.edits_at(frame) {
            edit.apply(&mut params);
        }

        match terrain.update(&params) {
            Ok(Rebuild::None) => {}
            Ok(rebuild) => {
                log::info!("Frame {}: {:?} rebuild", frame, rebuild);
                report.rebuilds.push((frame, rebuild));
            }
            Err(e) => {
                log::warn!("Frame {}: keeping previous terrain: {}", frame, e);
                report.rejected += 1;
            }
        }

        if terrain.sync(sink)? {
            report.uploads += 1;
        }
        report.frames += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParameterEdit;
    use terrain_procgen::TerrainParameters;

    fn small() -> TerrainParameters {
        TerrainParameters {
            width: 6,
            height: 4,
            seed: 11,
            ..Default::default()
        }
    }

    #[test]
    fn idle_frames_draw_without_uploading() {
        let mut terrain = TerrainController::new(small()).unwrap();
        let config = SessionConfig {
            frames: 4,
            ..Default::default()
        };
        let mut sink = StatsSink::default();
        let report = run(&mut terrain, &config, &mut sink).unwrap();
        assert_eq!(report.frames, 4);
        assert!(report.rebuilds.is_empty());
        assert_eq!(sink.uploads, 1);
        assert_eq!(sink.draws, 4);
    }

    #[test]
    fn edits_rebuild_on_their_frame() {
        let mut terrain = TerrainController::new(small()).unwrap();
        let config = SessionConfig {
            frames: 5,
            edits: vec![
                ParameterEdit {
                    frame: 1,
                    map_height: Some(7.0),
                    ..Default::default()
                },
                ParameterEdit {
                    frame: 3,
                    width: Some(8),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let mut sink = StatsSink::default();
        let report = run(&mut terrain, &config, &mut sink).unwrap();
        assert_eq!(report.rebuilds, vec![(1, Rebuild::Heights), (3, Rebuild::Full)]);
        assert_eq!(sink.uploads, 3);
        assert_eq!(terrain.parameters().width, 8);
        assert_eq!(terrain.parameters().map_height, 7.0);
    }

    #[test]
    fn rejected_edit_keeps_terrain_and_retries() {
        let mut terrain = TerrainController::new(small()).unwrap();
        let config = SessionConfig {
            frames: 3,
            edits: vec![ParameterEdit {
                frame: 0,
                spacing: Some(-1.0),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut sink = StatsSink::default();
        let report = run(&mut terrain, &config, &mut sink).unwrap();
        assert_eq!(report.rejected, 3);
        assert_eq!(terrain.parameters(), &small());
        assert_eq!(sink.draws, 3);
    }

    #[test]
    fn upload_bytes_follow_the_layout() {
        let mut terrain = TerrainController::new(small()).unwrap();
        let mut sink = StatsSink::default();
        terrain.sync(&mut sink).unwrap();
        let stats = terrain.stats();
        let expected = stats.vertices * TerrainVertex::LAYOUT.stride + stats.indices * 4;
        assert_eq!(sink.bytes_uploaded, expected as u64);
    }
}

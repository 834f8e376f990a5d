//! Session configuration. Loaded from a RON file given with `--config`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use terrain_procgen::TerrainParameters;

use crate::cli::CliArgs;

/// One scripted session: starting parameters, edits to replay and outputs to write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Parameters at frame 0. Missing fields take the compiled-in defaults.
    #[serde(default)]
    pub terrain: TerrainParameters,
    /// Frames to simulate.
    #[serde(default = "default_frames")]
    pub frames: u32,
    /// Parameter edits, applied at the start of their frame.
    #[serde(default)]
    pub edits: Vec<ParameterEdit>,
    #[serde(default)]
    pub export: ExportConfig,
}

fn default_frames() -> u32 {
    1
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            terrain: TerrainParameters::default(),
            frames: default_frames(),
            edits: Vec::new(),
            export: ExportConfig::default(),
        }
    }
}

/// Where to write images after the last frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Grayscale PNG of the height field.
    #[serde(default)]
    pub heightmap: Option<PathBuf>,
    /// PNG of the elevation band colors.
    #[serde(default)]
    pub colors: Option<PathBuf>,
}

/// A UI-style edit: every `Some` field overwrites the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterEdit {
    pub frame: u32,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub dimension: Option<f32>,
    pub frequency: Option<f32>,
    pub lacunarity: Option<f32>,
    pub persistence: Option<f32>,
    pub octaves: Option<u32>,
    pub map_height: Option<f32>,
    pub spacing: Option<f32>,
    pub seed: Option<u64>,
    pub smooth_shading: Option<bool>,
    pub normalize_heights: Option<bool>,
    /// Press "reset seed": draw a new random seed.
    pub reseed: bool,
}

impl ParameterEdit {
    pub fn apply(&self, params: &mut TerrainParameters) {
        macro_rules! set {
            ($($field:ident),*) => {
                $(if let Some(v) = self.$field {
                    params.$field = v;
                })*
            };
        }
        set!(
            width,
            height,
            dimension,
            frequency,
            lacunarity,
            persistence,
            octaves,
            map_height,
            spacing,
            seed,
            smooth_shading,
            normalize_heights
        );
        if self.reseed {
            *params = params.reseeded();
        }
    }
}

impl SessionConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading session config {:?}", path))?;
        Self::parse(&data).with_context(|| format!("parsing session config {:?}", path))
    }

    pub fn parse(data: &str) -> Result<Self> {
        Ok(ron::from_str(data)?)
    }

    /// CLI values win over the file.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(frames) = args.frames {
            self.frames = frames;
        }
        if let Some(seed) = args.seed {
            self.terrain.seed = seed;
        }
        if let Some(w) = args.width {
            self.terrain.width = w;
        }
        if let Some(h) = args.height {
            self.terrain.height = h;
        }
        if let Some(ref path) = args.export_heightmap {
            self.export.heightmap = Some(path.clone());
        }
        if let Some(ref path) = args.export_colors {
            self.export.colors = Some(path.clone());
        }
    }

    /// Edits scheduled for `frame`, in file order.
    pub fn edits_at(&self, frame: u32) -> impl Iterator<Item = &ParameterEdit> + '_ {
        self.edits.iter().filter(move |e| e.frame == frame)
    }
}

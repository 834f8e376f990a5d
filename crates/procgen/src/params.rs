//! User-tunable terrain parameters and the per-frame change set derived from them.

use serde::{Deserialize, Serialize};

use crate::error::TerrainError;
use crate::heightfield::SynthesisSettings;

/// Everything the UI can tune. Compared each frame against the last applied copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParameters {
    /// Grid cells along X.
    pub width: u32,
    /// Grid cells along Z.
    pub height: u32,
    /// Lattice units spanned by one period of the base octave.
    pub dimension: f32,
    /// Base noise frequency (lower = smoother).
    pub frequency: f32,
    /// Frequency multiplier per octave.
    pub lacunarity: f32,
    /// Amplitude multiplier per octave.
    pub persistence: f32,
    /// Number of noise octaves.
    pub octaves: u32,
    /// World-space height of a sample of 1.0.
    pub map_height: f32,
    /// World-space distance between lattice points.
    pub spacing: f32,
    /// Gradient table seed. Changing it reseeds and rebuilds everything.
    pub seed: u64,
    /// Average normals across faces sharing a lattice point.
    pub smooth_shading: bool,
    /// Divide the height field by its maximum after synthesis.
    pub normalize_heights: bool,
}

impl Default for TerrainParameters {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            dimension: 25.0,
            frequency: 1.0,
            lacunarity: 2.0,
            persistence: 0.5,
            octaves: 5,
            map_height: 3.0,
            spacing: 0.1,
            seed: 0,
            smooth_shading: false,
            normalize_heights: true,
        }
    }
}

impl TerrainParameters {
    /// Copy with a freshly drawn random seed ("reset seed").
    pub fn reseeded(&self) -> Self {
        Self {
            seed: rand::random(),
            ..self.clone()
        }
    }

    /// Settings consumed by the height field synthesizer.
    pub fn synthesis(&self) -> SynthesisSettings {
        SynthesisSettings {
            width: self.width,
            height: self.height,
            frequency: self.frequency,
            lacunarity: self.lacunarity,
            persistence: self.persistence,
            octaves: self.octaves,
            dimension: self.dimension,
        }
    }

    /// Reject values no rebuild path can honour.
    pub fn validate(&self) -> Result<(), TerrainError> {
        self.synthesis().validate()?;
        if !self.map_height.is_finite() {
            return Err(TerrainError::InvalidParameter {
                name: "map_height",
                value: self.map_height,
            });
        }
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(TerrainError::InvalidParameter {
                name: "spacing",
                value: self.spacing,
            });
        }
        Ok(())
    }
}

/// Which parameter groups differ between the applied and the requested parameters.
///
/// Several flags can be set in the same frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParameterChanges {
    /// `width` or `height`.
    pub grid: bool,
    pub seed: bool,
    /// `dimension`, `frequency`, `lacunarity`, `persistence`, `octaves` or
    /// `normalize_heights`.
    pub noise: bool,
    pub map_height: bool,
    pub spacing: bool,
    pub shading: bool,
}

impl ParameterChanges {
    pub fn between(applied: &TerrainParameters, current: &TerrainParameters) -> Self {
        Self {
            grid: applied.width != current.width || applied.height != current.height,
            seed: applied.seed != current.seed,
            noise: applied.dimension != current.dimension
                || applied.frequency != current.frequency
                || applied.lacunarity != current.lacunarity
                || applied.persistence != current.persistence
                || applied.octaves != current.octaves
                || applied.normalize_heights != current.normalize_heights,
            map_height: applied.map_height != current.map_height,
            spacing: applied.spacing != current.spacing,
            shading: applied.smooth_shading != current.smooth_shading,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Most expensive rebuild path this change set requires.
    pub fn rebuild(&self) -> Rebuild {
        if self.grid || self.seed {
            Rebuild::Full
        } else if self.noise {
            Rebuild::HeightField
        } else if self.map_height {
            Rebuild::Heights
        } else if self.spacing {
            Rebuild::Positions
        } else if self.shading {
            Rebuild::Normals
        } else {
            Rebuild::None
        }
    }
}

/// Rebuild paths, cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rebuild {
    /// Nothing changed.
    None,
    /// Normals only.
    Normals,
    /// X/Z positions and normals.
    Positions,
    /// Y, colors and normals from the existing height field.
    Heights,
    /// New height field, then heights and normals.
    HeightField,
    /// New topology, indices, height field, heights and normals.
    Full,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_parameters_have_no_changes() {
        let p = TerrainParameters::default();
        let changes = ParameterChanges::between(&p, &p.clone());
        assert!(changes.is_empty());
        assert_eq!(changes.rebuild(), Rebuild::None);
    }

    #[test]
    fn each_parameter_maps_to_its_group() {
        let base = TerrainParameters::default();
        let cases: [(TerrainParameters, Rebuild); 12] = [
            (TerrainParameters { width: 8, ..base.clone() }, Rebuild::Full),
            (TerrainParameters { height: 8, ..base.clone() }, Rebuild::Full),
            (TerrainParameters { dimension: 9.0, ..base.clone() }, Rebuild::HeightField),
            (TerrainParameters { seed: 5, ..base.clone() }, Rebuild::Full),
            (TerrainParameters { frequency: 2.0, ..base.clone() }, Rebuild::HeightField),
            (TerrainParameters { lacunarity: 3.0, ..base.clone() }, Rebuild::HeightField),
            (TerrainParameters { persistence: 0.3, ..base.clone() }, Rebuild::HeightField),
            (TerrainParameters { octaves: 2, ..base.clone() }, Rebuild::HeightField),
            (TerrainParameters { normalize_heights: false, ..base.clone() }, Rebuild::HeightField),
            (TerrainParameters { map_height: 9.0, ..base.clone() }, Rebuild::Heights),
            (TerrainParameters { spacing: 0.5, ..base.clone() }, Rebuild::Positions),
            (TerrainParameters { smooth_shading: true, ..base.clone() }, Rebuild::Normals),
        ];
        for (current, expected) in cases {
            assert_eq!(ParameterChanges::between(&base, &current).rebuild(), expected);
        }
    }

    #[test]
    fn combined_changes_keep_every_flag() {
        let base = TerrainParameters::default();
        let current = TerrainParameters {
            map_height: 1.0,
            spacing: 1.0,
            ..base.clone()
        };
        let changes = ParameterChanges::between(&base, &current);
        assert!(changes.map_height && changes.spacing);
        assert!(!changes.noise && !changes.grid);
        assert_eq!(changes.rebuild(), Rebuild::Heights);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let base = TerrainParameters::default();
        assert!(base.validate().is_ok());
        assert!(TerrainParameters { width: 0, ..base.clone() }.validate().is_err());
        assert!(TerrainParameters { spacing: 0.0, ..base.clone() }.validate().is_err());
        assert!(TerrainParameters { map_height: f32::NAN, ..base.clone() }.validate().is_err());
        assert!(TerrainParameters { lacunarity: -1.0, ..base.clone() }.validate().is_err());
        assert!(TerrainParameters { octaves: 200, ..base.clone() }.validate().is_err());
        assert!(TerrainParameters { map_height: -2.0, ..base }.validate().is_ok());
    }

    #[test]
    fn reseeded_changes_only_the_seed() {
        let base = TerrainParameters::default();
        let next = base.reseeded();
        assert_eq!(TerrainParameters { seed: base.seed, ..next.clone() }, base);
    }

    #[test]
    fn partial_ron_falls_back_to_defaults() {
        let p: TerrainParameters = ron::from_str("(width: 64, frequency: 2.5)").unwrap();
        assert_eq!(p.width, 64);
        assert_eq!(p.frequency, 2.5);
        assert_eq!(p.height, TerrainParameters::default().height);
        assert!(p.normalize_heights);
    }
}

//! Multi-octave height field synthesis.

use crate::error::{try_vec_with_capacity, TerrainError};
use crate::noise::NoiseGenerator;

/// Most octaves [`HeightField::synthesize`] accepts.
pub const MAX_OCTAVES: u32 = 32;

/// Inputs to [`HeightField::synthesize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisSettings {
    /// Grid cells along X; the field has `width + 1` columns.
    pub width: u32,
    /// Grid cells along Z; the field has `height + 1` rows.
    pub height: u32,
    /// Base frequency (features per `dimension` lattice units).
    pub frequency: f32,
    /// Frequency multiplier per octave.
    pub lacunarity: f32,
    /// Amplitude multiplier per octave.
    pub persistence: f32,
    /// Number of octaves summed.
    pub octaves: u32,
    /// Lattice units spanned by one period of the base octave.
    pub dimension: f32,
}

impl SynthesisSettings {
    /// Reject settings that would produce an empty or non-finite field.
    pub fn validate(&self) -> Result<(), TerrainError> {
        if self.width == 0 || self.height == 0 {
            return Err(TerrainError::DegenerateGrid {
                width: self.width,
                height: self.height,
            });
        }
        for (name, value) in [
            ("frequency", self.frequency),
            ("lacunarity", self.lacunarity),
            ("dimension", self.dimension),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TerrainError::InvalidParameter { name, value });
            }
        }
        if !self.persistence.is_finite() {
            return Err(TerrainError::InvalidParameter {
                name: "persistence",
                value: self.persistence,
            });
        }
        if self.octaves > MAX_OCTAVES {
            return Err(TerrainError::TooManyOctaves {
                octaves: self.octaves,
                max: MAX_OCTAVES,
            });
        }
        Ok(())
    }
}

/// Row-major grid of `(height + 1) x (width + 1)` elevation samples.
///
/// Rows run along Z, columns along X. Freshly synthesized samples are
/// `(sum + 1) * 0.5` of the octave sum and may leave `[0, 1]` when the octave
/// amplitudes add up to more than one; [`HeightField::normalize`] rescales by the maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    columns: usize,
    rows: usize,
    samples: Vec<f32>,
    max: f32,
}

impl HeightField {
    /// Sum `octaves` layers of noise at every lattice point.
    ///
    /// Octave `k` samples at wavelength `dimension / (frequency * lacunarity^k)` with
    /// amplitude `persistence^k`. Octaves whose sampling scale or amplitude no longer
    /// fits in an `f32` are dropped, so the field stays finite. The result is a pure
    /// function of the generator's table and `settings`.
    pub fn synthesize(
        noise: &NoiseGenerator,
        settings: &SynthesisSettings,
    ) -> Result<Self, TerrainError> {
        settings.validate()?;

        let rows = settings.height as usize + 1;
        let columns = settings.width as usize + 1;
        let mut samples = try_vec_with_capacity(rows * columns)?;

        // Per-octave sampling scale (1 / wavelength) and amplitude.
        let mut layers = try_vec_with_capacity(settings.octaves as usize)?;
        let extent = rows.max(columns) as f32;
        let mut frequency = settings.frequency;
        let mut amplitude = 1.0_f32;
        for octave in 0..settings.octaves {
            let wavelength = settings.dimension / frequency;
            if !(extent / wavelength).is_finite() || !amplitude.is_finite() {
                log::debug!(
                    "Dropping octaves {}..{}: sampling scale overflows",
                    octave,
                    settings.octaves
                );
                break;
            }
            layers.push((wavelength, amplitude));
            frequency *= settings.lacunarity;
            amplitude *= settings.persistence;
        }

        let mut max = f32::NEG_INFINITY;
        for i in 0..rows {
            for j in 0..columns {
                let mut sum = 0.0_f32;
                for &(wavelength, amplitude) in &layers {
                    sum += amplitude * noise.noise_2d(i as f32 / wavelength, j as f32 / wavelength);
                }
                let value = (sum + 1.0) * 0.5;
                max = max.max(value);
                samples.push(value);
            }
        }

        log::debug!(
            "Synthesized {}x{} height field ({} octaves, max {:.3})",
            columns,
            rows,
            settings.octaves,
            max
        );

        Ok(Self {
            columns,
            rows,
            samples,
            max,
        })
    }

    /// Divide every sample by the maximum.
    ///
    /// Left as the identity when the maximum is not strictly positive, so the field
    /// never gains non-finite values.
    pub fn normalize(&mut self) {
        if self.max > 0.0 && self.max.is_finite() {
            let inv = 1.0 / self.max;
            for s in &mut self.samples {
                *s *= inv;
            }
            self.max *= inv;
        } else {
            log::debug!("Skipping height normalization (max = {})", self.max);
        }
    }

    /// Sample at lattice row `z`, column `x`.
    #[inline]
    pub fn get(&self, z: usize, x: usize) -> f32 {
        self.samples[z * self.columns + x]
    }

    /// Sample at lattice row `z`, column `x`, or `None` outside the grid.
    pub fn sample(&self, z: usize, x: usize) -> Option<f32> {
        (z < self.rows && x < self.columns).then(|| self.get(z, x))
    }

    /// Lattice points along X (`width + 1`).
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Lattice points along Z (`height + 1`).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Largest sample currently stored.
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Smallest and largest sample.
    pub fn min_max(&self) -> (f32, f32) {
        let min = self.samples.iter().copied().fold(f32::INFINITY, f32::min);
        (min, self.max)
    }

    /// All samples, row-major.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

//! 2D gradient (Perlin) noise over an owned, seedable permutation table.
//!
//! Each [`NoiseGenerator`] carries its own table, so several terrains (or tests)
//! can sample noise side by side without sharing state. Sampling is plain `f32`
//! arithmetic over a fixed table and never fails.

use glam::Vec2;
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::error::TerrainError;

/// Number of distinct lattice hashes.
pub const PERMUTATION_SIZE: usize = 256;

/// The four quantized gradient directions, selected by the low two hash bits.
const GRADIENTS: [Vec2; 4] = [
    Vec2::new(1.0, 1.0),
    Vec2::new(-1.0, 1.0),
    Vec2::new(-1.0, -1.0),
    Vec2::new(1.0, -1.0),
];

/// Seeded permutation of `0..=255`, stored twice so `index + 1` lookups never wrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationTable {
    entries: [u8; PERMUTATION_SIZE * 2],
}

impl PermutationTable {
    /// Shuffle `0..=255` with Fisher-Yates driven by `rng`.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut base: [u8; PERMUTATION_SIZE] = std::array::from_fn(|i| i as u8);
        base.shuffle(rng);
        Self::doubled(&base)
    }

    /// Build from an explicit permutation, rejecting anything that is not one.
    pub fn from_permutation(values: &[u8]) -> Result<Self, TerrainError> {
        if values.len() != PERMUTATION_SIZE {
            return Err(TerrainError::InvalidPermutation {
                reason: format!("expected {} entries, got {}", PERMUTATION_SIZE, values.len()),
            });
        }
        let mut seen = [false; PERMUTATION_SIZE];
        for &v in values {
            if std::mem::replace(&mut seen[v as usize], true) {
                return Err(TerrainError::InvalidPermutation {
                    reason: format!("value {} appears more than once", v),
                });
            }
        }
        let mut base = [0u8; PERMUTATION_SIZE];
        base.copy_from_slice(values);
        Ok(Self::doubled(&base))
    }

    /// The identity permutation `[0, 1, ..., 255]`.
    pub fn identity() -> Self {
        Self::doubled(&std::array::from_fn(|i| i as u8))
    }

    fn doubled(base: &[u8; PERMUTATION_SIZE]) -> Self {
        let mut entries = [0u8; PERMUTATION_SIZE * 2];
        entries[..PERMUTATION_SIZE].copy_from_slice(base);
        entries[PERMUTATION_SIZE..].copy_from_slice(base);
        Self { entries }
    }

    /// All 512 entries.
    pub fn entries(&self) -> &[u8] {
        &self.entries
    }

    #[inline]
    fn get(&self, index: usize) -> usize {
        self.entries[index] as usize
    }
}

/// Gradient noise generator owning its permutation table.
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    table: PermutationTable,
    seed: Option<u64>,
}

impl NoiseGenerator {
    /// Build a generator from `seed`, or from a freshly drawn seed when `None`.
    ///
    /// The seed actually used is kept so the table can be reproduced.
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        log::debug!("Seeding gradient table with {}", seed);
        Self {
            table: PermutationTable::shuffled(&mut rng),
            seed: Some(seed),
        }
    }

    /// Build a generator over an explicit permutation of `0..=255`.
    pub fn from_permutation(values: &[u8]) -> Result<Self, TerrainError> {
        Ok(Self {
            table: PermutationTable::from_permutation(values)?,
            seed: None,
        })
    }

    /// Build a generator over an already validated table.
    pub fn from_table(table: PermutationTable) -> Self {
        Self { table, seed: None }
    }

    /// Seed the table was shuffled from; `None` for explicit tables.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn table(&self) -> &PermutationTable {
        &self.table
    }

    /// Gradient vector for a lattice hash (low two bits select one of four diagonals).
    #[inline]
    pub fn gradient(hash: usize) -> Vec2 {
        GRADIENTS[hash & 3]
    }

    /// Sample classic 2D Perlin noise. Output lies roughly in `[-1, 1]` and is not clamped.
    ///
    /// Lattice coordinates are masked into `0..=255`, so the pattern tiles every
    /// 256 units. The float-to-int conversion saturates, which keeps huge inputs finite.
    pub fn noise_2d(&self, x: f32, y: f32) -> f32 {
        let x_floor = x.floor();
        let y_floor = y.floor();
        let xi = (x_floor as i64 & 255) as usize;
        let yi = (y_floor as i64 & 255) as usize;
        let xf = x - x_floor;
        let yf = y - y_floor;

        let p = &self.table;
        let bottom_left = p.get(p.get(xi) + yi);
        let bottom_right = p.get(p.get(xi + 1) + yi);
        let top_left = p.get(p.get(xi) + yi + 1);
        let top_right = p.get(p.get(xi + 1) + yi + 1);

        let dot_bl = Vec2::new(xf, yf).dot(Self::gradient(bottom_left));
        let dot_br = Vec2::new(xf - 1.0, yf).dot(Self::gradient(bottom_right));
        let dot_tl = Vec2::new(xf, yf - 1.0).dot(Self::gradient(top_left));
        let dot_tr = Vec2::new(xf - 1.0, yf - 1.0).dot(Self::gradient(top_right));

        let u = fade(xf);
        let v = fade(yf);

        let bottom = lerp(dot_bl, dot_br, u);
        let top = lerp(dot_tl, dot_tr, u);
        lerp(bottom, top, v)
    }
}

/// Smootherstep ease curve `6t^5 - 15t^4 + 10t^3`.
#[inline]
pub fn fade(t: f32) -> f32 {
    ((6.0 * t - 15.0) * t + 10.0) * t * t * t
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

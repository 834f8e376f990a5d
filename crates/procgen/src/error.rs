//! Error type shared by every terrain generation stage.

use std::collections::TryReserveError;

use thiserror::Error;

/// Reasons a terrain build or rebuild can be rejected.
///
/// A rejected rebuild never touches the last good height field or mesh.
#[derive(Debug, Error)]
pub enum TerrainError {
    /// Width or height of the grid is zero.
    #[error("degenerate terrain grid {width}x{height}: both dimensions must be at least 1")]
    DegenerateGrid { width: u32, height: u32 },

    /// The duplicated-vertex grid would not be addressable with `u32` indices.
    #[error("terrain grid {width}x{height} is too large for 32-bit indices")]
    GridTooLarge { width: u32, height: u32 },

    /// A floating-point parameter is non-finite or outside its domain.
    #[error("invalid terrain parameter `{name}` = {value}")]
    InvalidParameter { name: &'static str, value: f32 },

    #[error("{octaves} octaves requested, at most {max} are supported")]
    TooManyOctaves { octaves: u32, max: u32 },

    /// An explicit gradient table is not a permutation of 0..=255.
    #[error("gradient table must be a permutation of 0..=255 ({reason})")]
    InvalidPermutation { reason: String },

    /// Reserving space for a height field or mesh buffer failed.
    #[error("failed to allocate terrain buffers: {0}")]
    Allocation(#[from] TryReserveError),
}

/// Allocate an empty vector with exactly `len` capacity, surfacing allocation failure.
pub(crate) fn try_vec_with_capacity<T>(len: usize) -> Result<Vec<T>, TerrainError> {
    let mut out = Vec::new();
    out.try_reserve_exact(len)?;
    Ok(out)
}

/// Clone a slice into a freshly reserved vector.
pub(crate) fn try_clone_slice<T: Copy>(src: &[T]) -> Result<Vec<T>, TerrainError> {
    let mut out = try_vec_with_capacity(src.len())?;
    out.extend_from_slice(src);
    Ok(out)
}

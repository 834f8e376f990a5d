//! Vertex type shared by the terrain mesh and its upload sinks.

use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};

/// Terrain mesh vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Elevation band color.
    pub color: [f32; 3],
    /// Lattice UV in `[0, 1]`; not used by terrain shading.
    pub uv: [f32; 2],
}

/// Byte layout of [`TerrainVertex`] handed to upload sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    pub stride: usize,
    pub position_offset: usize,
    pub normal_offset: usize,
    pub color_offset: usize,
    pub uv_offset: usize,
}

impl TerrainVertex {
    pub const LAYOUT: VertexLayout = VertexLayout {
        stride: size_of::<TerrainVertex>(),
        position_offset: offset_of!(TerrainVertex, position),
        normal_offset: offset_of!(TerrainVertex, normal),
        color_offset: offset_of!(TerrainVertex, color),
        uv_offset: offset_of!(TerrainVertex, uv),
    };
}

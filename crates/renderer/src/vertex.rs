//! wgpu vertex buffer layout for terrain vertices.

use terrain_procgen::TerrainVertex;

static TERRAIN_ATTRIBUTES: [wgpu::VertexAttribute; 4] = [
    // Position
    wgpu::VertexAttribute {
        offset: TerrainVertex::LAYOUT.position_offset as wgpu::BufferAddress,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x3,
    },
    // Normal
    wgpu::VertexAttribute {
        offset: TerrainVertex::LAYOUT.normal_offset as wgpu::BufferAddress,
        shader_location: 1,
        format: wgpu::VertexFormat::Float32x3,
    },
    // UV
    wgpu::VertexAttribute {
        offset: TerrainVertex::LAYOUT.uv_offset as wgpu::BufferAddress,
        shader_location: 2,
        format: wgpu::VertexFormat::Float32x2,
    },
    // Elevation band color
    wgpu::VertexAttribute {
        offset: TerrainVertex::LAYOUT.color_offset as wgpu::BufferAddress,
        shader_location: 3,
        format: wgpu::VertexFormat::Float32x3,
    },
];

/// Buffer layout for pipelines drawing [`TerrainVertex`] data.
///
/// Locations: 0 position, 1 normal, 2 uv, 3 color.
pub fn terrain_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: TerrainVertex::LAYOUT.stride as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &TERRAIN_ATTRIBUTES,
    }
}

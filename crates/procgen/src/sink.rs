//! Boundary to whatever owns the GPU copy of the terrain mesh.

use crate::vertex::{TerrainVertex, VertexLayout};

/// Receives terrain buffers and draws them.
///
/// The terrain core never talks to a graphics API directly; it pushes buffers
/// through this trait after a rebuild and asks for a draw once per frame.
pub trait MeshSink {
    type Error;

    /// Replace the sink's copy of the mesh.
    fn upload(
        &mut self,
        vertices: &[TerrainVertex],
        indices: &[u32],
        layout: &VertexLayout,
    ) -> Result<(), Self::Error>;

    /// Draw the most recently uploaded mesh.
    fn draw(&mut self) -> Result<(), Self::Error>;
}

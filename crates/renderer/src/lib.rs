//! wgpu upload sink for procedurally generated terrain meshes.

pub mod mesh;
pub mod vertex;

pub use mesh::*;
pub use vertex::*;

//! GPU copy of the terrain mesh.

use std::sync::Arc;

use terrain_procgen::{MeshSink, TerrainVertex, VertexLayout};
use thiserror::Error;
use wgpu::util::DeviceExt;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    #[error("failed to open GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("{what} buffer of {size} bytes exceeds the device limit of {limit} bytes")]
    BufferTooLarge {
        what: &'static str,
        size: u64,
        limit: u64,
    },
    #[error("vertex layout stride {0} does not match the terrain vertex type")]
    LayoutMismatch(usize),
    #[error("draw requested before any mesh was uploaded")]
    NothingUploaded,
}

/// Open a device without a surface, for offscreen work and tests.
pub async fn request_headless_device() -> Result<(wgpu::Device, wgpu::Queue), RenderError> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .ok_or(RenderError::NoAdapter)?;

    log::info!("Using GPU: {:?}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Terrain Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: Default::default(),
            },
            None,
        )
        .await?;

    Ok((device, queue))
}

/// Vertex and index buffers of the uploaded terrain.
pub struct GpuTerrainMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl GpuTerrainMesh {
    fn new(device: &wgpu::Device, vertices: &[u8], indices: &[u8], num_indices: u32) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Vertex Buffer"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Index Buffer"),
            contents: indices,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_indices,
        }
    }
}

/// [`MeshSink`] backed by wgpu buffers.
///
/// Uploads reuse the existing buffers when the byte sizes are unchanged (parameter
/// edits that keep the grid size) and recreate them otherwise. `draw` queues the
/// mesh for the next render pass; the host's pass then calls [`GpuMeshSink::record`].
pub struct GpuMeshSink {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    mesh: Option<GpuTerrainMesh>,
    draw_pending: bool,
    uploads: u64,
    reallocations: u64,
}

impl GpuMeshSink {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self {
            device,
            queue,
            mesh: None,
            draw_pending: false,
            uploads: 0,
            reallocations: 0,
        }
    }

    pub fn mesh(&self) -> Option<&GpuTerrainMesh> {
        self.mesh.as_ref()
    }

    /// Uploads accepted so far.
    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    /// Uploads that had to create new buffers.
    pub fn reallocations(&self) -> u64 {
        self.reallocations
    }

    pub fn draw_pending(&self) -> bool {
        self.draw_pending
    }

    /// Issue the queued draw into `pass`. The caller has already bound a pipeline
    /// built with [`crate::terrain_vertex_layout`]. Returns whether anything was drawn.
    pub fn record(&mut self, pass: &mut wgpu::RenderPass<'_>) -> bool {
        let Some(mesh) = self.mesh.as_ref().filter(|_| self.draw_pending) else {
            return false;
        };
        pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..mesh.num_indices, 0, 0..1);
        self.draw_pending = false;
        true
    }

    fn check_size(&self, what: &'static str, size: u64) -> Result<(), RenderError> {
        let limit = self.device.limits().max_buffer_size;
        if size > limit {
            return Err(RenderError::BufferTooLarge { what, size, limit });
        }
        Ok(())
    }
}

impl MeshSink for GpuMeshSink {
    type Error = RenderError;

    fn upload(
        &mut self,
        vertices: &[TerrainVertex],
        indices: &[u32],
        layout: &VertexLayout,
    ) -> Result<(), Self::Error> {
        if layout.stride != std::mem::size_of::<TerrainVertex>() {
            return Err(RenderError::LayoutMismatch(layout.stride));
        }
        let vertex_bytes: &[u8] = bytemuck::cast_slice(vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(indices);
        self.check_size("vertex", vertex_bytes.len() as u64)?;
        self.check_size("index", index_bytes.len() as u64)?;

        let reusable = self.mesh.as_ref().is_some_and(|mesh| {
            mesh.vertex_buffer.size() == vertex_bytes.len() as u64
                && mesh.index_buffer.size() == index_bytes.len() as u64
        });

        if let Some(mesh) = self.mesh.as_mut().filter(|_| reusable) {
            self.queue.write_buffer(&mesh.vertex_buffer, 0, vertex_bytes);
            self.queue.write_buffer(&mesh.index_buffer, 0, index_bytes);
            mesh.num_indices = indices.len() as u32;
        } else {
            log::debug!(
                "Allocating terrain buffers ({} vertices, {} indices)",
                vertices.len(),
                indices.len()
            );
            self.mesh = Some(GpuTerrainMesh::new(
                &self.device,
                vertex_bytes,
                index_bytes,
                indices.len() as u32,
            ));
            self.reallocations += 1;
        }

        self.uploads += 1;
        Ok(())
    }

    fn draw(&mut self) -> Result<(), Self::Error> {
        if self.mesh.is_none() {
            return Err(RenderError::NothingUploaded);
        }
        self.draw_pending = true;
        Ok(())
    }
}

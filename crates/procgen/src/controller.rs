//! Keeps one terrain mesh in step with interactively edited parameters.
//!
//! The host hands the current [`TerrainParameters`] to [`TerrainController::update`]
//! once per frame. The controller diffs them against the last applied copy and runs
//! the cheapest rebuild path that covers every change. Rebuilds are staged on fresh
//! buffers and committed only when every step succeeded, so a rejected edit leaves
//! the previous mesh renderable and the edit still pending.

use crate::biome::BandHistogram;
use crate::error::{try_clone_slice, TerrainError};
use crate::heightfield::HeightField;
use crate::noise::NoiseGenerator;
use crate::params::{ParameterChanges, Rebuild, TerrainParameters};
use crate::sink::MeshSink;
use crate::terrain::{TerrainMesh, TerrainMeshBuilder};
use crate::vertex::TerrainVertex;

/// Summary of the current terrain, for logging and UI readouts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshStats {
    pub vertices: usize,
    pub indices: usize,
    pub triangles: usize,
    pub min_sample: f32,
    pub max_sample: f32,
    pub bands: BandHistogram,
}

/// Owns the noise generator, height field and mesh of one terrain.
#[derive(Debug)]
pub struct TerrainController {
    applied: TerrainParameters,
    noise: NoiseGenerator,
    field: HeightField,
    builder: TerrainMeshBuilder,
    mesh: TerrainMesh,
}

impl TerrainController {
    /// Build a terrain seeded from `params.seed`.
    pub fn new(params: TerrainParameters) -> Result<Self, TerrainError> {
        params.validate()?;
        let noise = NoiseGenerator::new(Some(params.seed));
        Self::with_generator(params, noise)
    }

    /// Build a terrain over a caller-supplied noise generator.
    ///
    /// A later change of `seed` replaces the generator with one seeded from it.
    pub fn with_generator(
        params: TerrainParameters,
        noise: NoiseGenerator,
    ) -> Result<Self, TerrainError> {
        params.validate()?;
        let (field, builder, mesh) = build_full(&noise, &params)?;
        log::info!(
            "Built {}x{} terrain: {} vertices, {} indices",
            params.width,
            params.height,
            mesh.vertices().len(),
            mesh.indices().len()
        );
        Ok(Self {
            applied: params,
            noise,
            field,
            builder,
            mesh,
        })
    }

    /// Apply this frame's parameters, rebuilding only what changed.
    ///
    /// Returns the most expensive path taken. On error nothing is modified and
    /// the same edit will be retried on the next call.
    pub fn update(&mut self, params: &TerrainParameters) -> Result<Rebuild, TerrainError> {
        let changes = ParameterChanges::between(&self.applied, params);
        let rebuild = changes.rebuild();
        if rebuild == Rebuild::None {
            return Ok(rebuild);
        }

        if let Err(err) = params.validate() {
            log::warn!("Rejected terrain update ({:?}): {}", rebuild, err);
            return Err(err);
        }

        match rebuild {
            Rebuild::Full => self.rebuild_full(&changes, params)?,
            _ => self.rebuild_vertices(&changes, params)?,
        }

        self.applied = params.clone();
        log::debug!("Terrain update {:?} ({:?})", rebuild, changes);
        Ok(rebuild)
    }

    fn rebuild_full(
        &mut self,
        changes: &ParameterChanges,
        params: &TerrainParameters,
    ) -> Result<(), TerrainError> {
        let reseeded = changes.seed.then(|| NoiseGenerator::new(Some(params.seed)));
        let noise = reseeded.as_ref().unwrap_or(&self.noise);
        let (field, builder, mesh) = build_full(noise, params)?;

        if let Some(noise) = reseeded {
            log::info!("Reseeded gradient table ({})", params.seed);
            self.noise = noise;
        }
        log::info!(
            "Rebuilt {}x{} terrain topology",
            params.width,
            params.height
        );
        self.field = field;
        self.builder = builder;
        self.mesh = mesh;
        Ok(())
    }

    fn rebuild_vertices(
        &mut self,
        changes: &ParameterChanges,
        params: &TerrainParameters,
    ) -> Result<(), TerrainError> {
        let mut vertices = try_clone_slice(self.mesh.vertices())?;
        let field = if changes.noise {
            Some(synthesize_field(&self.noise, params)?)
        } else {
            None
        };

        if changes.spacing {
            self.builder.apply_distance(&mut vertices, params.spacing);
        }
        if changes.noise || changes.map_height {
            let source = field.as_ref().unwrap_or(&self.field);
            self.builder
                .apply_height_field(&mut vertices, source, params.map_height);
        }
        self.builder
            .compute_normals(&mut vertices, params.smooth_shading);

        if let Some(field) = field {
            self.field = field;
        }
        self.mesh.replace_vertices(vertices);
        Ok(())
    }

    /// Push the mesh into `sink` if it changed since the last upload, then draw it.
    ///
    /// Returns whether an upload happened. A failed upload leaves the mesh flagged.
    pub fn sync<S: MeshSink>(&mut self, sink: &mut S) -> Result<bool, S::Error> {
        let upload = self.mesh.needs_upload();
        if upload {
            sink.upload(
                self.mesh.vertices(),
                self.mesh.indices(),
                &TerrainVertex::LAYOUT,
            )?;
            self.mesh.mark_uploaded();
        }
        sink.draw()?;
        Ok(upload)
    }

    /// Parameters of the last successful build.
    pub fn parameters(&self) -> &TerrainParameters {
        &self.applied
    }

    pub fn generator(&self) -> &NoiseGenerator {
        &self.noise
    }

    pub fn height_field(&self) -> &HeightField {
        &self.field
    }

    pub fn builder(&self) -> &TerrainMeshBuilder {
        &self.builder
    }

    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    pub fn stats(&self) -> MeshStats {
        let (min_sample, max_sample) = self.field.min_max();
        MeshStats {
            vertices: self.mesh.vertices().len(),
            indices: self.mesh.indices().len(),
            triangles: self.mesh.triangle_count(),
            min_sample,
            max_sample,
            bands: BandHistogram::from_samples(self.field.samples()),
        }
    }
}

fn synthesize_field(
    noise: &NoiseGenerator,
    params: &TerrainParameters,
) -> Result<HeightField, TerrainError> {
    let mut field = HeightField::synthesize(noise, &params.synthesis())?;
    if params.normalize_heights {
        field.normalize();
    }
    Ok(field)
}

fn build_full(
    noise: &NoiseGenerator,
    params: &TerrainParameters,
) -> Result<(HeightField, TerrainMeshBuilder, TerrainMesh), TerrainError> {
    let field = synthesize_field(noise, params)?;
    let builder = TerrainMeshBuilder::new(params.width, params.height)?;
    let mut vertices = builder.build_topology(params.spacing)?;
    let indices = builder.build_indices()?;
    builder.apply_height_field(&mut vertices, &field, params.map_height);
    builder.compute_normals(&mut vertices, params.smooth_shading);
    Ok((field, builder, TerrainMesh::new(vertices, indices)))
}

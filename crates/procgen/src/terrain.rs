//! Terrain mesh construction over a duplicated-vertex grid.
//!
//! Every grid cell owns four private vertex slots, so a lattice point shared by up
//! to four cells is stored up to four times. Flat shading writes one face normal
//! into a cell's slots; smooth shading then averages the copies of each lattice
//! point through the [`CommonVertexIndex`].
//!
//! Slot addressing: the duplicated grid has `2 * height` rows of `2 * width` slots.
//! Cell `(r, c)` owns `v = 2r * stride + 2c`, `v + 1`, `v + stride` and
//! `v + stride + 1`. Lattice rows run along -Z, columns along +X, so the first
//! triangle of every cell faces +Y.

use bytemuck::Zeroable;
use glam::Vec3;

use crate::biome::ElevationBand;
use crate::error::{try_vec_with_capacity, TerrainError};
use crate::heightfield::HeightField;
use crate::vertex::TerrainVertex;

/// Y of every vertex before the height field is applied.
pub const BASE_ELEVATION: f32 = 1.0;

/// Topological class of a lattice point, by how many cells touch it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatticeClass {
    /// One cell: grid corner.
    Corner,
    /// Two cells: border, not a corner.
    Edge,
    /// Four cells.
    Interior,
}

impl LatticeClass {
    /// Number of vertex slots representing a point of this class.
    pub fn slot_count(self) -> usize {
        match self {
            LatticeClass::Corner => 1,
            LatticeClass::Edge => 2,
            LatticeClass::Interior => 4,
        }
    }
}

/// Vertex slots of one lattice point, ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LatticeSlots {
    len: u8,
    slots: [u32; 4],
}

impl LatticeSlots {
    fn push(&mut self, slot: u32) {
        self.slots[self.len as usize] = slot;
        self.len += 1;
    }

    fn as_slice(&self) -> &[u32] {
        &self.slots[..self.len as usize]
    }
}

/// Maps each lattice point to all of its duplicated vertex slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonVertexIndex {
    columns: usize,
    rows: usize,
    points: Vec<LatticeSlots>,
}

impl CommonVertexIndex {
    /// Build the index for a `width x height` cell grid.
    pub fn new(width: u32, height: u32) -> Result<Self, TerrainError> {
        check_grid(width, height)?;
        let columns = width as usize + 1;
        let rows = height as usize + 1;
        let slot_rows = 2 * height as usize;
        let stride = 2 * width as usize;

        let mut points = try_vec_with_capacity(rows * columns)?;
        for z in 0..rows {
            for x in 0..columns {
                let mut entry = LatticeSlots::default();
                for r in [2 * z as isize - 1, 2 * z as isize] {
                    if r < 0 || r as usize >= slot_rows {
                        continue;
                    }
                    for c in [2 * x as isize - 1, 2 * x as isize] {
                        if c < 0 || c as usize >= stride {
                            continue;
                        }
                        entry.push((r as usize * stride + c as usize) as u32);
                    }
                }
                points.push(entry);
            }
        }

        Ok(Self {
            columns,
            rows,
            points,
        })
    }

    /// Slots representing lattice point `(z, x)`.
    pub fn slots(&self, z: usize, x: usize) -> &[u32] {
        self.points[z * self.columns + x].as_slice()
    }

    pub fn class(&self, z: usize, x: usize) -> LatticeClass {
        match self.slots(z, x).len() {
            1 => LatticeClass::Corner,
            2 => LatticeClass::Edge,
            _ => LatticeClass::Interior,
        }
    }

    /// `(z, x, slots)` for every lattice point, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &[u32])> + '_ {
        let columns = self.columns;
        self.points
            .iter()
            .enumerate()
            .map(move |(i, entry)| (i / columns, i % columns, entry.as_slice()))
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
}

fn check_grid(width: u32, height: u32) -> Result<(), TerrainError> {
    if width == 0 || height == 0 {
        return Err(TerrainError::DegenerateGrid { width, height });
    }
    if 4 * width as u64 * height as u64 > u32::MAX as u64 {
        return Err(TerrainError::GridTooLarge { width, height });
    }
    Ok(())
}

/// Builds and refreshes duplicated-vertex terrain meshes for one grid size.
#[derive(Debug, Clone)]
pub struct TerrainMeshBuilder {
    width: u32,
    height: u32,
    stride: usize,
    common: CommonVertexIndex,
}

impl TerrainMeshBuilder {
    /// Builder for a `width x height` cell grid.
    pub fn new(width: u32, height: u32) -> Result<Self, TerrainError> {
        let common = CommonVertexIndex::new(width, height)?;
        Ok(Self {
            width,
            height,
            stride: 2 * width as usize,
            common,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Slots per duplicated row.
    pub fn row_stride(&self) -> usize {
        self.stride
    }

    /// Total duplicated vertices (`4 * width * height`).
    pub fn vertex_count(&self) -> usize {
        4 * self.width as usize * self.height as usize
    }

    /// Total indices (`6 * width * height`).
    pub fn index_count(&self) -> usize {
        6 * self.width as usize * self.height as usize
    }

    pub fn common_vertices(&self) -> &CommonVertexIndex {
        &self.common
    }

    /// Emit the flat duplicated-vertex grid at `BASE_ELEVATION`.
    ///
    /// Every copy of a lattice point gets the same position, an up normal, the
    /// water color and the lattice UV.
    pub fn build_topology(&self, spacing: f32) -> Result<Vec<TerrainVertex>, TerrainError> {
        let mut vertices = try_vec_with_capacity(self.vertex_count())?;
        vertices.resize(self.vertex_count(), TerrainVertex::zeroed());

        for (z, x, slots) in self.common.iter() {
            let base = TerrainVertex {
                position: [x as f32 * spacing, BASE_ELEVATION, -(z as f32 * spacing)],
                normal: [0.0, 1.0, 0.0],
                color: ElevationBand::Water.color(),
                uv: [
                    x as f32 / self.width as f32,
                    z as f32 / self.height as f32,
                ],
            };
            for &slot in slots {
                vertices[slot as usize] = base;
            }
        }

        Ok(vertices)
    }

    /// Two triangles per cell: `(v, v+1, v+stride)` and `(v+1, v+stride, v+stride+1)`.
    pub fn build_indices(&self) -> Result<Vec<u32>, TerrainError> {
        let mut indices = try_vec_with_capacity(self.index_count())?;
        let stride = self.stride as u32;
        for row in 0..self.height {
            for col in 0..self.width {
                let v = 2 * row * stride + 2 * col;
                indices.extend([v, v + 1, v + stride]);
                indices.extend([v + 1, v + stride, v + stride + 1]);
            }
        }
        Ok(indices)
    }

    /// Lift every lattice point to `BASE_ELEVATION + sample * map_height` and color
    /// it by elevation band.
    pub fn apply_height_field(
        &self,
        vertices: &mut [TerrainVertex],
        field: &HeightField,
        map_height: f32,
    ) {
        debug_assert_eq!(field.columns(), self.common.columns());
        debug_assert_eq!(field.rows(), self.common.rows());

        for (z, x, slots) in self.common.iter() {
            let sample = field.get(z, x);
            let y = BASE_ELEVATION + sample * map_height;
            let color = ElevationBand::classify(sample).color();
            for &slot in slots {
                let v = &mut vertices[slot as usize];
                v.position[1] = y;
                v.color = color;
            }
        }
    }

    /// Rewrite X/Z of every vertex for a new lattice spacing; Y is untouched.
    pub fn apply_distance(&self, vertices: &mut [TerrainVertex], spacing: f32) {
        for (z, x, slots) in self.common.iter() {
            let px = x as f32 * spacing;
            let pz = -(z as f32 * spacing);
            for &slot in slots {
                let v = &mut vertices[slot as usize];
                v.position[0] = px;
                v.position[2] = pz;
            }
        }
    }

    /// Recompute normals from positions.
    ///
    /// Each cell's first-triangle face normal goes to all four of its slots. With
    /// `smooth`, the copies of every lattice point are then averaged and
    /// renormalized. Normals are derived from positions only, so repeated calls
    /// give identical results.
    pub fn compute_normals(&self, vertices: &mut [TerrainVertex], smooth: bool) {
        let stride = self.stride;
        for row in 0..self.height as usize {
            for col in 0..self.width as usize {
                let v = 2 * row * stride + 2 * col;
                let p0 = Vec3::from(vertices[v].position);
                let p1 = Vec3::from(vertices[v + 1].position);
                let p2 = Vec3::from(vertices[v + stride].position);
                let normal = (p1 - p0).cross(p2 - p0).try_normalize().unwrap_or(Vec3::Y);
                let n = normal.to_array();
                for slot in [v, v + 1, v + stride, v + stride + 1] {
                    vertices[slot].normal = n;
                }
            }
        }

        if smooth {
            for (_, _, slots) in self.common.iter() {
                let sum: Vec3 = slots
                    .iter()
                    .map(|&s| Vec3::from(vertices[s as usize].normal))
                    .sum();
                let n = sum.try_normalize().unwrap_or(Vec3::Y).to_array();
                for &slot in slots {
                    vertices[slot as usize].normal = n;
                }
            }
        }
    }
}

/// Renderable terrain buffers plus an "upload due" flag for the GPU sink.
#[derive(Debug, Clone, Default)]
pub struct TerrainMesh {
    vertices: Vec<TerrainVertex>,
    indices: Vec<u32>,
    upload_due: bool,
}

impl TerrainMesh {
    /// Wrap freshly built buffers; they are due for upload.
    pub fn new(vertices: Vec<TerrainVertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            upload_due: true,
        }
    }

    pub fn vertices(&self) -> &[TerrainVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Swap in new vertex data with unchanged topology.
    pub fn replace_vertices(&mut self, vertices: Vec<TerrainVertex>) {
        debug_assert_eq!(vertices.len(), self.vertices.len());
        self.vertices = vertices;
        self.upload_due = true;
    }

    /// True when buffers changed since the last upload.
    pub fn needs_upload(&self) -> bool {
        self.upload_due
    }

    pub fn mark_uploaded(&mut self) {
        self.upload_due = false;
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightfield::SynthesisSettings;
    use crate::noise::NoiseGenerator;

    fn field(width: u32, height: u32, seed: u64) -> HeightField {
        let settings = SynthesisSettings {
            width,
            height,
            frequency: 1.0,
            lacunarity: 2.0,
            persistence: 0.5,
            octaves: 3,
            dimension: 4.0,
        };
        HeightField::synthesize(&NoiseGenerator::new(Some(seed)), &settings).unwrap()
    }

    fn built(width: u32, height: u32) -> (TerrainMeshBuilder, Vec<TerrainVertex>) {
        let builder = TerrainMeshBuilder::new(width, height).unwrap();
        let mut vertices = builder.build_topology(0.5).unwrap();
        builder.apply_height_field(&mut vertices, &field(width, height, 9), 3.0);
        (builder, vertices)
    }

    #[test]
    fn lattice_classes_match_slot_counts() {
        let index = CommonVertexIndex::new(4, 3).unwrap();
        assert_eq!(index.columns(), 5);
        assert_eq!(index.rows(), 4);
        for (z, x, slots) in index.iter() {
            let on_x_border = x == 0 || x == 4;
            let on_z_border = z == 0 || z == 3;
            let expected = match (on_x_border, on_z_border) {
                (true, true) => LatticeClass::Corner,
                (true, false) | (false, true) => LatticeClass::Edge,
                (false, false) => LatticeClass::Interior,
            };
            assert_eq!(index.class(z, x), expected, "point ({}, {})", z, x);
            assert_eq!(slots.len(), expected.slot_count());
        }
    }

    #[test]
    fn every_slot_belongs_to_exactly_one_point() {
        let index = CommonVertexIndex::new(5, 2).unwrap();
        let mut owners = vec![0u32; 4 * 5 * 2];
        for (_, _, slots) in index.iter() {
            for &s in slots {
                owners[s as usize] += 1;
            }
        }
        assert!(owners.iter().all(|&n| n == 1));
    }

    #[test]
    fn interior_point_slots_follow_row_stride() {
        // 2x2 grid, stride 4: the centre point sits at duplicated rows 1..=2, cols 1..=2.
        let index = CommonVertexIndex::new(2, 2).unwrap();
        assert_eq!(index.slots(1, 1), &[5, 6, 9, 10]);
        assert_eq!(index.slots(0, 0), &[0]);
        assert_eq!(index.slots(2, 2), &[15]);
        assert_eq!(index.slots(0, 1), &[1, 2]);
        assert_eq!(index.slots(1, 0), &[4, 8]);
    }

    #[test]
    fn degenerate_and_oversized_grids_are_rejected() {
        assert!(matches!(
            TerrainMeshBuilder::new(0, 3),
            Err(TerrainError::DegenerateGrid { .. })
        ));
        assert!(matches!(
            TerrainMeshBuilder::new(70_000, 70_000),
            Err(TerrainError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn indices_cover_every_cell_in_bounds() {
        for (w, h) in [(1, 1), (4, 4), (7, 3), (2, 9)] {
            let builder = TerrainMeshBuilder::new(w, h).unwrap();
            let vertices = builder.build_topology(1.0).unwrap();
            let indices = builder.build_indices().unwrap();
            assert_eq!(vertices.len(), (4 * w * h) as usize);
            assert_eq!(indices.len(), (w * h * 6) as usize);
            assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
        }
    }

    #[test]
    fn triangles_stay_inside_their_cell() {
        let builder = TerrainMeshBuilder::new(3, 2).unwrap();
        let vertices = builder.build_topology(1.0).unwrap();
        let indices = builder.build_indices().unwrap();
        for tri in indices.chunks(3) {
            let xs: Vec<f32> = tri.iter().map(|&i| vertices[i as usize].position[0]).collect();
            let zs: Vec<f32> = tri.iter().map(|&i| vertices[i as usize].position[2]).collect();
            let span = |v: &[f32]| {
                v.iter().cloned().fold(f32::MIN, f32::max) - v.iter().cloned().fold(f32::MAX, f32::min)
            };
            assert_eq!(span(&xs), 1.0);
            assert_eq!(span(&zs), 1.0);
        }
    }

    #[test]
    fn topology_replicates_base_vertex_into_every_copy() {
        let builder = TerrainMeshBuilder::new(3, 3).unwrap();
        let vertices = builder.build_topology(0.25).unwrap();
        for (z, x, slots) in builder.common_vertices().iter() {
            for &s in slots {
                let v = vertices[s as usize];
                assert_eq!(v.position, [x as f32 * 0.25, BASE_ELEVATION, -(z as f32 * 0.25)]);
                assert_eq!(v.normal, [0.0, 1.0, 0.0]);
                assert_eq!(v.uv, [x as f32 / 3.0, z as f32 / 3.0]);
            }
        }
    }

    #[test]
    fn height_field_lifts_and_colors_all_copies() {
        let builder = TerrainMeshBuilder::new(4, 4).unwrap();
        let mut vertices = builder.build_topology(1.0).unwrap();
        let f = field(4, 4, 21);
        builder.apply_height_field(&mut vertices, &f, 2.0);
        for (z, x, slots) in builder.common_vertices().iter() {
            let sample = f.get(z, x);
            for &s in slots {
                let v = vertices[s as usize];
                assert_eq!(v.position[1], BASE_ELEVATION + sample * 2.0);
                assert_eq!(v.color, ElevationBand::classify(sample).color());
            }
        }
    }

    #[test]
    fn flat_grid_normals_point_up() {
        let builder = TerrainMeshBuilder::new(3, 3).unwrap();
        let mut vertices = builder.build_topology(1.0).unwrap();
        builder.compute_normals(&mut vertices, false);
        assert!(vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn flat_shading_shares_one_normal_per_cell() {
        let (builder, mut vertices) = built(4, 4);
        builder.compute_normals(&mut vertices, false);
        let stride = builder.row_stride();
        for row in 0..4 {
            for col in 0..4 {
                let v = 2 * row * stride + 2 * col;
                let n = vertices[v].normal;
                for slot in [v + 1, v + stride, v + stride + 1] {
                    assert_eq!(vertices[slot].normal, n);
                }
                assert!((Vec3::from(n).length() - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn smooth_shading_agrees_across_copies() {
        let (builder, mut vertices) = built(5, 4);
        builder.compute_normals(&mut vertices, true);
        for (_, _, slots) in builder.common_vertices().iter() {
            let first = vertices[slots[0] as usize].normal;
            for &s in slots {
                assert_eq!(vertices[s as usize].normal, first);
            }
            assert!((Vec3::from(first).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn smoothing_twice_equals_smoothing_once() {
        let (builder, mut vertices) = built(6, 6);
        builder.compute_normals(&mut vertices, true);
        let once: Vec<[f32; 3]> = vertices.iter().map(|v| v.normal).collect();
        builder.compute_normals(&mut vertices, true);
        for (a, b) in once.iter().zip(vertices.iter().map(|v| v.normal)) {
            assert!(Vec3::from(*a).abs_diff_eq(Vec3::from(b), 1e-6));
        }
    }

    #[test]
    fn apply_distance_moves_only_x_and_z() {
        let (builder, mut vertices) = built(3, 4);
        let before = vertices.clone();
        builder.apply_distance(&mut vertices, 2.0);
        for (z, x, slots) in builder.common_vertices().iter() {
            for &s in slots {
                let (old, new) = (before[s as usize], vertices[s as usize]);
                assert_eq!(new.position[0], x as f32 * 2.0);
                assert_eq!(new.position[2], -(z as f32 * 2.0));
                assert_eq!(new.position[1], old.position[1]);
                assert_eq!(new.color, old.color);
            }
        }
    }

    #[test]
    fn mesh_tracks_upload_state() {
        let builder = TerrainMeshBuilder::new(2, 2).unwrap();
        let mut mesh = TerrainMesh::new(
            builder.build_topology(1.0).unwrap(),
            builder.build_indices().unwrap(),
        );
        assert!(mesh.needs_upload());
        assert_eq!(mesh.triangle_count(), 8);
        mesh.mark_uploaded();
        assert!(!mesh.needs_upload());
        let vertices = mesh.vertices().to_vec();
        mesh.replace_vertices(vertices);
        assert!(mesh.needs_upload());
    }
}

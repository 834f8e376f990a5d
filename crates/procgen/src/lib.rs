//! Procedural terrain: gradient noise, height field synthesis, duplicated-vertex
//! mesh building and incremental rebuilds driven by parameter edits.

pub mod biome;
pub mod controller;
pub mod error;
pub mod heightfield;
pub mod noise;
pub mod params;
pub mod sink;
pub mod terrain;
pub mod vertex;

pub use biome::*;
pub use controller::*;
pub use error::TerrainError;
pub use heightfield::*;
pub use noise::*;
pub use params::*;
pub use sink::*;
pub use terrain::*;
pub use vertex::*;

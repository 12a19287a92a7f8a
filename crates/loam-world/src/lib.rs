//! Deterministic terrain field: noise, climate, biomes, layering and voxel colors.
#![forbid(unsafe_code)]

pub mod biome;
pub mod chunk_coord;
pub mod color;
pub mod noise;
pub mod world;
pub mod worldgen;

pub use biome::{Biome, Climate};
pub use chunk_coord::ChunkCoord;
pub use color::voxel_color;
pub use noise::seed_from_name;
pub use world::{Column, World};
pub use worldgen::WorldGenConfig;

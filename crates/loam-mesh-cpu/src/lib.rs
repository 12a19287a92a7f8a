//! CPU meshing: culled per-voxel faces split into opaque and water streams,
//! plus the distant-horizon ring and line overlays.
#![forbid(unsafe_code)]

mod build;
pub mod face;
pub mod horizon;
mod mesh_build;
pub mod overlay;

pub use build::build_chunk_mesh;
pub use face::Face;
pub use horizon::{HorizonConfig, build_horizon_ring};
pub use mesh_build::{
    ChunkMeshCPU, FLOATS_PER_VERTEX, MeshBuild, MeshStats, Pass, VERTS_PER_FACE,
};
pub use overlay::{wave_offset, wire_aabb_lines, wire_cube_lines};

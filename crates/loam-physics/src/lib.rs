//! Voxel-grid physics: DDA ray picking and the walking/flying body solver.
//! Both read voxels through caller-supplied samplers, so they work against
//! whatever storage the caller has resident.
#![forbid(unsafe_code)]

pub mod raycast;
pub mod walker;

pub use raycast::{RayHit, raycast_first_hit_with_face};
pub use walker::{MoveInput, MoveMode, Walker, WalkerParams};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use loam_blocks::Voxel;
use loam_chunk::{ChunkBuf, build_chunk};
use loam_geom::IVec3;
use loam_world::{ChunkCoord, World};

/// One chunk to reconstruct: its coordinate and the edits that overlay it.
pub type BuildJob = (ChunkCoord, Vec<(IVec3, Voxel)>);

/// Generates batches of chunks in parallel. Results come back in job order
/// so the caller installs them deterministically.
pub struct BuildPool {
    pool: Option<ThreadPool>,
}

impl BuildPool {
    /// `threads == 0` lets rayon size the pool.
    pub fn new(threads: usize) -> Self {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("loam-gen-{i}"))
            .build();
        match pool {
            Ok(p) => {
                log::debug!("generation pool with {} threads", p.current_num_threads());
                Self { pool: Some(p) }
            }
            Err(e) => {
                log::warn!("generation pool unavailable ({e}); building on the calling thread");
                Self { pool: None }
            }
        }
    }

    pub fn generate(&self, world: &World, jobs: Vec<BuildJob>) -> Vec<ChunkBuf> {
        match &self.pool {
            Some(p) if jobs.len() > 1 => p.install(|| {
                jobs.into_par_iter()
                    .map(|(c, edits)| build_chunk(world, c, edits))
                    .collect()
            }),
            _ => jobs
                .into_iter()
                .map(|(c, edits)| build_chunk(world, c, edits))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_matches_serial_generation() {
        let w = World::new("default");
        let pool = BuildPool::new(2);
        let edit = (IVec3::new(33, 10, 1), Voxel::Wood);
        let jobs = vec![
            (ChunkCoord::new(0, 0), vec![]),
            (ChunkCoord::new(1, 0), vec![edit]),
            (ChunkCoord::new(-1, 2), vec![]),
        ];
        let out = pool.generate(&w, jobs.clone());
        assert_eq!(out.len(), 3);
        for (buf, (c, edits)) in out.iter().zip(jobs) {
            assert_eq!(buf.coord, c);
            assert_eq!(buf.blocks, build_chunk(&w, c, edits).blocks);
        }
        assert_eq!(out[1].get_world(33, 10, 1), Some(Voxel::Wood));
    }
}

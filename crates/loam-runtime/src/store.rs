use hashbrown::HashMap;

use loam_blocks::Voxel;
use loam_chunk::ChunkBuf;
use loam_mesh_cpu::Pass;
use loam_world::ChunkCoord;

use crate::backend::BufferHandle;

/// One uploaded stream of a chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GpuMesh {
    pub handle: BufferHandle,
    pub vertex_count: usize,
}

pub struct ChunkEntry {
    pub buf: ChunkBuf,
    pub opaque: Option<GpuMesh>,
    pub translucent: Option<GpuMesh>,
    /// Completed mesh builds for this residency.
    pub mesh_count: u32,
}

impl ChunkEntry {
    pub fn new(buf: ChunkBuf) -> Self {
        Self {
            buf,
            opaque: None,
            translucent: None,
            mesh_count: 0,
        }
    }

    pub fn mesh(&self, pass: Pass) -> Option<GpuMesh> {
        match pass {
            Pass::Opaque => self.opaque,
            Pass::Translucent => self.translucent,
        }
    }

    /// Detaches both uploaded streams, leaving the entry unmeshed.
    pub fn take_meshes(&mut self) -> [Option<GpuMesh>; 2] {
        [self.opaque.take(), self.translucent.take()]
    }
}

/// Resident chunks keyed by coordinate. Non-resident reads resolve to air.
pub struct ChunkStore {
    chunk_size: usize,
    chunks: HashMap<ChunkCoord, ChunkEntry>,
}

impl ChunkStore {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            chunks: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn contains(&self, c: ChunkCoord) -> bool {
        self.chunks.contains_key(&c)
    }

    pub fn get(&self, c: ChunkCoord) -> Option<&ChunkEntry> {
        self.chunks.get(&c)
    }

    pub fn get_mut(&mut self, c: ChunkCoord) -> Option<&mut ChunkEntry> {
        self.chunks.get_mut(&c)
    }

    pub fn insert(&mut self, buf: ChunkBuf) -> Option<ChunkEntry> {
        self.chunks.insert(buf.coord, ChunkEntry::new(buf))
    }

    pub fn remove(&mut self, c: ChunkCoord) -> Option<ChunkEntry> {
        self.chunks.remove(&c)
    }

    /// Removes every chunk, handing the entries back so their buffers can be freed.
    pub fn drain(&mut self) -> impl Iterator<Item = ChunkEntry> + '_ {
        self.chunks.drain().map(|(_, e)| e)
    }

    /// Resident coordinates in a stable order.
    pub fn coords(&self) -> Vec<ChunkCoord> {
        let mut out: Vec<ChunkCoord> = self.chunks.keys().copied().collect();
        out.sort();
        out
    }

    /// Uploaded streams across all resident chunks.
    pub fn live_buffers(&self) -> usize {
        self.chunks
            .values()
            .map(|e| usize::from(e.opaque.is_some()) + usize::from(e.translucent.is_some()))
            .sum()
    }

    pub fn voxel(&self, x: i32, y: i32, z: i32) -> Voxel {
        let c = ChunkCoord::containing(x, z, self.chunk_size);
        self.chunks
            .get(&c)
            .and_then(|e| e.buf.get_world(x, y, z))
            .unwrap_or(Voxel::Air)
    }
}

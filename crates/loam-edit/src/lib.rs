//! Sparse voxel edits layered over generated terrain, plus bounded undo/redo.
#![forbid(unsafe_code)]

mod history;

pub use history::{History, HistoryEntry};

use loam_blocks::Voxel;
use loam_geom::IVec3;
use loam_world::ChunkCoord;
use std::collections::HashMap;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditStoreStats {
    pub chunk_entries: usize,
    pub block_edits: usize,
}

/// Chunk-bucketed override table: world voxel coordinate -> voxel.
#[derive(Clone, Debug)]
pub struct EditStore {
    chunk_size: i32,
    inner: HashMap<ChunkCoord, HashMap<IVec3, Voxel>>,
}

impl EditStore {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size as i32,
            inner: HashMap::new(),
        }
    }

    pub fn stats(&self) -> EditStoreStats {
        EditStoreStats {
            chunk_entries: self.inner.len(),
            block_edits: self.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.values().map(|m| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    fn chunk_key(&self, p: IVec3) -> ChunkCoord {
        ChunkCoord::new(p.x.div_euclid(self.chunk_size), p.z.div_euclid(self.chunk_size))
    }

    pub fn get(&self, p: IVec3) -> Option<Voxel> {
        let k = self.chunk_key(p);
        self.inner.get(&k).and_then(|m| m.get(&p).copied())
    }

    pub fn set(&mut self, p: IVec3, v: Voxel) {
        let k = self.chunk_key(p);
        self.inner.entry(k).or_default().insert(p, v);
    }

    pub fn remove(&mut self, p: IVec3) -> Option<Voxel> {
        let k = self.chunk_key(p);
        let m = self.inner.get_mut(&k)?;
        let old = m.remove(&p);
        if m.is_empty() {
            self.inner.remove(&k);
        }
        old
    }

    /// Stores `next` as the override at `p`, or drops the record when `next`
    /// equals what generation would produce there.
    pub fn record(&mut self, p: IVec3, next: Voxel, generated: Voxel) {
        if next == generated {
            self.remove(p);
        } else {
            self.set(p, next);
        }
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Snapshot of all edits for a specific chunk
    pub fn snapshot_for_chunk(&self, c: ChunkCoord) -> Vec<(IVec3, Voxel)> {
        self.inner
            .get(&c)
            .map(|m| m.iter().map(|(k, v)| (*k, *v)).collect())
            .unwrap_or_default()
    }

    /// Every record, ordered by coordinate.
    pub fn entries(&self) -> Vec<(IVec3, Voxel)> {
        let mut out: Vec<(IVec3, Voxel)> = self
            .inner
            .values()
            .flat_map(|m| m.iter().map(|(k, v)| (*k, *v)))
            .collect();
        out.sort_by_key(|(k, _)| *k);
        out
    }

    /// Chunks whose meshes can see the voxel at `p`: the owner, plus each
    /// edge-adjacent chunk when `p` sits on the shared border.
    pub fn affected_chunks(&self, p: IVec3) -> Vec<ChunkCoord> {
        let owner = self.chunk_key(p);
        let lx = p.x.rem_euclid(self.chunk_size);
        let lz = p.z.rem_euclid(self.chunk_size);
        let last = self.chunk_size - 1;
        let mut affected = vec![owner];
        if lx == 0 {
            affected.push(owner.offset(-1, 0));
        }
        if lx == last {
            affected.push(owner.offset(1, 0));
        }
        if lz == 0 {
            affected.push(owner.offset(0, -1));
        }
        if lz == last {
            affected.push(owner.offset(0, 1));
        }
        affected.dedup();
        affected
    }
}

//! Dense per-chunk voxel grids and their generation.
#![forbid(unsafe_code)]

use loam_blocks::Voxel;
use loam_geom::IVec3;
use loam_world::{ChunkCoord, World};

/// Full-height voxel column block for one chunk coordinate.
/// Indexing is `(y * sz + z) * sx + x`; dimensions never change after creation.
#[derive(Clone, Debug)]
pub struct ChunkBuf {
    pub coord: ChunkCoord,
    pub sx: usize,
    pub sy: usize,
    pub sz: usize,
    pub blocks: Vec<Voxel>,
}

impl ChunkBuf {
    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.sz + z) * self.sx + x
    }

    #[inline]
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> Voxel {
        self.blocks[self.idx(x, y, z)]
    }

    /// Signed local read; anything outside the grid is air.
    #[inline]
    pub fn get_local_or_air(&self, x: i32, y: i32, z: i32) -> Voxel {
        if x < 0
            || y < 0
            || z < 0
            || x as usize >= self.sx
            || y as usize >= self.sy
            || z as usize >= self.sz
        {
            return Voxel::Air;
        }
        self.get_local(x as usize, y as usize, z as usize)
    }

    #[inline]
    pub fn set_local(&mut self, x: usize, y: usize, z: usize, v: Voxel) {
        let i = self.idx(x, y, z);
        self.blocks[i] = v;
    }

    #[inline]
    pub fn origin(&self) -> (i32, i32) {
        (self.coord.cx * self.sx as i32, self.coord.cz * self.sz as i32)
    }

    #[inline]
    pub fn contains_world(&self, wx: i32, wy: i32, wz: i32) -> bool {
        let (bx, bz) = self.origin();
        if wy < 0 || wy >= self.sy as i32 {
            return false;
        }
        wx >= bx && wx < bx + self.sx as i32 && wz >= bz && wz < bz + self.sz as i32
    }

    #[inline]
    pub fn get_world(&self, wx: i32, wy: i32, wz: i32) -> Option<Voxel> {
        if !self.contains_world(wx, wy, wz) {
            return None;
        }
        let (bx, bz) = self.origin();
        Some(self.get_local((wx - bx) as usize, wy as usize, (wz - bz) as usize))
    }

    /// Writes a world-space voxel and returns the previous value, or `None`
    /// when the position lies outside this chunk.
    pub fn set_world(&mut self, wx: i32, wy: i32, wz: i32, v: Voxel) -> Option<Voxel> {
        if !self.contains_world(wx, wy, wz) {
            return None;
        }
        let (bx, bz) = self.origin();
        let i = self.idx((wx - bx) as usize, wy as usize, (wz - bz) as usize);
        Some(std::mem::replace(&mut self.blocks[i], v))
    }

    pub fn from_blocks_local(
        coord: ChunkCoord,
        sx: usize,
        sy: usize,
        sz: usize,
        blocks: Vec<Voxel>,
    ) -> Self {
        let mut b = blocks;
        let expect = sx * sy * sz;
        if b.len() != expect {
            b.resize(expect, Voxel::Air);
        }
        ChunkBuf {
            coord,
            sx,
            sy,
            sz,
            blocks: b,
        }
    }

    /// Overwrites cells with edit records. Positions outside the chunk are ignored.
    /// Returns how many records landed.
    pub fn apply_overrides<I>(&mut self, edits: I) -> usize
    where
        I: IntoIterator<Item = (IVec3, Voxel)>,
    {
        let mut applied = 0;
        for (p, v) in edits {
            if self.set_world(p.x, p.y, p.z, v).is_some() {
                applied += 1;
            }
        }
        applied
    }
}

/// Terrain for `coord` with no edits applied. Height and climate are
/// sampled once per column.
pub fn generate_chunk_buffer(world: &World, coord: ChunkCoord) -> ChunkBuf {
    let sx = world.chunk_size();
    let sz = sx;
    let sy = world.world_height();
    let mut blocks = vec![Voxel::Air; sx * sy * sz];
    let (base_x, base_z) = coord.origin(sx);
    for z in 0..sz {
        for x in 0..sx {
            let col = world.column(base_x + x as i32, base_z + z as i32);
            // Nothing above max(surface, water) is non-air.
            let top = (col.height.max(world.water_level() - 1) as usize).min(sy - 1);
            for y in 0..=top {
                blocks[(y * sz + z) * sx + x] = world.voxel_in_column(&col, y as i32);
            }
        }
    }
    ChunkBuf {
        coord,
        sx,
        sy,
        sz,
        blocks,
    }
}

/// Generated terrain with `edits` overlaid. This is the full reconstruction of
/// a chunk from (seed, field, edit log).
pub fn build_chunk<I>(world: &World, coord: ChunkCoord, edits: I) -> ChunkBuf
where
    I: IntoIterator<Item = (IVec3, Voxel)>,
{
    let mut buf = generate_chunk_buffer(world, coord);
    buf.apply_overrides(edits);
    buf
}

use serde::{Deserialize, Serialize};

/// Horizontal chunk coordinate. Chunks span the full world height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    /// Chunk owning world column `(x, z)` for chunks `size` voxels wide.
    #[inline]
    pub fn containing(x: i32, z: i32, size: usize) -> Self {
        let s = size as i32;
        Self::new(x.div_euclid(s), z.div_euclid(s))
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.cx + dx, self.cz + dz)
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.cx - other.cx);
        let dz = i64::from(self.cz - other.cz);
        dx * dx + dz * dz
    }

    /// Chebyshev distance, the metric for square view regions.
    #[inline]
    pub fn chebyshev(self, other: ChunkCoord) -> i32 {
        (self.cx - other.cx).abs().max((self.cz - other.cz).abs())
    }

    /// The four edge-adjacent chunks (+X, -X, +Z, -Z).
    #[inline]
    pub fn neighbors(self) -> [ChunkCoord; 4] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
        ]
    }

    /// World x/z of the chunk's minimum corner.
    #[inline]
    pub fn origin(self, size: usize) -> (i32, i32) {
        let s = size as i32;
        (self.cx * s, self.cz * s)
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<ChunkCoord> for (i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containing_floors_negatives() {
        assert_eq!(ChunkCoord::containing(-1, 0, 32), ChunkCoord::new(-1, 0));
        assert_eq!(ChunkCoord::containing(-32, 31, 32), ChunkCoord::new(-1, 0));
        assert_eq!(ChunkCoord::containing(-33, 32, 32), ChunkCoord::new(-2, 1));
    }

    #[test]
    fn chebyshev_is_max_axis() {
        let a = ChunkCoord::new(0, 0);
        assert_eq!(a.chebyshev(ChunkCoord::new(3, -5)), 5);
        assert_eq!(a.distance_sq(ChunkCoord::new(3, -5)), 34);
    }
}

use loam_geom::Vec3;
use loam_world::ChunkCoord;

use crate::face::Face;

/// Interleaved `position3 color3 normal3` floats.
pub const FLOATS_PER_VERTEX: usize = 9;
pub const VERTS_PER_FACE: usize = 6;

#[derive(Default, Clone, Debug, PartialEq)]
pub struct MeshBuild {
    pub data: Vec<f32>,
}

impl MeshBuild {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.data.len() / FLOATS_PER_VERTEX
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn reserve_faces(&mut self, faces: usize) {
        self.data.reserve(faces * VERTS_PER_FACE * FLOATS_PER_VERTEX);
    }

    #[inline]
    pub fn push_vertex(&mut self, p: [f32; 3], rgb: [f32; 3], n: Vec3) {
        self.data.extend_from_slice(&p);
        self.data.extend_from_slice(&rgb);
        self.data.extend_from_slice(&[n.x, n.y, n.z]);
    }

    /// Unit-voxel face at `origin` as two triangles.
    pub fn add_face(&mut self, face: Face, origin: [f32; 3], rgb: [f32; 3]) {
        let n = face.normal();
        let c = face.corners();
        let p = |i: usize| {
            [
                origin[0] + c[i][0],
                origin[1] + c[i][1],
                origin[2] + c[i][2],
            ]
        };
        for i in [0, 1, 2, 0, 2, 3] {
            self.push_vertex(p(i), rgb, n);
        }
    }

    /// Arbitrary quad `a b c d` as triangles (a,b,c),(a,c,d).
    pub fn add_quad(&mut self, q: [[f32; 3]; 4], rgb: [f32; 3], n: Vec3) {
        for i in [0, 1, 2, 0, 2, 3] {
            self.push_vertex(q[i], rgb, n);
        }
    }

    /// Positions of vertex `i`.
    pub fn position(&self, i: usize) -> [f32; 3] {
        let o = i * FLOATS_PER_VERTEX;
        [self.data[o], self.data[o + 1], self.data[o + 2]]
    }

    pub fn normal(&self, i: usize) -> [f32; 3] {
        let o = i * FLOATS_PER_VERTEX + 6;
        [self.data[o], self.data[o + 1], self.data[o + 2]]
    }
}

/// Render pass a stream belongs to. Opaque draws first with depth writes;
/// translucent draws after with blending and no depth writes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pass {
    Opaque,
    Translucent,
}

#[derive(Clone, Debug, Default)]
pub struct MeshStats {
    pub voxels_visited: usize,
    pub voxels_enclosed: usize,
    pub faces_opaque: usize,
    pub faces_translucent: usize,
}

/// CPU mesh for one chunk: solid faces and water faces in separate streams.
#[derive(Clone, Debug)]
pub struct ChunkMeshCPU {
    pub coord: ChunkCoord,
    pub opaque: MeshBuild,
    pub translucent: MeshBuild,
    pub stats: MeshStats,
}

impl ChunkMeshCPU {
    pub fn stream(&self, pass: Pass) -> &MeshBuild {
        match pass {
            Pass::Opaque => &self.opaque,
            Pass::Translucent => &self.translucent,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.opaque.vertex_count() + self.translucent.vertex_count()
    }
}

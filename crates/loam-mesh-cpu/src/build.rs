use loam_blocks::Voxel;
use loam_chunk::ChunkBuf;
use loam_world::{World, voxel_color};

use crate::face::Face;
use crate::mesh_build::{ChunkMeshCPU, MeshBuild, MeshStats};

#[inline]
fn face_visible(v: Voxel, neighbor: Voxel) -> bool {
    if v.is_water() {
        neighbor.is_air()
    } else {
        neighbor.is_air() || neighbor.is_water()
    }
}

/// Triangulates every visible voxel face of `buf`.
///
/// Reads inside the chunk come from `buf`; reads across the x/z border go to
/// `outside(wx, wy, wz)`, which must return air for chunks that are not
/// resident. Anything above or below the world is air.
pub fn build_chunk_mesh<F>(buf: &ChunkBuf, world: &World, outside: F) -> ChunkMeshCPU
where
    F: Fn(i32, i32, i32) -> Voxel,
{
    let (base_x, base_z) = buf.origin();
    let (sx, sy, sz) = (buf.sx as i32, buf.sy as i32, buf.sz as i32);
    let mut opaque = MeshBuild::new();
    let mut translucent = MeshBuild::new();
    let mut stats = MeshStats::default();

    let neighbor = |x: i32, y: i32, z: i32| -> Voxel {
        if y < 0 || y >= sy {
            Voxel::Air
        } else if x >= 0 && x < sx && z >= 0 && z < sz {
            buf.get_local(x as usize, y as usize, z as usize)
        } else {
            outside(base_x + x, y, base_z + z)
        }
    };

    for y in 0..sy {
        for z in 0..sz {
            for x in 0..sx {
                let v = buf.get_local(x as usize, y as usize, z as usize);
                if v.is_air() {
                    continue;
                }
                stats.voxels_visited += 1;
                let around = Face::ALL.map(|f| {
                    let (dx, dy, dz) = f.delta();
                    neighbor(x + dx, y + dy, z + dz)
                });
                if !v.is_water() && around.iter().all(|n| n.is_solid()) {
                    stats.voxels_enclosed += 1;
                    continue;
                }
                let (wx, wz) = (base_x + x, base_z + z);
                let mut rgb = None;
                for (f, n) in Face::ALL.into_iter().zip(around) {
                    if !face_visible(v, n) {
                        continue;
                    }
                    let c = *rgb.get_or_insert_with(|| voxel_color(world, v, wx, y, wz));
                    let origin = [wx as f32, y as f32, wz as f32];
                    if v.is_water() {
                        translucent.add_face(f, origin, c);
                        stats.faces_translucent += 1;
                    } else {
                        opaque.add_face(f, origin, c);
                        stats.faces_opaque += 1;
                    }
                }
            }
        }
    }

    log::debug!(
        "meshed chunk ({}, {}): {} opaque / {} water faces, {} enclosed voxels skipped",
        buf.coord.cx,
        buf.coord.cz,
        stats.faces_opaque,
        stats.faces_translucent,
        stats.voxels_enclosed
    );
    ChunkMeshCPU {
        coord: buf.coord,
        opaque,
        translucent,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_world::ChunkCoord;

    fn tiny(blocks: &[(usize, usize, usize, Voxel)]) -> ChunkBuf {
        let mut buf =
            ChunkBuf::from_blocks_local(ChunkCoord::new(0, 0), 4, 4, 4, vec![Voxel::Air; 64]);
        for &(x, y, z, v) in blocks {
            buf.set_local(x, y, z, v);
        }
        buf
    }

    fn air(_: i32, _: i32, _: i32) -> Voxel {
        Voxel::Air
    }

    #[test]
    fn lone_solid_emits_six_faces() {
        let w = World::new("default");
        let m = build_chunk_mesh(&tiny(&[(1, 1, 1, Voxel::Stone)]), &w, air);
        assert_eq!(m.opaque.vertex_count(), 36);
        assert!(m.translucent.is_empty());
    }

    #[test]
    fn water_culls_against_water_and_solid() {
        let w = World::new("default");
        // Two waters side by side on a stone floor.
        let buf = tiny(&[
            (1, 1, 1, Voxel::Water),
            (2, 1, 1, Voxel::Water),
            (1, 0, 1, Voxel::Stone),
            (2, 0, 1, Voxel::Stone),
        ]);
        let m = build_chunk_mesh(&buf, &w, air);
        // Each water: 6 faces minus shared side minus floor = 4.
        assert_eq!(m.stats.faces_translucent, 8);
        // Each stone: 6 faces minus shared side; top faces are exposed to water.
        assert_eq!(m.stats.faces_opaque, 10);
    }

    #[test]
    fn border_reads_delegate_outside() {
        let w = World::new("default");
        let buf = tiny(&[(3, 1, 1, Voxel::Stone)]);
        let open = build_chunk_mesh(&buf, &w, air);
        let walled = build_chunk_mesh(&buf, &w, |x, _, _| {
            if x == 4 { Voxel::Dirt } else { Voxel::Air }
        });
        assert_eq!(open.stats.faces_opaque, 6);
        assert_eq!(walled.stats.faces_opaque, 5);
    }

    #[test]
    fn bottom_of_world_faces_air() {
        let w = World::new("default");
        let m = build_chunk_mesh(&tiny(&[(0, 0, 0, Voxel::Sand)]), &w, |_, _, _| Voxel::Stone);
        // -X and -Z neighbors are stone outside; -Y is below the world (air).
        assert_eq!(m.stats.faces_opaque, 4);
    }
}

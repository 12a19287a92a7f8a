use loam_geom::{Aabb, IVec3, Vec3};

/// Vertical water-surface displacement for renderers that animate the top
/// faces of the translucent stream.
#[inline]
pub fn wave_offset(x: f32, z: f32, t: f32) -> f32 {
    (x * 0.07 + t * 1.2).sin() * 0.04 + (z * 0.05 + t * 0.8).cos() * 0.04
}

const EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Line-list positions (24 vertices, 3 floats each) outlining a box.
pub fn wire_aabb_lines(b: Aabb) -> Vec<f32> {
    let (lo, hi) = (b.min, b.max);
    let p = [
        Vec3::new(lo.x, lo.y, lo.z),
        Vec3::new(hi.x, lo.y, lo.z),
        Vec3::new(hi.x, lo.y, hi.z),
        Vec3::new(lo.x, lo.y, hi.z),
        Vec3::new(lo.x, hi.y, lo.z),
        Vec3::new(hi.x, hi.y, lo.z),
        Vec3::new(hi.x, hi.y, hi.z),
        Vec3::new(lo.x, hi.y, hi.z),
    ];
    let mut out = Vec::with_capacity(EDGES.len() * 6);
    for (a, b) in EDGES {
        out.extend_from_slice(&[p[a].x, p[a].y, p[a].z, p[b].x, p[b].y, p[b].z]);
    }
    out
}

/// Outline of the unit voxel at `c`.
pub fn wire_cube_lines(c: IVec3) -> Vec<f32> {
    let min = Vec3::new(c.x as f32, c.y as f32, c.z as f32);
    wire_aabb_lines(Aabb::new(min, min + Vec3::new(1.0, 1.0, 1.0)))
}

use loam_geom::{IVec3, Vec3};

/// Upper bound on voxel steps per cast.
pub const MAX_STEPS: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RayHit {
    /// The voxel that stopped the ray.
    pub block: IVec3,
    /// The last empty voxel before `block`; where a placement would go.
    pub prev: IVec3,
    /// Outward normal of the entered face. Zero when the ray starts inside `block`.
    pub normal: IVec3,
}

#[inline]
fn inv_or_max(v: f32) -> f32 {
    if v.abs() < 1e-8 { f32::MAX } else { 1.0 / v.abs() }
}

#[inline]
fn step_of(v: f32) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Walks the voxel grid from `origin` along `dir` and returns the first voxel
/// for which `is_hit` holds, within `max_dist` and [`MAX_STEPS`] steps.
pub fn raycast_first_hit_with_face<F>(origin: Vec3, dir: Vec3, max_dist: f32, mut is_hit: F) -> Option<RayHit>
where
    F: FnMut(i32, i32, i32) -> bool,
{
    if dir.length() < 1e-6 {
        return None;
    }
    let d = dir.normalized();
    let mut v = origin.floor_cell();
    let step = IVec3::new(step_of(d.x), step_of(d.y), step_of(d.z));

    let inv = Vec3::new(inv_or_max(d.x), inv_or_max(d.y), inv_or_max(d.z));
    let tdx = if step.x == 0 { f32::MAX } else { inv.x };
    let tdy = if step.y == 0 { f32::MAX } else { inv.y };
    let tdz = if step.z == 0 { f32::MAX } else { inv.z };

    let boundary = |s: i32, o: f32, inv: f32| -> f32 {
        let f = o - o.floor();
        match s {
            1 => (1.0 - f) * inv,
            -1 => f * inv,
            _ => f32::MAX,
        }
    };
    let mut tmx = boundary(step.x, origin.x, inv.x);
    let mut tmy = boundary(step.y, origin.y, inv.y);
    let mut tmz = boundary(step.z, origin.z, inv.z);

    let mut prev = v;
    let mut normal = IVec3::ZERO;
    let mut t = 0.0f32;
    for _ in 0..MAX_STEPS {
        if t > max_dist {
            break;
        }
        if is_hit(v.x, v.y, v.z) {
            return Some(RayHit {
                block: v,
                prev,
                normal,
            });
        }
        prev = v;
        if tmx < tmy {
            if tmx < tmz {
                v.x += step.x;
                t = tmx;
                tmx += tdx;
                normal = IVec3::new(-step.x, 0, 0);
            } else {
                v.z += step.z;
                t = tmz;
                tmz += tdz;
                normal = IVec3::new(0, 0, -step.z);
            }
        } else if tmy < tmz {
            v.y += step.y;
            t = tmy;
            tmy += tdy;
            normal = IVec3::new(0, -step.y, 0);
        } else {
            v.z += step.z;
            t = tmz;
            tmz += tdz;
            normal = IVec3::new(0, 0, -step.z);
        }
    }
    None
}

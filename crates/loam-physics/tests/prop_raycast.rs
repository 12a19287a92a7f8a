use loam_geom::{IVec3, Vec3};
use loam_physics::raycast_first_hit_with_face;
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = i32> {
    -50i32..=50
}

fn offset() -> impl Strategy<Value = f32> {
    -20.0f32..20.0
}

proptest! {
    // A ray aimed at the center of a lone voxel from outside it hits that voxel,
    // and the cell before the hit is the one across the entry face
    #[test]
    fn aimed_ray_hits_lone_voxel(
        tx in coord(), ty in coord(), tz in coord(),
        ox in offset(), oy in offset(), oz in offset(),
    ) {
        prop_assume!(ox.abs().max(oy.abs()).max(oz.abs()) >= 1.5);
        let target = IVec3::new(tx, ty, tz);
        let off = Vec3::new(ox, oy, oz);
        let origin = target.center() + off;
        let hit = raycast_first_hit_with_face(origin, off * -1.0, off.length() + 1.0, |x, y, z| {
            IVec3::new(x, y, z) == target
        });
        let hit = hit.expect("ray should reach the target");
        prop_assert_eq!(hit.block, target);
        prop_assert_ne!(hit.normal, IVec3::ZERO);
        prop_assert_eq!(hit.prev, hit.block + hit.normal);
        let n = hit.normal;
        prop_assert_eq!(n.x.abs() + n.y.abs() + n.z.abs(), 1);
    }

    // Nothing solid within reach means no hit
    #[test]
    fn empty_space_never_hits(ox in offset(), oy in offset(), oz in offset(), dx in offset(), dy in offset(), dz in offset()) {
        let dir = Vec3::new(dx, dy, dz);
        prop_assume!(dir.length() > 1e-3);
        let hit = raycast_first_hit_with_face(Vec3::new(ox, oy, oz), dir, 16.0, |_, _, _| false);
        prop_assert!(hit.is_none());
    }
}

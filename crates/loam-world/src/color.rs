use loam_blocks::Voxel;

use crate::World;
use crate::biome::tint;
use crate::noise::hash3;

/// Final per-voxel color in `[0, 1]`: palette base, climate tint, then a
/// positional brightness jitter of `1 ± color_jitter`.
pub fn voxel_color(world: &World, v: Voxel, x: i32, y: i32, z: i32) -> [f32; 3] {
    let base = world.palette().base(v);
    let rgb = match v {
        Voxel::Grass | Voxel::Leaves | Voxel::Stone | Voxel::Sand => {
            tint(base, v, world.climate_at(x, z))
        }
        _ => base,
    };
    let amp = f64::from(world.config().color_jitter);
    let f = 1.0 + (hash3(x, y, z, world.seed()) - 0.5) * 2.0 * amp;
    rgb.map(|c| (f64::from(c) * f / 255.0).clamp(0.0, 1.0) as f32)
}

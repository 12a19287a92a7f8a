use serde::Deserialize;

use loam_geom::Vec3;
use loam_world::World;

use crate::mesh_build::MeshBuild;

#[derive(Clone, Debug, Deserialize)]
pub struct HorizonConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default = "default_step_deg")]
    pub step_deg: u32,
    #[serde(default = "default_inset")]
    pub inset: f32,
}

fn default_enabled() -> bool {
    true
}
fn default_radius() -> f32 {
    3072.0
}
fn default_step_deg() -> u32 {
    3
}
fn default_inset() -> f32 {
    64.0
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            radius: default_radius(),
            step_deg: default_step_deg(),
            inset: default_inset(),
        }
    }
}

fn surface(world: &World, x: f32, z: f32) -> f32 {
    (world.height_at(x.floor() as i32, z.floor() as i32) + 1) as f32
}

/// Coarse ring of terrain-following quads around `(cx, cz)`, one per angular
/// step, spanning `radius - inset` to `radius`. Flat-colored with `rgb` and
/// normal +Y. Empty when disabled or misconfigured.
pub fn build_horizon_ring(world: &World, cx: f32, cz: f32, cfg: &HorizonConfig, rgb: [f32; 3]) -> MeshBuild {
    let mut out = MeshBuild::new();
    if !cfg.enabled || cfg.step_deg == 0 || cfg.step_deg > 360 || cfg.radius <= cfg.inset {
        return out;
    }
    let (px, pz) = (cx.floor(), cz.floor());
    let outer = cfg.radius;
    let inner = cfg.radius - cfg.inset;
    let at = |deg: u32, r: f32| -> [f32; 3] {
        let a = (deg as f32).to_radians();
        let (x, z) = (px + a.sin() * r, pz + a.cos() * r);
        [x, surface(world, x, z), z]
    };
    let steps = 360 / cfg.step_deg;
    out.reserve_faces(steps as usize);
    for i in 0..steps {
        let a0 = i * cfg.step_deg;
        let a1 = a0 + cfg.step_deg;
        // outer a0, inner a0, inner a1, outer a1
        out.add_quad([at(a0, outer), at(a0, inner), at(a1, inner), at(a1, outer)], rgb, Vec3::UP);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_has_one_quad_per_step() {
        let w = World::new("default");
        let ring = build_horizon_ring(&w, 0.0, 0.0, &HorizonConfig::default(), [0.5, 0.6, 0.7]);
        assert_eq!(ring.vertex_count(), 120 * 6);
        for i in 0..ring.vertex_count() {
            assert_eq!(ring.normal(i), [0.0, 1.0, 0.0]);
            let p = ring.position(i);
            let r = (p[0] * p[0] + p[2] * p[2]).sqrt();
            assert!(r > 3072.0 - 64.0 - 1.0 && r < 3072.0 + 1.0);
        }
    }

    #[test]
    fn disabled_ring_is_empty() {
        let w = World::new("default");
        let cfg = HorizonConfig {
            enabled: false,
            ..HorizonConfig::default()
        };
        assert!(build_horizon_ring(&w, 0.0, 0.0, &cfg, [0.0; 3]).is_empty());
    }
}

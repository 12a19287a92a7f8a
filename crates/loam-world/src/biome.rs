use serde::Serialize;

use loam_blocks::{Rgb, Voxel};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Biome {
    Desert,
    Plains,
    Forest,
    Taiga,
    Tundra,
}

impl Biome {
    /// Threshold classification over temperature `t` and moisture `m`, both in `[0, 1]`.
    pub fn classify(t: f64, m: f64) -> Biome {
        if t > 0.7 && m < 0.35 {
            Biome::Desert
        } else if t < 0.25 && m < 0.35 {
            Biome::Tundra
        } else if t < 0.35 && m >= 0.35 {
            Biome::Taiga
        } else if m > 0.6 {
            Biome::Forest
        } else {
            Biome::Plains
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Biome::Desert => "desert",
            Biome::Plains => "plains",
            Biome::Forest => "forest",
            Biome::Taiga => "taiga",
            Biome::Tundra => "tundra",
        }
    }
}

/// Per-column climate sample.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Climate {
    pub temperature: f64,
    pub moisture: f64,
}

impl Climate {
    #[inline]
    pub fn biome(&self) -> Biome {
        Biome::classify(self.temperature, self.moisture)
    }
}

#[inline]
fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

fn mix(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let ch = |i: usize| {
        let (x, y) = (f64::from(a[i]), f64::from(b[i]));
        (x + (y - x) * t).round() as u8
    };
    [ch(0), ch(1), ch(2)]
}

/// Climate-driven recolor of `base`. Only grass, leaves, stone and sand are tinted.
pub fn tint(base: Rgb, v: Voxel, c: Climate) -> Rgb {
    let (t, m) = (c.temperature, c.moisture);
    match v {
        Voxel::Grass => {
            let g = mix([160, 140, 60], [80, 180, 80], clamp01(0.55 * m + 0.35 * t));
            if t < 0.3 {
                let cold = clamp01((0.3 - t) / 0.3);
                mix(g, [180, 200, 180], cold * 0.8)
            } else {
                g
            }
        }
        Voxel::Leaves => mix([100, 140, 60], [70, 170, 70], clamp01(0.6 * m + 0.2 * t)),
        Voxel::Stone => mix([105, 110, 120], [120, 115, 110], clamp01(t)),
        Voxel::Sand => mix([210, 205, 160], [230, 215, 165], clamp01(0.7 * t + 0.15 * m)),
        _ => base,
    }
}

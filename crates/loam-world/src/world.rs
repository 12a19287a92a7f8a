use loam_blocks::{Palette, Voxel};

use crate::biome::{Biome, Climate};
use crate::chunk_coord::ChunkCoord;
use crate::noise::{noise2, seed_from_name};
use crate::worldgen::WorldGenConfig;

/// Height and climate of one world column, computed once and reused for
/// every voxel in it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Column {
    pub height: i32,
    pub climate: Climate,
    pub biome: Biome,
}

/// Seeded terrain field. All sampling methods are pure.
#[derive(Clone, Debug)]
pub struct World {
    seed_name: String,
    seed: u32,
    cfg: WorldGenConfig,
    palette: Palette,
}

impl World {
    pub fn new(seed_name: &str) -> Self {
        Self {
            seed_name: seed_name.to_owned(),
            seed: seed_from_name(seed_name),
            cfg: WorldGenConfig::default(),
            palette: Palette::default(),
        }
    }

    pub fn with_config(seed_name: &str, cfg: WorldGenConfig) -> Result<Self, String> {
        cfg.validate()?;
        let palette = Palette::from_config(&cfg.palette).map_err(|e| e.to_string())?;
        Ok(Self {
            seed_name: seed_name.to_owned(),
            seed: seed_from_name(seed_name),
            cfg,
            palette,
        })
    }

    /// Same parameters under a different seed.
    pub fn reseeded(&self, seed_name: &str) -> Self {
        Self {
            seed_name: seed_name.to_owned(),
            seed: seed_from_name(seed_name),
            cfg: self.cfg.clone(),
            palette: self.palette.clone(),
        }
    }

    #[inline]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    #[inline]
    pub fn seed_name(&self) -> &str {
        &self.seed_name
    }

    #[inline]
    pub fn config(&self) -> &WorldGenConfig {
        &self.cfg
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.cfg.chunk_size
    }

    #[inline]
    pub fn world_height(&self) -> usize {
        self.cfg.world_height
    }

    #[inline]
    pub fn water_level(&self) -> i32 {
        self.cfg.water_level
    }

    #[inline]
    pub fn y_in_range(&self, y: i32) -> bool {
        y >= 0 && (y as usize) < self.cfg.world_height
    }

    #[inline]
    pub fn chunk_of(&self, x: i32, z: i32) -> ChunkCoord {
        ChunkCoord::containing(x, z, self.cfg.chunk_size)
    }

    /// Local x/z of a world column inside its chunk.
    #[inline]
    pub fn local_of(&self, x: i32, z: i32) -> (usize, usize) {
        let s = self.cfg.chunk_size as i32;
        (x.rem_euclid(s) as usize, z.rem_euclid(s) as usize)
    }

    #[inline]
    fn n(&self, x: f64, z: f64) -> f64 {
        noise2(x, z, self.seed)
    }

    /// Surface height of column `(x, z)`, in `[0, world_height - 2]`.
    pub fn height_at(&self, x: i32, z: i32) -> i32 {
        let (x, z) = (f64::from(x), f64::from(z));
        let base = self.n(x * 0.001875, z * 0.001875);
        let ridge = 1.0 - (2.0 * self.n(x * 0.00375 + 100.0, z * 0.00375 - 100.0) - 1.0).abs();
        let mut h = 10.0 + (0.5 * base + 0.5 * ridge).powf(1.55) * 110.0;
        h += (self.n(x * 0.012, z * 0.012) - 0.5) * 10.0;
        h += (1.0 - (2.0 * self.n(x * 0.022 + 200.0, z * 0.022 + 200.0) - 1.0).abs()) * 5.0 - 2.5;
        let top = self.cfg.world_height as f64 - 2.0;
        h.floor().clamp(0.0, top) as i32
    }

    fn temperature_with_height(&self, x: i32, z: i32, height: i32) -> f64 {
        let s = f64::from(self.seed) * 0.001;
        let (x, z) = (f64::from(x), f64::from(z));
        let base = self.n(x * 0.008 + s, z * 0.008 - s);
        let mid = self.n(x * 0.03 + 100.123, z * 0.03 - 55.321);
        let alt = f64::from(height) / self.cfg.world_height as f64;
        (0.7 * base + 0.3 * mid - 0.6 * alt).clamp(0.0, 1.0)
    }

    fn moisture_with_height(&self, x: i32, z: i32, height: i32) -> f64 {
        let s = f64::from(self.seed) * 0.001;
        let (x, z) = (f64::from(x), f64::from(z));
        let base = self.n(x * 0.005 - s, z * 0.005 + s);
        let mid = self.n(x * 0.02 + 333.77, z * 0.02 - 987.11);
        let mut m = 0.6 * base + 0.4 * mid;
        if height < self.cfg.water_level + 2 {
            m += 0.25;
        }
        m.clamp(0.0, 1.0)
    }

    pub fn temperature_at(&self, x: i32, z: i32) -> f64 {
        self.temperature_with_height(x, z, self.height_at(x, z))
    }

    pub fn moisture_at(&self, x: i32, z: i32) -> f64 {
        self.moisture_with_height(x, z, self.height_at(x, z))
    }

    pub fn climate_at(&self, x: i32, z: i32) -> Climate {
        self.column(x, z).climate
    }

    pub fn biome_at(&self, x: i32, z: i32) -> Biome {
        self.column(x, z).biome
    }

    pub fn column(&self, x: i32, z: i32) -> Column {
        let height = self.height_at(x, z);
        let climate = Climate {
            temperature: self.temperature_with_height(x, z, height),
            moisture: self.moisture_with_height(x, z, height),
        };
        Column {
            height,
            climate,
            biome: climate.biome(),
        }
    }

    /// Layering rule for one voxel of a sampled column.
    pub fn voxel_in_column(&self, col: &Column, y: i32) -> Voxel {
        if !self.y_in_range(y) {
            return Voxel::Air;
        }
        let hh = col.height;
        let wl = self.cfg.water_level;
        if y <= hh {
            if hh < wl + self.cfg.beach.band {
                return if y > hh - self.cfg.beach.sand_depth {
                    Voxel::Sand
                } else {
                    Voxel::Stone
                };
            }
            let desert = col.biome == Biome::Desert;
            if y == hh {
                if hh >= self.cfg.snow_line {
                    Voxel::Snow
                } else if desert {
                    Voxel::Sand
                } else {
                    Voxel::Grass
                }
            } else if y > hh - self.cfg.topsoil_depth {
                if desert { Voxel::Sand } else { Voxel::Dirt }
            } else {
                Voxel::Stone
            }
        } else if y < wl {
            Voxel::Water
        } else {
            Voxel::Air
        }
    }

    /// Generated (unedited) voxel at a world position.
    pub fn generated_voxel(&self, x: i32, y: i32, z: i32) -> Voxel {
        if !self.y_in_range(y) {
            return Voxel::Air;
        }
        self.voxel_in_column(&self.column(x, z), y)
    }
}

use serde::Deserialize;
use std::fs;
use std::path::Path;

use loam_blocks::PaletteConfig;

#[derive(Clone, Debug, Deserialize)]
pub struct WorldGenConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_world_height")]
    pub world_height: usize,
    #[serde(default = "default_water_level")]
    pub water_level: i32,
    #[serde(default = "default_snow_line")]
    pub snow_line: i32,
    #[serde(default)]
    pub beach: Beach,
    #[serde(default = "default_topsoil")]
    pub topsoil_depth: i32,
    #[serde(default = "default_jitter")]
    pub color_jitter: f32,
    #[serde(default)]
    pub palette: PaletteConfig,
}

fn default_chunk_size() -> usize {
    32
}
fn default_world_height() -> usize {
    256
}
fn default_water_level() -> i32 {
    40
}
fn default_snow_line() -> i32 {
    90
}
fn default_topsoil() -> i32 {
    3
}
fn default_jitter() -> f32 {
    0.12
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            world_height: default_world_height(),
            water_level: default_water_level(),
            snow_line: default_snow_line(),
            beach: Beach::default(),
            topsoil_depth: default_topsoil(),
            color_jitter: default_jitter(),
            palette: PaletteConfig::default(),
        }
    }
}

/// Columns whose surface sits below `water_level + band` become sandy shore.
#[derive(Clone, Debug, Deserialize)]
pub struct Beach {
    #[serde(default = "default_beach_band")]
    pub band: i32,
    #[serde(default = "default_beach_sand_depth")]
    pub sand_depth: i32,
}
fn default_beach_band() -> i32 {
    3
}
fn default_beach_sand_depth() -> i32 {
    2
}
impl Default for Beach {
    fn default() -> Self {
        Self {
            band: default_beach_band(),
            sand_depth: default_beach_sand_depth(),
        }
    }
}

impl WorldGenConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be positive".into());
        }
        if self.world_height < 2 || self.world_height > i32::MAX as usize {
            return Err(format!("world_height {} out of range", self.world_height));
        }
        if self.water_level < 0 || self.water_level >= self.world_height as i32 {
            return Err(format!(
                "water_level {} outside [0, {})",
                self.water_level, self.world_height
            ));
        }
        if !(0.0..=1.0).contains(&self.color_jitter) {
            return Err(format!("color_jitter {} outside [0, 1]", self.color_jitter));
        }
        Ok(())
    }
}

pub fn load_config_from_str(s: &str) -> Result<WorldGenConfig, String> {
    let cfg: WorldGenConfig = toml::from_str(s).map_err(|e| format!("worldgen config: {e}"))?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_config_from_path(path: &Path) -> Result<WorldGenConfig, String> {
    let s = fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))?;
    load_config_from_str(&s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = load_config_from_str("").unwrap();
        assert_eq!(cfg.chunk_size, 32);
        assert_eq!(cfg.world_height, 256);
        assert_eq!(cfg.water_level, 40);
        assert_eq!(cfg.beach.band, 3);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg = load_config_from_str("water_level = 60\n[beach]\nband = 5\n").unwrap();
        assert_eq!(cfg.water_level, 60);
        assert_eq!(cfg.beach.band, 5);
        assert_eq!(cfg.beach.sand_depth, 2);
        assert_eq!(cfg.snow_line, 90);
    }

    #[test]
    fn water_above_world_is_rejected() {
        assert!(load_config_from_str("world_height = 64\nwater_level = 64\n").is_err());
    }
}

use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::types::Voxel;

pub type Rgb = [u8; 3];

/// Base (untinted) color per voxel id, 0..=255 per channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; Voxel::COUNT],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: [
                [0, 0, 0],
                [95, 159, 53],
                [134, 96, 67],
                [112, 112, 112],
                [219, 211, 160],
                [64, 96, 255],
                [102, 81, 52],
                [76, 128, 76],
                [240, 248, 255],
            ],
        }
    }
}

impl Palette {
    #[inline]
    pub fn base(&self, v: Voxel) -> Rgb {
        self.colors[v.id() as usize]
    }

    pub fn set(&mut self, v: Voxel, rgb: Rgb) {
        self.colors[v.id() as usize] = rgb;
    }

    /// Default palette with the overrides from `cfg` applied. Unknown voxel names are an error.
    pub fn from_config(cfg: &PaletteConfig) -> Result<Self, Box<dyn Error>> {
        let mut palette = Palette::default();
        let mut names: Vec<(&String, &Rgb)> = cfg.colors.iter().collect();
        names.sort_by(|a, b| a.0.cmp(b.0));
        for (name, rgb) in names {
            let v = Voxel::from_name(name).ok_or_else(|| format!("unknown voxel '{name}'"))?;
            palette.set(v, *rgb);
        }
        Ok(palette)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: PaletteConfig = toml::from_str(toml_str)?;
        Self::from_config(&cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

// --- Config ---

// colors = { grass = [90, 150, 50], water = [40, 80, 230] }
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PaletteConfig {
    #[serde(default)]
    pub colors: HashMap<String, Rgb>,
}

use std::fs;
use std::path::{Path, PathBuf};

use loam_mesh_cpu::HorizonConfig;
use loam_physics::WalkerParams;
use loam_runtime::StreamConfig;
use loam_world::WorldGenConfig;
use serde::Deserialize;

/// Everything the binary reads from its TOML file. Command-line flags win
/// over file values.
#[derive(Clone, Debug, Deserialize)]
pub struct LoamConfig {
    #[serde(default = "default_seed")]
    pub seed: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub worldgen: WorldGenConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub walker: WalkerParams,
    #[serde(default)]
    pub horizon: HorizonConfig,
}

fn default_seed() -> String {
    "default".to_string()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("loam_data")
}

impl Default for LoamConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            data_dir: default_data_dir(),
            worldgen: WorldGenConfig::default(),
            stream: StreamConfig::default(),
            walker: WalkerParams::default(),
            horizon: HorizonConfig::default(),
        }
    }
}

impl LoamConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.worldgen.validate()?;
        self.stream.validate().map_err(|e| format!("stream: {e}"))?;
        self.walker.validate().map_err(|e| format!("walker: {e}"))?;
        Ok(())
    }
}

pub fn load_config_from_str(s: &str) -> Result<LoamConfig, String> {
    let cfg: LoamConfig = toml::from_str(s).map_err(|e| format!("config: {e}"))?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_config_from_path(path: &Path) -> Result<LoamConfig, String> {
    let s = fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))?;
    load_config_from_str(&s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = load_config_from_str("").unwrap();
        assert_eq!(cfg.seed, "default");
        assert_eq!(cfg.data_dir, PathBuf::from("loam_data"));
        assert_eq!(cfg.stream, StreamConfig::default());
        assert_eq!(cfg.worldgen.chunk_size, 32);
    }

    #[test]
    fn sections_override_fields() {
        let cfg = load_config_from_str(
            r#"
            seed = "mesa"
            [stream]
            view_radius = 6
            [worldgen]
            water_level = 30
            [walker]
            jump_m = 1.5
            [horizon]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.seed, "mesa");
        assert_eq!(cfg.stream.view_radius, 6);
        assert_eq!(cfg.stream.build_budget, 4);
        assert_eq!(cfg.worldgen.water_level, 30);
        assert!((cfg.walker.jump_m - 1.5).abs() < 1e-6);
        assert!(!cfg.horizon.enabled);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(load_config_from_str("[stream]\nview_radius = 40").is_err());
        assert!(load_config_from_str("[worldgen]\nwater_level = 999").is_err());
        assert!(load_config_from_str("seed = 3").is_err());
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loam.toml");
        fs::write(&path, "seed = \"disk\"\n").unwrap();
        assert_eq!(load_config_from_path(&path).unwrap().seed, "disk");
        assert!(load_config_from_path(&dir.path().join("missing.toml")).is_err());
    }
}

use serde::Deserialize;

/// Streaming, rebuild and persistence knobs for a [`crate::WorldSession`].
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StreamConfig {
    /// Square load radius in chunks around the camera chunk.
    #[serde(default = "default_view_radius")]
    pub view_radius: i32,
    #[serde(default = "default_min_radius")]
    pub min_radius: i32,
    #[serde(default = "default_max_radius")]
    pub max_radius: i32,
    /// Chunks generated and meshed per tick.
    #[serde(default = "default_build_budget")]
    pub build_budget: usize,
    /// Chunks beyond `view_radius + evict_margin` on either axis are evicted.
    #[serde(default = "default_evict_margin")]
    pub evict_margin: i32,
    /// Seconds between eviction scans.
    #[serde(default = "default_prune_interval")]
    pub prune_interval: f32,
    /// Seam re-meshes per tick after neighbors arrive.
    #[serde(default = "default_remesh_budget")]
    pub remesh_budget: usize,
    /// Seconds of quiet after the last mutation before the edit table is written.
    #[serde(default = "default_save_debounce")]
    pub save_debounce: f32,
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    /// Generation threads; 0 lets rayon pick.
    #[serde(default)]
    pub worker_threads: usize,
}

fn default_view_radius() -> i32 {
    4
}
fn default_min_radius() -> i32 {
    2
}
fn default_max_radius() -> i32 {
    16
}
fn default_build_budget() -> usize {
    4
}
fn default_evict_margin() -> i32 {
    2
}
fn default_prune_interval() -> f32 {
    1.0
}
fn default_remesh_budget() -> usize {
    8
}
fn default_save_debounce() -> f32 {
    0.5
}
fn default_history_cap() -> usize {
    1000
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            view_radius: default_view_radius(),
            min_radius: default_min_radius(),
            max_radius: default_max_radius(),
            build_budget: default_build_budget(),
            evict_margin: default_evict_margin(),
            prune_interval: default_prune_interval(),
            remesh_budget: default_remesh_budget(),
            save_debounce: default_save_debounce(),
            history_cap: default_history_cap(),
            worker_threads: 0,
        }
    }
}

impl StreamConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.min_radius < 0 || self.min_radius > self.max_radius {
            return Err(format!(
                "radius bounds [{}, {}] are empty",
                self.min_radius, self.max_radius
            ));
        }
        if !(self.min_radius..=self.max_radius).contains(&self.view_radius) {
            return Err(format!(
                "view_radius {} outside [{}, {}]",
                self.view_radius, self.min_radius, self.max_radius
            ));
        }
        if self.build_budget == 0 {
            return Err("build_budget must be at least 1".into());
        }
        if self.evict_margin < 0 {
            return Err("evict_margin must not be negative".into());
        }
        if !(self.prune_interval >= 0.0 && self.save_debounce >= 0.0) {
            return Err("prune_interval and save_debounce must not be negative".into());
        }
        if self.history_cap == 0 {
            return Err("history_cap must be at least 1".into());
        }
        Ok(())
    }

    #[inline]
    pub fn clamp_radius(&self, r: i32) -> i32 {
        r.clamp(self.min_radius, self.max_radius)
    }

    /// Chebyshev distance past which resident chunks are evicted.
    #[inline]
    pub fn evict_distance(&self, radius: i32) -> i32 {
        radius + self.evict_margin
    }
}

use serde::Deserialize;

use loam_blocks::Voxel;
use loam_geom::{Aabb, Vec3};

/// Body dimensions and movement tuning. Lengths are in blocks; speeds and
/// accelerations are given in meters and converted with `block_size_m`.
#[derive(Clone, Debug, Deserialize)]
pub struct WalkerParams {
    #[serde(default = "default_block_size_m")]
    pub block_size_m: f32,
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default = "default_height")]
    pub height: f32,
    #[serde(default = "default_eye_height")]
    pub eye_height: f32,
    #[serde(default = "default_walk_mps")]
    pub walk_mps: f32,
    #[serde(default = "default_fly_mps")]
    pub fly_mps: f32,
    #[serde(default = "default_sprint")]
    pub sprint_mult: f32,
    #[serde(default = "default_gravity_mps2")]
    pub gravity_mps2: f32,
    #[serde(default = "default_jump_m")]
    pub jump_m: f32,
    #[serde(default = "default_max_step_up")]
    pub max_step_up: f32,
    #[serde(default = "default_step_increment")]
    pub step_increment: f32,
    #[serde(default = "default_max_step_down")]
    pub max_step_down: f32,
    #[serde(default = "default_ground_snap")]
    pub ground_snap: f32,
    #[serde(default = "default_nudge")]
    pub nudge: f32,
    #[serde(default = "default_max_dt")]
    pub max_dt: f32,
}

fn default_block_size_m() -> f32 {
    0.33
}
fn default_radius() -> f32 {
    1.1
}
fn default_height() -> f32 {
    6.0
}
fn default_eye_height() -> f32 {
    5.9
}
fn default_walk_mps() -> f32 {
    4.0
}
fn default_fly_mps() -> f32 {
    12.0
}
fn default_sprint() -> f32 {
    1.7
}
fn default_gravity_mps2() -> f32 {
    9.8
}
fn default_jump_m() -> f32 {
    1.2
}
fn default_max_step_up() -> f32 {
    1.0
}
fn default_step_increment() -> f32 {
    0.25
}
fn default_max_step_down() -> f32 {
    0.5
}
fn default_ground_snap() -> f32 {
    0.25
}
fn default_nudge() -> f32 {
    0.05
}
fn default_max_dt() -> f32 {
    0.05
}

impl Default for WalkerParams {
    fn default() -> Self {
        Self {
            block_size_m: default_block_size_m(),
            radius: default_radius(),
            height: default_height(),
            eye_height: default_eye_height(),
            walk_mps: default_walk_mps(),
            fly_mps: default_fly_mps(),
            sprint_mult: default_sprint(),
            gravity_mps2: default_gravity_mps2(),
            jump_m: default_jump_m(),
            max_step_up: default_max_step_up(),
            step_increment: default_step_increment(),
            max_step_down: default_max_step_down(),
            ground_snap: default_ground_snap(),
            nudge: default_nudge(),
            max_dt: default_max_dt(),
        }
    }
}

impl WalkerParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.block_size_m <= 0.0 {
            return Err("block_size_m must be positive".into());
        }
        if self.radius <= 0.0 || self.height <= 0.0 {
            return Err("radius and height must be positive".into());
        }
        if self.eye_height > self.height {
            return Err("eye_height exceeds body height".into());
        }
        if self.step_increment <= 0.0 {
            return Err("step_increment must be positive".into());
        }
        Ok(())
    }

    /// Walk speed in blocks per second.
    #[inline]
    pub fn walk_speed(&self) -> f32 {
        self.walk_mps / self.block_size_m
    }

    #[inline]
    pub fn fly_speed(&self) -> f32 {
        self.fly_mps / self.block_size_m
    }

    /// Signed vertical acceleration in blocks/s² (negative).
    #[inline]
    pub fn gravity(&self) -> f32 {
        -self.gravity_mps2 / self.block_size_m
    }

    /// Launch velocity that peaks `jump_m` meters above the takeoff point.
    #[inline]
    pub fn jump_velocity(&self) -> f32 {
        (2.0 * (self.jump_m / self.block_size_m) * -self.gravity()).max(0.0).sqrt()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum MoveMode {
    #[default]
    Fly,
    Walk,
}

/// One frame of movement intent. Axes are in `[-1, 1]`: `forward` along the
/// view yaw, `strafe` toward the right, `vertical` up (fly mode only).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MoveInput {
    pub forward: f32,
    pub strafe: f32,
    pub vertical: f32,
    pub jump: bool,
    pub sprint: bool,
}

#[derive(Debug, Clone)]
pub struct Walker {
    pub pos: Vec3, // feet position (x,z at center, y at feet)
    pub vel: Vec3,
    pub on_ground: bool,
    pub yaw: f32,   // radians, 0 looks down +Z
    pub pitch: f32, // radians, positive looks down
    pub mode: MoveMode,
    pub params: WalkerParams,
}

const FEET_EPS: f32 = 1e-4;
const HEAD_EPS: f32 = 1e-3;
const MAX_VERTICAL_SUBSTEPS: usize = 8;

#[inline]
fn solid(v: Voxel) -> bool {
    v.is_solid()
}

impl Walker {
    pub fn new(feet: Vec3, params: WalkerParams) -> Self {
        Self {
            pos: feet,
            vel: Vec3::ZERO,
            on_ground: false,
            yaw: 0.0,
            pitch: 0.0,
            mode: MoveMode::Fly,
            params,
        }
    }

    pub fn eye_position(&self) -> Vec3 {
        Vec3::new(self.pos.x, self.pos.y + self.params.eye_height, self.pos.z)
    }

    pub fn set_eye_position(&mut self, eye: Vec3) {
        self.pos = Vec3::new(eye.x, eye.y - self.params.eye_height, eye.z);
    }

    pub fn view_dir(&self) -> Vec3 {
        Vec3::from_pitch_yaw(self.pitch, self.yaw)
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_feet(self.pos, self.params.radius, self.params.height)
    }

    pub fn toggle_mode(&mut self) -> MoveMode {
        self.mode = match self.mode {
            MoveMode::Fly => MoveMode::Walk,
            MoveMode::Walk => MoveMode::Fly,
        };
        self.vel = Vec3::ZERO;
        self.on_ground = false;
        self.mode
    }

    /// Whether the body box with feet at `(x, feet, z)` overlaps a solid voxel.
    /// The feet plane and the cell right above the head are excluded by small epsilons.
    pub fn aabb_blocked<F>(&self, sample: &F, x: f32, feet: f32, z: f32) -> bool
    where
        F: Fn(i32, i32, i32) -> Voxel,
    {
        let b = Aabb::from_feet(Vec3::new(x, feet, z), self.params.radius, self.params.height)
            .inset_y(FEET_EPS, HEAD_EPS);
        b.voxel_span().cells().any(|c| solid(sample(c.x, c.y, c.z)))
    }

    /// Highest solid-below / open-at transition under the center and the four
    /// cardinal footprint edges, scanning from `floor(guess) + 2` down six cells.
    pub fn surface_below<F>(&self, sample: &F, x: f32, z: f32, guess: f32) -> Option<i32>
    where
        F: Fn(i32, i32, i32) -> Voxel,
    {
        let r = self.params.radius;
        let offsets = [(0.0, 0.0), (r, 0.0), (-r, 0.0), (0.0, r), (0.0, -r)];
        let y0 = guess.floor() as i32 + 2;
        let mut best: Option<i32> = None;
        for (ox, oz) in offsets {
            let (cx, cz) = ((x + ox).floor() as i32, (z + oz).floor() as i32);
            for y in (y0 - 6..=y0).rev() {
                if solid(sample(cx, y - 1, cz)) && !solid(sample(cx, y, cz)) {
                    best = Some(best.map_or(y, |b| b.max(y)));
                    break;
                }
            }
        }
        best
    }

    fn ceiling_blocked<F>(&self, sample: &F, x: f32, cell_y: i32, z: f32) -> bool
    where
        F: Fn(i32, i32, i32) -> Voxel,
    {
        let r = self.params.radius;
        let (x0, x1) = ((x - r).floor() as i32, (x + r).floor() as i32);
        let (z0, z1) = ((z - r).floor() as i32, (z + r).floor() as i32);
        (z0..=z1).any(|bz| (x0..=x1).any(|bx| solid(sample(bx, cell_y, bz))))
    }

    fn wish_dir(&self, input: &MoveInput) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let forward = Vec3::new(sy, 0.0, cy);
        let right = Vec3::new(-cy, 0.0, sy);
        let wish = forward * input.forward + right * input.strafe;
        if wish.horizontal_length() > 0.0 {
            wish.normalized()
        } else {
            Vec3::ZERO
        }
    }

    /// Advances the body by `dt` seconds (clamped to `max_dt`).
    pub fn update<F>(&mut self, sample: &F, dt: f32, input: &MoveInput)
    where
        F: Fn(i32, i32, i32) -> Voxel,
    {
        let dt = dt.clamp(0.0, self.params.max_dt);
        if dt == 0.0 {
            return;
        }
        match self.mode {
            MoveMode::Fly => self.update_fly(dt, input),
            MoveMode::Walk => self.update_walk(sample, dt, input),
        }
    }

    fn update_fly(&mut self, dt: f32, input: &MoveInput) {
        let mut speed = self.params.fly_speed();
        if input.sprint {
            speed *= self.params.sprint_mult;
        }
        let wish = self.wish_dir(input) * speed;
        self.vel = Vec3::new(wish.x, input.vertical.clamp(-1.0, 1.0) * speed, wish.z);
        self.pos += self.vel * dt;
        self.on_ground = false;
    }

    fn update_walk<F>(&mut self, sample: &F, dt: f32, input: &MoveInput)
    where
        F: Fn(i32, i32, i32) -> Voxel,
    {
        let p = self.params.clone();
        let mut speed = p.walk_speed();
        if input.sprint {
            speed *= p.sprint_mult;
        }
        let wish = self.wish_dir(input) * speed;
        self.vel.x = wish.x;
        self.vel.z = wish.z;
        if input.jump && self.on_ground {
            self.vel.y = p.jump_velocity();
            self.on_ground = false;
        }
        self.vel.y += p.gravity() * dt;

        self.resolve_vertical(sample, dt);
        self.resolve_horizontal(sample, dt);
        self.nudge_out(sample);
    }

    fn resolve_vertical<F>(&mut self, sample: &F, dt: f32)
    where
        F: Fn(i32, i32, i32) -> Voxel,
    {
        let (snap, height) = (self.params.ground_snap, self.params.height);
        let dy = self.vel.y * dt;
        let n = (dy.abs().ceil() as usize).clamp(1, MAX_VERTICAL_SUBSTEPS);
        let sub = dy / n as f32;
        for _ in 0..n {
            let next = self.pos.y + sub;
            let surf = self.surface_below(sample, self.pos.x, self.pos.z, next);
            if let Some(s) = surf {
                if next - (s as f32) < snap && self.vel.y <= 0.0 {
                    self.on_ground = true;
                    self.vel.y = 0.0;
                    self.pos.y = s as f32 + FEET_EPS;
                    return;
                }
            }
            self.on_ground = false;
            let head = next + height;
            let above = (head + FEET_EPS).floor() as i32;
            if head > above as f32 + FEET_EPS && self.ceiling_blocked(sample, self.pos.x, above, self.pos.z) {
                self.vel.y = self.vel.y.min(0.0);
                self.pos.y = above as f32 - height - FEET_EPS;
                return;
            }
            self.pos.y = next;
        }
    }

    /// Tries a move along one horizontal axis with step-up (grounded only),
    /// then step-down. Returns false when the axis stays blocked.
    fn try_axis<F>(&mut self, sample: &F, to_x: f32, to_z: f32) -> bool
    where
        F: Fn(i32, i32, i32) -> Voxel,
    {
        let feet = self.pos.y;
        if !self.aabb_blocked(sample, to_x, feet, to_z) {
            self.pos.x = to_x;
            self.pos.z = to_z;
            return true;
        }
        if self.on_ground {
            let mut s = self.params.step_increment;
            while s <= self.params.max_step_up + 1e-6 {
                if !self.aabb_blocked(sample, to_x, feet + s, to_z) {
                    self.pos = Vec3::new(to_x, feet + s, to_z);
                    return true;
                }
                s += self.params.step_increment;
            }
        }
        let down = self.params.max_step_down;
        if down > 0.0 && !self.aabb_blocked(sample, to_x, feet - down, to_z) {
            self.pos = Vec3::new(to_x, feet - down, to_z);
            return true;
        }
        false
    }

    fn resolve_horizontal<F>(&mut self, sample: &F, dt: f32)
    where
        F: Fn(i32, i32, i32) -> Voxel,
    {
        if self.vel.x != 0.0 && !self.try_axis(sample, self.pos.x + self.vel.x * dt, self.pos.z) {
            self.vel.x = 0.0;
        }
        if self.vel.z != 0.0 && !self.try_axis(sample, self.pos.x, self.pos.z + self.vel.z * dt) {
            self.vel.z = 0.0;
        }
    }

    fn nudge_out<F>(&mut self, sample: &F)
    where
        F: Fn(i32, i32, i32) -> Voxel,
    {
        let (x, feet, z) = (self.pos.x, self.pos.y, self.pos.z);
        if !self.aabb_blocked(sample, x, feet, z) {
            return;
        }
        let n = self.params.nudge;
        if !self.aabb_blocked(sample, x + n, feet, z) {
            self.pos.x += n;
        } else if !self.aabb_blocked(sample, x - n, feet, z) {
            self.pos.x -= n;
        }
        let x = self.pos.x;
        if !self.aabb_blocked(sample, x, feet, z + n) {
            self.pos.z += n;
        } else if !self.aabb_blocked(sample, x, feet, z - n) {
            self.pos.z -= n;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Solid floor with its top surface at y = 10.
    fn floor(_: i32, y: i32, _: i32) -> Voxel {
        if y < 10 { Voxel::Stone } else { Voxel::Air }
    }

    #[test]
    fn derived_speeds() {
        let p = WalkerParams::default();
        assert!((p.walk_speed() - 4.0 / 0.33).abs() < 1e-4);
        assert!((p.gravity() + 9.8 / 0.33).abs() < 1e-4);
        let v = p.jump_velocity();
        // Apex height v^2 / 2g equals the jump height in blocks.
        assert!((v * v / (2.0 * -p.gravity()) - 1.2 / 0.33).abs() < 1e-3);
    }

    #[test]
    fn aabb_ignores_feet_plane() {
        let w = Walker::new(Vec3::ZERO, WalkerParams::default());
        assert!(!w.aabb_blocked(&floor, 0.5, 10.0, 0.5));
        assert!(w.aabb_blocked(&floor, 0.5, 9.9, 0.5));
    }

    #[test]
    fn surface_found_under_footprint_edge() {
        // Single pillar under the +X edge only.
        let pillar = |x: i32, y: i32, z: i32| {
            if x == 1 && z == 0 && y < 20 { Voxel::Stone } else { Voxel::Air }
        };
        let w = Walker::new(Vec3::ZERO, WalkerParams::default());
        assert_eq!(w.surface_below(&pillar, 0.5, 0.5, 20.0), Some(20));
        assert_eq!(w.surface_below(&pillar, -5.0, 0.5, 20.0), None);
    }

    #[test]
    fn fly_moves_without_collision() {
        let mut w = Walker::new(Vec3::new(0.5, 5.0, 0.5), WalkerParams::default());
        let input = MoveInput {
            forward: 1.0,
            ..MoveInput::default()
        };
        w.update(&floor, 0.05, &input);
        assert!(w.pos.z > 0.5);
        assert_eq!(w.pos.y, 5.0);
    }

    #[test]
    fn water_does_not_support() {
        let pool = |_: i32, y: i32, _: i32| {
            if y < 5 {
                Voxel::Stone
            } else if y < 10 {
                Voxel::Water
            } else {
                Voxel::Air
            }
        };
        let mut w = Walker::new(Vec3::new(0.5, 10.5, 0.5), WalkerParams::default());
        w.mode = MoveMode::Walk;
        for _ in 0..200 {
            w.update(&pool, 0.05, &MoveInput::default());
        }
        assert!((w.pos.y - 5.0).abs() < 1e-3);
        assert!(w.on_ground);
    }
}

use loam_blocks::Voxel;
use loam_geom::Vec3;
use loam_physics::{MoveInput, MoveMode, Walker, WalkerParams};

const DT: f32 = 0.05;

fn walking(feet: Vec3) -> Walker {
    let mut w = Walker::new(feet, WalkerParams::default());
    w.mode = MoveMode::Walk;
    w
}

fn settle<F: Fn(i32, i32, i32) -> Voxel>(w: &mut Walker, world: &F, frames: usize, input: MoveInput) {
    for _ in 0..frames {
        w.update(world, DT, &input);
    }
}

fn flat(_: i32, y: i32, _: i32) -> Voxel {
    if y < 10 { Voxel::Stone } else { Voxel::Air }
}

#[test]
fn dropped_body_rests_on_platform() {
    let mut w = walking(Vec3::new(0.5, 30.0, 0.5));
    settle(&mut w, &flat, 100, MoveInput::default());
    assert!(w.on_ground);
    assert_eq!(w.vel.y, 0.0);
    assert!((w.pos.y - 10.0).abs() < 1e-3, "feet at {}", w.pos.y);
}

#[test]
fn walks_up_a_one_block_ledge() {
    let ledge = |x: i32, y: i32, _: i32| {
        if y < 10 || (x >= 5 && y < 11) { Voxel::Stone } else { Voxel::Air }
    };
    let mut w = walking(Vec3::new(1.5, 10.0001, 0.5));
    settle(&mut w, &ledge, 5, MoveInput::default());
    assert!(w.on_ground);
    w.yaw = std::f32::consts::FRAC_PI_2;
    let fwd = MoveInput {
        forward: 1.0,
        ..MoveInput::default()
    };
    settle(&mut w, &ledge, 30, fwd);
    assert!(w.pos.x > 7.0, "x = {}", w.pos.x);
    assert!((w.pos.y - 11.0).abs() < 1e-3, "feet at {}", w.pos.y);
}

#[test]
fn tall_wall_blocks_and_zeroes_velocity() {
    let wall = |x: i32, y: i32, _: i32| {
        if y < 10 || (x >= 5 && y < 13) { Voxel::Stone } else { Voxel::Air }
    };
    let mut w = walking(Vec3::new(1.5, 10.0001, 0.5));
    w.yaw = std::f32::consts::FRAC_PI_2;
    let fwd = MoveInput {
        forward: 1.0,
        ..MoveInput::default()
    };
    settle(&mut w, &wall, 40, fwd);
    assert!(w.pos.x + w.params.radius <= 5.0 + 1e-3, "x = {}", w.pos.x);
    assert_eq!(w.vel.x, 0.0);
    assert!((w.pos.y - 10.0).abs() < 1e-3);
}

#[test]
fn jump_peaks_near_configured_height() {
    let mut w = walking(Vec3::new(0.5, 10.0001, 0.5));
    settle(&mut w, &flat, 3, MoveInput::default());
    let jump = MoveInput {
        jump: true,
        ..MoveInput::default()
    };
    w.update(&flat, DT, &jump);
    let mut peak = w.pos.y;
    for _ in 0..60 {
        w.update(&flat, DT, &MoveInput::default());
        peak = peak.max(w.pos.y);
    }
    let rise = peak - 10.0;
    assert!(rise > 3.0 && rise < 4.0, "rise {rise}");
    assert!(w.on_ground);
    assert!((w.pos.y - 10.0).abs() < 1e-3);
}

#[test]
fn ceiling_caps_the_jump() {
    let room = |_: i32, y: i32, _: i32| {
        if y < 10 || y >= 17 { Voxel::Stone } else { Voxel::Air }
    };
    let mut w = walking(Vec3::new(0.5, 10.0001, 0.5));
    settle(&mut w, &room, 3, MoveInput::default());
    let jump = MoveInput {
        jump: true,
        ..MoveInput::default()
    };
    let mut peak = w.pos.y;
    w.update(&room, DT, &jump);
    for _ in 0..40 {
        peak = peak.max(w.pos.y);
        w.update(&room, DT, &MoveInput::default());
    }
    assert!(peak <= 11.0 + 1e-3, "peak {peak}");
    assert!(w.on_ground);
}

#[test]
fn toggling_mode_clears_motion() {
    let mut w = walking(Vec3::new(0.5, 20.0, 0.5));
    w.vel = Vec3::new(1.0, -3.0, 2.0);
    assert_eq!(w.toggle_mode(), MoveMode::Fly);
    assert_eq!(w.vel, Vec3::ZERO);
    // Fly mode ignores gravity.
    settle(&mut w, &flat, 10, MoveInput::default());
    assert_eq!(w.pos.y, 20.0);
}

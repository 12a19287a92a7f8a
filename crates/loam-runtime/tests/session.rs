use std::f32::consts::FRAC_PI_2;

use loam_blocks::Voxel;
use loam_geom::Vec3;
use loam_io::{JsonDirStore, MemoryStore, PersistError};
use loam_mesh_cpu::{HorizonConfig, Pass};
use loam_physics::{MoveInput, MoveMode, WalkerParams};
use loam_runtime::{HeadlessBackend, StreamConfig, WorldSession};
use loam_world::{ChunkCoord, World, WorldGenConfig};

fn session() -> WorldSession<HeadlessBackend> {
    WorldSession::new(
        World::new("default"),
        StreamConfig::default(),
        WalkerParams::default(),
        Box::new(MemoryStore::new()),
        HeadlessBackend::new(),
    )
}

/// Narrow chunks and a short view radius keep streaming tests quick.
fn small_session(store: Box<dyn loam_io::EditPersistence>) -> WorldSession<HeadlessBackend> {
    let world = World::with_config(
        "default",
        WorldGenConfig {
            chunk_size: 8,
            world_height: 96,
            ..Default::default()
        },
    )
    .unwrap();
    let cfg = StreamConfig {
        view_radius: 2,
        ..Default::default()
    };
    WorldSession::new(world, cfg, WalkerParams::default(), store, HeadlessBackend::new())
}

fn idle() -> MoveInput {
    MoveInput::default()
}

#[test]
fn water_then_undo_restores_generated_voxel() {
    let mut s = session();
    let h = s.world().height_at(0, 0);
    let generated = s.world().generated_voxel(0, h, 0);
    assert!(s.set_voxel(0, h, 0, Voxel::Water));
    assert_eq!(s.voxel_at(0, h, 0), Voxel::Water);
    assert_eq!(s.edits().len(), 1);
    assert!(s.undo());
    assert_eq!(s.voxel_at(0, h, 0), generated);
    assert!(s.edits().is_empty());
}

#[test]
fn unchanged_and_out_of_range_writes_are_noops() {
    let mut s = session();
    let h = s.world().height_at(5, 5);
    let g = s.world().generated_voxel(5, h, 5);
    assert!(!s.set_voxel(5, h, 5, g));
    assert!(!s.set_voxel(5, -1, 5, Voxel::Stone));
    assert!(!s.set_voxel(5, 256, 5, Voxel::Stone));
    assert_eq!(s.history().undo_len(), 0);
    assert!(!s.has_pending_save());
}

#[test]
fn undo_redo_pair_is_identity() {
    let mut s = session();
    let y = s.world().height_at(3, 3) + 4;
    assert!(s.set_voxel(3, y, 3, Voxel::Wood));
    assert!(s.set_voxel(3, y, 3, Voxel::Leaves));
    let before = s.history().clone();
    assert!(s.undo());
    assert_eq!(s.voxel_at(3, y, 3), Voxel::Wood);
    assert!(s.redo());
    assert_eq!(s.voxel_at(3, y, 3), Voxel::Leaves);
    assert_eq!(s.history(), &before);
}

#[test]
fn exhausted_history_is_noop() {
    let mut s = session();
    assert!(!s.undo());
    assert!(!s.redo());
}

#[test]
fn new_edit_clears_redo() {
    let mut s = session();
    let y = s.world().height_at(0, 0) + 3;
    s.set_voxel(0, y, 0, Voxel::Wood);
    s.undo();
    assert_eq!(s.history().redo_len(), 1);
    s.set_voxel(1, y, 0, Voxel::Wood);
    assert_eq!(s.history().redo_len(), 0);
    assert!(!s.redo());
}

#[test]
fn export_import_reproduces_edits() {
    let mut a = session();
    let top = s_top(&a, 2, 2);
    let ground = a.world().height_at(2, 2);
    let edge = s_top(&a, -1, 31) + 1;
    let edits = [
        (2, top + 1, 2, Voxel::Wood),
        (-1, edge, 31, Voxel::Leaves),
        (2, ground, 2, Voxel::Air),
    ];
    for &(x, y, z, v) in &edits {
        assert!(a.set_voxel(x, y, z, v));
    }
    let json = a.export().unwrap();

    let mut b = session();
    let report = b.import(&json).unwrap();
    assert_eq!(report.entries.len(), 3);
    assert_eq!(report.discarded, 0);
    assert_eq!(b.edits().entries(), a.edits().entries());
    assert_eq!(b.history().undo_len(), 0);

    // Chunks rebuilt from the imported table carry the edits.
    for _ in 0..4 {
        b.tick(0.016, &idle());
    }
    for &(x, y, z, v) in &edits {
        assert!(b.is_resident(b.world().chunk_of(x, z)), "{x},{z} not streamed in");
        assert_eq!(b.voxel_at(x, y, z), v);
    }
    assert_eq!(b.stats().edited_chunks, 2);
}

fn s_top(s: &WorldSession<HeadlessBackend>, x: i32, z: i32) -> i32 {
    s.world().height_at(x, z).max(s.world().water_level())
}

#[test]
fn import_rejects_non_object_and_keeps_table() {
    let mut s = session();
    let y = s_top(&s, 0, 0) + 2;
    s.set_voxel(0, y, 0, Voxel::Wood);
    assert!(matches!(s.import("[]"), Err(PersistError::Invalid(_))));
    assert_eq!(s.edits().len(), 1);
    assert_eq!(s.history().undo_len(), 1);
}

#[test]
fn import_clears_history_and_resident_chunks() {
    let mut s = session();
    let y = s_top(&s, 0, 0) + 2;
    s.set_voxel(0, y, 0, Voxel::Wood);
    assert!(s.is_resident(ChunkCoord::new(0, 0)));
    s.import(r#"{"0,50,0": 7, "bad": 1}"#).unwrap();
    assert_eq!(s.history().undo_len(), 0);
    assert_eq!(s.stats().resident_chunks, 0);
    assert_eq!(s.backend().live_buffers(), 0);
}

#[test]
fn streaming_respects_budget_and_fills_square() {
    let mut s = small_session(Box::new(MemoryStore::new()));
    s.tick(0.016, &idle());
    let st = s.stats();
    assert_eq!(st.resident_chunks, 4);
    assert_eq!(st.queued, 21);
    assert!(s.is_resident(s.camera_chunk()));
    for _ in 0..10 {
        s.tick(0.016, &idle());
    }
    let st = s.stats();
    assert_eq!(st.resident_chunks, 25);
    assert_eq!(st.queued, 0);
    assert_eq!(st.live_buffers, s.backend().live_buffers());
}

#[test]
fn far_chunks_are_evicted_without_leaking_buffers() {
    let mut s = small_session(Box::new(MemoryStore::new()));
    for _ in 0..8 {
        s.tick(0.016, &idle());
    }
    assert_eq!(s.stats().resident_chunks, 25);
    let far = 8.0 * 40.0;
    let y = s.walker().pos.y;
    s.walker_mut().pos = Vec3::new(far, y, far);
    s.tick(1.0, &idle());
    let st = s.stats();
    assert_eq!(st.chunks_evicted, 25);
    assert_eq!(st.resident_chunks, 4);
    assert_eq!(st.live_buffers, s.backend().live_buffers());
}

/// Uploaded vertices of one stream of a resident chunk.
fn vertices(s: &WorldSession<HeadlessBackend>, c: ChunkCoord, pass: Pass) -> usize {
    s.draw_list()
        .iter()
        .filter(|d| d.coord == c && d.pass == pass)
        .map(|d| d.vertex_count)
        .sum()
}

#[test]
fn border_edit_remeshes_resident_neighbor() {
    let mut s = small_session(Box::new(MemoryStore::new()));
    for _ in 0..12 {
        s.tick(0.016, &idle());
    }
    let west = ChunkCoord::new(-1, 0);
    assert!(s.is_resident(west));
    assert_eq!(s.stats().dirty, 0);
    let before = vertices(&s, west, Pass::Opaque);

    // Hollowing the bottom voxel at local x == 0 exposes the west chunk's +x face.
    assert!(s.voxel_at(-1, 0, 3).is_solid());
    assert!(s.set_voxel(0, 0, 3, Voxel::Air));
    assert!(vertices(&s, west, Pass::Opaque) > before);

    assert!(s.undo());
    assert_eq!(vertices(&s, west, Pass::Opaque), before);
}

#[test]
fn streamed_neighbor_culls_seam_faces() {
    let mut s = small_session(Box::new(MemoryStore::new()));
    s.tick(0.016, &idle());
    let first: Vec<(ChunkCoord, usize)> = s
        .draw_list()
        .iter()
        .filter(|d| d.pass == Pass::Opaque)
        .map(|d| (d.coord, d.vertex_count))
        .collect();
    let was_resident = |c: ChunkCoord| first.iter().any(|&(f, _)| f == c);

    s.tick(0.016, &idle());
    let mut checked = 0;
    for &(c, before) in &first {
        let gained = c
            .neighbors()
            .into_iter()
            .any(|n| s.is_resident(n) && !was_resident(n));
        if gained {
            assert!(vertices(&s, c, Pass::Opaque) < before, "{c:?} kept its seam");
            checked += 1;
        }
    }
    assert!(checked > 0);
    assert_eq!(s.stats().dirty, 0);
}

#[test]
fn remesh_replaces_buffers() {
    let mut s = small_session(Box::new(MemoryStore::new()));
    s.tick(0.016, &idle());
    let deletes = s.backend().deletes;
    let y = s_top(&s, 3, 3) + 1;
    assert!(s.set_voxel(3, y, 3, Voxel::Stone));
    assert!(s.backend().deletes > deletes);
    assert_eq!(s.stats().live_buffers, s.backend().live_buffers());
}

#[test]
fn draw_list_puts_opaque_first() {
    let mut s = small_session(Box::new(MemoryStore::new()));
    for _ in 0..8 {
        s.tick(0.016, &idle());
    }
    let list = s.draw_list();
    assert!(!list.is_empty());
    let first_translucent = list
        .iter()
        .position(|d| d.pass == Pass::Translucent)
        .unwrap_or(list.len());
    assert!(list[first_translucent..].iter().all(|d| d.pass == Pass::Translucent));
    assert!(list.iter().all(|d| d.vertex_count > 0));
}

#[test]
fn saves_are_debounced() {
    let dir = tempfile::tempdir().unwrap();
    let files = JsonDirStore::new(dir.path());
    let path = files.path_for("default");
    let mut s = small_session(Box::new(files));
    let y = s_top(&s, 1, 1) + 1;
    assert!(s.set_voxel(1, y, 1, Voxel::Wood));
    assert!(s.has_pending_save());
    s.tick(0.3, &idle());
    assert!(!path.exists());
    s.tick(0.3, &idle());
    assert!(path.exists());
    assert!(!s.has_pending_save());

    let reopened = small_session(Box::new(JsonDirStore::new(dir.path())));
    assert_eq!(reopened.edits().len(), 1);
}

#[test]
fn set_seed_flushes_then_loads_new_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = small_session(Box::new(JsonDirStore::new(dir.path())));
    let y = s_top(&s, 1, 1) + 1;
    s.set_voxel(1, y, 1, Voxel::Wood);
    s.set_seed("other").unwrap();
    assert_eq!(s.world().seed_name(), "other");
    assert!(s.edits().is_empty());
    assert_eq!(s.history().undo_len(), 0);
    assert_eq!(s.stats().resident_chunks, 0);
    s.set_seed("default").unwrap();
    assert_eq!(s.edits().len(), 1);
}

#[test]
fn clear_edits_wipes_table_and_file() {
    let dir = tempfile::tempdir().unwrap();
    let files = JsonDirStore::new(dir.path());
    let path = files.path_for("default");
    let mut s = small_session(Box::new(files));
    let y = s_top(&s, 1, 1) + 1;
    s.set_voxel(1, y, 1, Voxel::Wood);
    s.flush_save().unwrap();
    assert!(path.exists());
    s.clear_edits().unwrap();
    assert!(!path.exists());
    assert!(s.edits().is_empty());
    assert_eq!(s.history().undo_len(), 0);
    assert!(!s.has_pending_save());
}

/// Puts the eye three blocks above column (0, 0) looking straight down and
/// returns the y of the first non-air voxel below it.
fn look_down(s: &mut WorldSession<HeadlessBackend>) -> i32 {
    s.tick(0.016, &idle());
    let eye_y = s_top(s, 0, 0) + 3;
    let w = s.walker_mut();
    w.set_eye_position(Vec3::new(0.5, eye_y as f32 + 0.5, 0.5));
    w.pitch = FRAC_PI_2;
    w.yaw = 0.0;
    (0..eye_y)
        .rev()
        .find(|&y| !s.voxel_at(0, y, 0).is_air())
        .unwrap()
}

#[test]
fn pick_place_remove_follow_the_view_ray() {
    let mut s = session();
    let top = look_down(&mut s);
    let under = s.voxel_at(0, top, 0);

    assert_eq!(s.pick(), Some(under));
    assert_eq!(s.selected(), under);

    let hl = s.highlight().unwrap();
    assert_eq!((hl.block.x, hl.block.y, hl.block.z), (0, top, 0));
    assert_eq!(s.highlight_lines().unwrap().len(), 72);

    assert!(s.place(Voxel::Wood));
    assert_eq!(s.voxel_at(0, top + 1, 0), Voxel::Wood);
    assert!(s.remove());
    assert_eq!(s.voxel_at(0, top + 1, 0), Voxel::Air);
    assert_eq!(s.history().undo_len(), 2);
}

#[test]
fn hotbar_selection() {
    let mut s = session();
    assert_eq!(s.selected(), Voxel::Stone);
    assert!(!s.select(Voxel::Air));
    assert!(s.select(Voxel::Grass));
    assert_eq!(s.cycle_selected(-1), Voxel::Snow);
    assert_eq!(s.cycle_selected(1), Voxel::Grass);
}

#[test]
fn view_radius_is_clamped() {
    let mut s = session();
    assert_eq!(s.set_view_radius(100), 16);
    assert_eq!(s.set_view_radius(0), 2);
    assert_eq!(s.view_radius(), 2);
}

#[test]
fn walk_toggle_and_horizon() {
    let mut s = session();
    assert_eq!(s.toggle_walk(), MoveMode::Walk);
    assert_eq!(s.toggle_walk(), MoveMode::Fly);
    let ring = s.horizon(&HorizonConfig::default(), [0.6, 0.7, 0.8]);
    assert!(!ring.is_empty());
}

#[test]
fn corrupt_table_opens_with_empty_edits() {
    let dir = tempfile::tempdir().unwrap();
    let files = JsonDirStore::new(dir.path());
    std::fs::write(files.path_for("default"), "{not json").unwrap();
    let s = small_session(Box::new(files));
    assert!(s.edits().is_empty());
}

use hashbrown::HashSet;

use loam_blocks::Voxel;
use loam_chunk::{ChunkBuf, build_chunk};
use loam_edit::{EditStore, History, HistoryEntry};
use loam_geom::{IVec3, Vec3};
use loam_io::{EditPersistence, ImportReport, PersistError, decode_table, encode_table};
use loam_mesh_cpu::{
    HorizonConfig, MeshBuild, Pass, build_chunk_mesh, build_horizon_ring, wire_cube_lines,
};
use loam_physics::{MoveInput, MoveMode, RayHit, Walker, WalkerParams, raycast_first_hit_with_face};
use loam_world::{ChunkCoord, World};

use crate::backend::{BufferHandle, RenderBackend};
use crate::config::StreamConfig;
use crate::pool::{BuildJob, BuildPool};
use crate::store::{ChunkEntry, ChunkStore, GpuMesh};
use crate::stream::StreamScheduler;

/// Reach of place/remove/pick, in blocks.
pub const INTERACT_REACH: f32 = 16.0;
/// Reach of the hover outline.
pub const HIGHLIGHT_REACH: f32 = 8.0;
/// Blocks of air left under the feet at spawn.
const SPAWN_CLEARANCE: f32 = 2.0;

/// One uploaded stream to draw this frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DrawItem {
    pub coord: ChunkCoord,
    pub pass: Pass,
    pub handle: BufferHandle,
    pub vertex_count: usize,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub tick: u64,
    pub resident_chunks: usize,
    pub queued: usize,
    pub dirty: usize,
    /// Buffers currently held by resident chunks.
    pub live_buffers: usize,
    pub edits: usize,
    /// Chunks holding at least one edit.
    pub edited_chunks: usize,
    pub undo_depth: usize,
    pub redo_depth: usize,
    pub chunks_built: u64,
    pub chunks_evicted: u64,
}

/// A running world for one seed: terrain, resident chunks, the edit log with
/// its history, the player body, persistence and the render backend.
///
/// The edit log is the durable state. Chunks are caches rebuilt from
/// `(seed, edits)` on demand, so eviction and invalidation never lose data.
pub struct WorldSession<B: RenderBackend> {
    world: World,
    cfg: StreamConfig,
    store: ChunkStore,
    edits: EditStore,
    history: History,
    scheduler: StreamScheduler,
    walker: Walker,
    persistence: Box<dyn EditPersistence>,
    backend: B,
    pool: BuildPool,
    dirty: HashSet<ChunkCoord>,
    selected: Voxel,
    tick: u64,
    time: f32,
    save_in: Option<f32>,
    built: u64,
    evicted: u64,
}

fn spawn_feet(world: &World) -> Vec3 {
    let ground = (world.height_at(0, 0) + 1).max(world.water_level());
    Vec3::new(0.5, ground as f32 + SPAWN_CLEARANCE, 0.5)
}

fn edits_from(world: &World, entries: &[(IVec3, Voxel)]) -> EditStore {
    let mut edits = EditStore::new(world.chunk_size());
    for &(p, v) in entries {
        edits.record(p, v, world.generated_voxel(p.x, p.y, p.z));
    }
    edits
}

fn load_edits(world: &World, persistence: &dyn EditPersistence) -> EditStore {
    match persistence.load(world.seed_name()) {
        Ok(report) => {
            if report.discarded > 0 {
                log::warn!(
                    "seed {:?}: {} stored edits were invalid and dropped",
                    world.seed_name(),
                    report.discarded
                );
            }
            edits_from(world, &report.entries)
        }
        Err(e) => {
            log::error!(
                "seed {:?}: failed to load edits ({e}); starting with an empty table",
                world.seed_name()
            );
            EditStore::new(world.chunk_size())
        }
    }
}

fn upload<B: RenderBackend>(backend: &mut B, mesh: &MeshBuild) -> Option<GpuMesh> {
    if mesh.is_empty() {
        return None;
    }
    Some(GpuMesh {
        handle: backend.upload(&mesh.data),
        vertex_count: mesh.vertex_count(),
    })
}

fn release<B: RenderBackend>(backend: &mut B, entry: &mut ChunkEntry) {
    for m in entry.take_meshes().into_iter().flatten() {
        backend.delete(m.handle);
    }
}

impl<B: RenderBackend> WorldSession<B> {
    /// Opens `world`, loading its stored edits. A table that fails to load is
    /// logged and replaced by an empty one.
    pub fn new(
        world: World,
        cfg: StreamConfig,
        params: WalkerParams,
        persistence: Box<dyn EditPersistence>,
        backend: B,
    ) -> Self {
        let radius = cfg.clamp_radius(cfg.view_radius);
        let edits = load_edits(&world, persistence.as_ref());
        log::info!(
            "opened seed {:?} ({:#010x}) with {} edits, view radius {}",
            world.seed_name(),
            world.seed(),
            edits.len(),
            radius
        );
        Self {
            store: ChunkStore::new(world.chunk_size()),
            history: History::new(cfg.history_cap),
            scheduler: StreamScheduler::new(radius),
            walker: Walker::new(spawn_feet(&world), params),
            pool: BuildPool::new(cfg.worker_threads),
            dirty: HashSet::new(),
            selected: Voxel::Stone,
            tick: 0,
            time: 0.0,
            save_in: None,
            built: 0,
            evicted: 0,
            world,
            cfg,
            edits,
            persistence,
            backend,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &StreamConfig {
        &self.cfg
    }

    pub fn walker(&self) -> &Walker {
        &self.walker
    }

    pub fn walker_mut(&mut self) -> &mut Walker {
        &mut self.walker
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn edits(&self) -> &EditStore {
        &self.edits
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selected(&self) -> Voxel {
        self.selected
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Seconds of simulated time, for water wave animation.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn view_radius(&self) -> i32 {
        self.scheduler.radius()
    }

    pub fn is_resident(&self, c: ChunkCoord) -> bool {
        self.store.contains(c)
    }

    pub fn has_pending_save(&self) -> bool {
        self.save_in.is_some()
    }

    pub fn camera_chunk(&self) -> ChunkCoord {
        let eye = self.walker.eye_position().floor_cell();
        self.world.chunk_of(eye.x, eye.z)
    }

    /// Current voxel at a world position. Non-resident chunks and positions
    /// outside the vertical range read as air.
    pub fn voxel_at(&self, x: i32, y: i32, z: i32) -> Voxel {
        self.store.voxel(x, y, z)
    }

    /// Advances one frame: stream in around the camera, move the body,
    /// re-mesh seams, evict far chunks, then save if the debounce elapsed.
    pub fn tick(&mut self, dt: f32, input: &MoveInput) {
        self.tick += 1;
        self.time += dt.max(0.0);

        let center = self.camera_chunk();
        let store = &self.store;
        let queued = self.scheduler.update_desired(center, |c| store.contains(c));
        if queued > 0 {
            log::debug!(
                "[tick {}] queued {} chunks around ({}, {})",
                self.tick,
                queued,
                center.cx,
                center.cz
            );
        }
        self.build_pending();

        let store = &self.store;
        self.walker
            .update(&|x, y, z| store.voxel(x, y, z), dt, input);

        self.remesh_dirty();
        if self.scheduler.prune_due(dt, self.cfg.prune_interval) {
            self.prune();
        }

        let save_due = match self.save_in.as_mut() {
            Some(left) => {
                *left -= dt;
                *left <= 0.0
            }
            None => false,
        };
        if save_due {
            if let Err(e) = self.flush_save() {
                log::error!("saving edits for {:?} failed: {e}", self.world.seed_name());
            }
        }
    }

    fn build_pending(&mut self) {
        let evict = self.cfg.evict_distance(self.scheduler.radius());
        let store = &self.store;
        let coords = self
            .scheduler
            .drain(self.cfg.build_budget, evict, |c| store.contains(c));
        if coords.is_empty() {
            return;
        }
        let jobs: Vec<BuildJob> = coords
            .into_iter()
            .map(|c| (c, self.edits.snapshot_for_chunk(c)))
            .collect();
        for buf in self.pool.generate(&self.world, jobs) {
            self.install(buf);
        }
    }

    fn install(&mut self, buf: ChunkBuf) {
        let coord = buf.coord;
        if let Some(mut old) = self.store.insert(buf) {
            release(&mut self.backend, &mut old);
        }
        self.built += 1;
        self.mesh_chunk(coord);
        for n in coord.neighbors() {
            if self.store.contains(n) {
                self.dirty.insert(n);
            }
        }
        log::info!(target: "events", "[tick {}] ChunkBuilt ({}, {})", self.tick, coord.cx, coord.cz);
    }

    fn ensure_chunk(&mut self, coord: ChunkCoord) {
        if self.store.contains(coord) {
            return;
        }
        let buf = build_chunk(&self.world, coord, self.edits.snapshot_for_chunk(coord));
        self.install(buf);
    }

    /// Rebuilds both streams of a resident chunk, freeing the previous pair
    /// before uploading. False when the chunk is not resident.
    fn mesh_chunk(&mut self, coord: ChunkCoord) -> bool {
        let store = &self.store;
        let Some(entry) = store.get(coord) else {
            return false;
        };
        let cpu = build_chunk_mesh(&entry.buf, &self.world, |x, y, z| store.voxel(x, y, z));
        let Some(entry) = self.store.get_mut(coord) else {
            return false;
        };
        release(&mut self.backend, entry);
        entry.opaque = upload(&mut self.backend, &cpu.opaque);
        entry.translucent = upload(&mut self.backend, &cpu.translucent);
        entry.mesh_count += 1;
        self.dirty.remove(&coord);
        true
    }

    fn remesh_dirty(&mut self) {
        if self.dirty.is_empty() {
            return;
        }
        let center = self.scheduler.center();
        let mut order: Vec<ChunkCoord> = self.dirty.iter().copied().collect();
        order.sort_by_key(|c| (c.distance_sq(center), *c));
        for c in order.into_iter().take(self.cfg.remesh_budget) {
            if !self.mesh_chunk(c) {
                self.dirty.remove(&c);
            }
        }
    }

    fn prune(&mut self) {
        let evict = self.cfg.evict_distance(self.scheduler.radius());
        let doomed: Vec<ChunkCoord> = self
            .store
            .coords()
            .into_iter()
            .filter(|&c| self.scheduler.should_evict(c, evict))
            .collect();
        for c in doomed {
            if let Some(mut entry) = self.store.remove(c) {
                release(&mut self.backend, &mut entry);
                self.dirty.remove(&c);
                self.evicted += 1;
                log::info!(target: "events", "[tick {}] ChunkEvicted ({}, {})", self.tick, c.cx, c.cz);
            }
        }
    }

    /// Drops every resident chunk and queued request. The edit log is untouched,
    /// so the next ticks rebuild the same voxels.
    fn invalidate(&mut self) {
        for mut entry in self.store.drain() {
            release(&mut self.backend, &mut entry);
        }
        self.dirty.clear();
        self.scheduler.reset();
    }

    /// Writes `v` at `p`, re-meshes the owner and any resident neighbor
    /// sharing the touched border, and updates the edit record. No history.
    fn write_voxel(&mut self, p: IVec3, v: Voxel) {
        let owner = self.world.chunk_of(p.x, p.z);
        self.ensure_chunk(owner);
        if let Some(entry) = self.store.get_mut(owner) {
            entry.buf.set_world(p.x, p.y, p.z, v);
        }
        for c in self.edits.affected_chunks(p) {
            self.mesh_chunk(c);
        }
        self.edits
            .record(p, v, self.world.generated_voxel(p.x, p.y, p.z));
    }

    fn schedule_save(&mut self) {
        self.save_in = Some(self.cfg.save_debounce);
    }

    /// Sets one voxel as a user edit. False when `y` is outside the world or
    /// the voxel already holds `v`.
    pub fn set_voxel(&mut self, x: i32, y: i32, z: i32, v: Voxel) -> bool {
        if !self.world.y_in_range(y) {
            return false;
        }
        self.ensure_chunk(self.world.chunk_of(x, z));
        let prev = self.voxel_at(x, y, z);
        if prev == v {
            return false;
        }
        let pos = IVec3::new(x, y, z);
        self.write_voxel(pos, v);
        self.history.push(HistoryEntry { pos, prev, next: v });
        self.schedule_save();
        log::info!(
            target: "events",
            "[tick {}] SetVoxel {} {} -> {}",
            self.tick,
            pos,
            prev.name(),
            v.name()
        );
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some(e) = self.history.undo() else {
            return false;
        };
        self.write_voxel(e.pos, e.prev);
        self.schedule_save();
        log::info!(target: "events", "[tick {}] Undo {} -> {}", self.tick, e.pos, e.prev.name());
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(e) = self.history.redo() else {
            return false;
        };
        self.write_voxel(e.pos, e.next);
        self.schedule_save();
        log::info!(target: "events", "[tick {}] Redo {} -> {}", self.tick, e.pos, e.next.name());
        true
    }

    /// First non-air voxel along the view ray within `reach`.
    pub fn raycast(&self, reach: f32) -> Option<RayHit> {
        let store = &self.store;
        raycast_first_hit_with_face(
            self.walker.eye_position(),
            self.walker.view_dir(),
            reach,
            |x, y, z| !store.voxel(x, y, z).is_air(),
        )
    }

    /// Places `v` against the face the view ray enters.
    pub fn place(&mut self, v: Voxel) -> bool {
        let Some(hit) = self.raycast(INTERACT_REACH) else {
            return false;
        };
        if hit.normal == IVec3::ZERO {
            return false;
        }
        let at = hit.block + hit.normal;
        self.set_voxel(at.x, at.y, at.z, v)
    }

    pub fn place_selected(&mut self) -> bool {
        self.place(self.selected)
    }

    pub fn remove(&mut self) -> bool {
        match self.raycast(INTERACT_REACH) {
            Some(hit) => self.set_voxel(hit.block.x, hit.block.y, hit.block.z, Voxel::Air),
            None => false,
        }
    }

    /// Selects the voxel under the view ray.
    pub fn pick(&mut self) -> Option<Voxel> {
        let hit = self.raycast(INTERACT_REACH)?;
        let v = self.voxel_at(hit.block.x, hit.block.y, hit.block.z);
        if v.is_air() {
            return None;
        }
        self.selected = v;
        Some(v)
    }

    pub fn highlight(&self) -> Option<RayHit> {
        self.raycast(HIGHLIGHT_REACH)
    }

    /// Line-list vertices outlining the highlighted voxel.
    pub fn highlight_lines(&self) -> Option<Vec<f32>> {
        self.highlight().map(|h| wire_cube_lines(h.block))
    }

    /// Air cannot be selected.
    pub fn select(&mut self, v: Voxel) -> bool {
        if v.is_air() {
            return false;
        }
        self.selected = v;
        true
    }

    pub fn cycle_selected(&mut self, dir: i32) -> Voxel {
        self.selected = self.selected.cycle(dir);
        self.selected
    }

    pub fn toggle_walk(&mut self) -> MoveMode {
        let mode = self.walker.toggle_mode();
        log::info!(target: "events", "[tick {}] MoveMode {:?}", self.tick, mode);
        mode
    }

    /// Clamps `r` into the configured bounds and returns the radius in effect.
    pub fn set_view_radius(&mut self, r: i32) -> i32 {
        let r = self.cfg.clamp_radius(r);
        if r != self.scheduler.radius() {
            self.scheduler.set_radius(r);
            log::info!(target: "events", "[tick {}] ViewRadius {}", self.tick, r);
        }
        r
    }

    /// Switches to another seed. Pending edits of the current seed are written
    /// first; if that fails the session stays on the current seed.
    pub fn set_seed(&mut self, name: &str) -> Result<(), PersistError> {
        self.flush_save()?;
        self.invalidate();
        self.world = self.world.reseeded(name);
        self.edits = load_edits(&self.world, self.persistence.as_ref());
        self.history.clear();
        self.walker.pos = spawn_feet(&self.world);
        self.walker.vel = Vec3::ZERO;
        self.walker.on_ground = false;
        log::info!(
            target: "events",
            "[tick {}] SeedChanged {:?} ({} edits)",
            self.tick,
            name,
            self.edits.len()
        );
        Ok(())
    }

    /// Replaces the edit table with `json`, clearing history and every resident chunk.
    pub fn import(&mut self, json: &str) -> Result<ImportReport, PersistError> {
        let report = decode_table(json, self.world.world_height())?;
        self.edits = edits_from(&self.world, &report.entries);
        self.history.clear();
        self.invalidate();
        self.schedule_save();
        log::info!(
            target: "events",
            "[tick {}] ImportEdits {} accepted, {} discarded",
            self.tick,
            report.entries.len(),
            report.discarded
        );
        Ok(report)
    }

    pub fn export(&self) -> Result<String, PersistError> {
        let entries = self.edits.entries();
        log::info!(target: "events", "[tick {}] ExportEdits {}", self.tick, entries.len());
        encode_table(&entries)
    }

    /// Forgets every edit of the current seed, in memory and on disk.
    pub fn clear_edits(&mut self) -> Result<(), PersistError> {
        self.persistence.clear(self.world.seed_name())?;
        self.edits.clear();
        self.history.clear();
        self.save_in = None;
        self.invalidate();
        log::info!(target: "events", "[tick {}] ClearEdits", self.tick);
        Ok(())
    }

    /// Writes the edit table now if a save is pending.
    pub fn flush_save(&mut self) -> Result<(), PersistError> {
        if self.save_in.take().is_none() {
            return Ok(());
        }
        let entries = self.edits.entries();
        if let Err(e) = self.persistence.save(self.world.seed_name(), &entries) {
            self.save_in = Some(self.cfg.save_debounce);
            return Err(e);
        }
        Ok(())
    }

    /// Streams to draw, every opaque one before any translucent one.
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let coords = self.store.coords();
        let mut out = Vec::with_capacity(coords.len() * 2);
        for pass in [Pass::Opaque, Pass::Translucent] {
            for &coord in &coords {
                let Some(m) = self.store.get(coord).and_then(|e| e.mesh(pass)) else {
                    continue;
                };
                out.push(DrawItem {
                    coord,
                    pass,
                    handle: m.handle,
                    vertex_count: m.vertex_count,
                });
            }
        }
        out
    }

    /// Distant terrain ring centered on the camera.
    pub fn horizon(&self, cfg: &HorizonConfig, rgb: [f32; 3]) -> MeshBuild {
        let eye = self.walker.eye_position();
        build_horizon_ring(&self.world, eye.x, eye.z, cfg, rgb)
    }

    pub fn stats(&self) -> SessionStats {
        let edit_stats = self.edits.stats();
        SessionStats {
            tick: self.tick,
            resident_chunks: self.store.len(),
            queued: self.scheduler.queue_len(),
            dirty: self.dirty.len(),
            live_buffers: self.store.live_buffers(),
            edits: edit_stats.block_edits,
            edited_chunks: edit_stats.chunk_entries,
            undo_depth: self.history.undo_len(),
            redo_depth: self.history.redo_len(),
            chunks_built: self.built,
            chunks_evicted: self.evicted,
        }
    }
}

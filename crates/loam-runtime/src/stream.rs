use hashbrown::HashSet;

use loam_world::ChunkCoord;

/// Decides which chunks should exist around the camera and hands out build
/// requests nearest first, a bounded number per tick.
#[derive(Debug)]
pub struct StreamScheduler {
    radius: i32,
    center: ChunkCoord,
    queue: Vec<ChunkCoord>,
    pending: HashSet<ChunkCoord>,
    since_prune: f32,
}

impl StreamScheduler {
    pub fn new(radius: i32) -> Self {
        Self {
            radius,
            center: ChunkCoord::default(),
            queue: Vec::new(),
            pending: HashSet::new(),
            since_prune: 0.0,
        }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn set_radius(&mut self, r: i32) {
        self.radius = r;
    }

    pub fn center(&self) -> ChunkCoord {
        self.center
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_pending(&self, c: ChunkCoord) -> bool {
        self.pending.contains(&c)
    }

    /// Enqueues every coordinate of the square around `center` that is neither
    /// resident nor already pending. Returns how many were added.
    pub fn update_desired<F>(&mut self, center: ChunkCoord, resident: F) -> usize
    where
        F: Fn(ChunkCoord) -> bool,
    {
        self.center = center;
        let r = self.radius;
        let mut added = 0;
        for dz in -r..=r {
            for dx in -r..=r {
                let c = center.offset(dx, dz);
                if resident(c) || self.pending.contains(&c) {
                    continue;
                }
                self.pending.insert(c);
                self.queue.push(c);
                added += 1;
            }
        }
        added
    }

    /// Pops up to `budget` requests ordered by squared distance to the current
    /// center. Entries that became resident meanwhile, or drifted beyond
    /// `evict_distance`, are dropped without counting against the budget.
    pub fn drain<F>(&mut self, budget: usize, evict_distance: i32, resident: F) -> Vec<ChunkCoord>
    where
        F: Fn(ChunkCoord) -> bool,
    {
        let center = self.center;
        self.queue.sort_by_key(|c| (c.distance_sq(center), *c));
        let mut out = Vec::with_capacity(budget.min(self.queue.len()));
        let mut keep = Vec::new();
        for c in self.queue.drain(..) {
            if out.len() == budget {
                keep.push(c);
                continue;
            }
            self.pending.remove(&c);
            if c.chebyshev(center) > evict_distance || resident(c) {
                continue;
            }
            out.push(c);
        }
        self.queue = keep;
        out
    }

    /// Advances the eviction timer; true once every `interval` seconds.
    pub fn prune_due(&mut self, dt: f32, interval: f32) -> bool {
        self.since_prune += dt;
        if self.since_prune >= interval {
            self.since_prune = 0.0;
            true
        } else {
            false
        }
    }

    /// Whether a resident chunk at `c` lies outside the keep region.
    #[inline]
    pub fn should_evict(&self, c: ChunkCoord, evict_distance: i32) -> bool {
        c.chebyshev(self.center) > evict_distance
    }

    /// Forgets every queued request.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.pending.clear();
        self.since_prune = 0.0;
    }
}

use hashbrown::HashMap;

/// Opaque id of one uploaded vertex buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u64);

/// Where chunk vertex streams go. Vertices use the 9-float
/// `position, color, normal` layout produced by the mesher.
pub trait RenderBackend {
    fn upload(&mut self, vertices: &[f32]) -> BufferHandle;
    fn delete(&mut self, handle: BufferHandle);
}

/// Backend without a GPU. Remembers which buffers are alive and how big they are.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next: u64,
    live: HashMap<BufferHandle, usize>,
    pub uploads: usize,
    pub deletes: usize,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_buffers(&self) -> usize {
        self.live.len()
    }

    /// Total floats held by live buffers.
    pub fn live_floats(&self) -> usize {
        self.live.values().sum()
    }

    pub fn is_live(&self, h: BufferHandle) -> bool {
        self.live.contains_key(&h)
    }
}

impl RenderBackend for HeadlessBackend {
    fn upload(&mut self, vertices: &[f32]) -> BufferHandle {
        self.next += 1;
        let h = BufferHandle(self.next);
        self.live.insert(h, vertices.len());
        self.uploads += 1;
        h
    }

    fn delete(&mut self, handle: BufferHandle) {
        if self.live.remove(&handle).is_none() {
            log::warn!("delete of unknown buffer {:?}", handle);
        }
        self.deletes += 1;
    }
}

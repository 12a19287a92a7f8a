//! Session orchestration: chunk streaming, rebuilds, edits and buffer lifetime.
#![forbid(unsafe_code)]

mod backend;
mod config;
mod pool;
mod session;
mod store;
mod stream;

pub use backend::{BufferHandle, HeadlessBackend, RenderBackend};
pub use config::StreamConfig;
pub use pool::{BuildJob, BuildPool};
pub use session::{DrawItem, HIGHLIGHT_REACH, INTERACT_REACH, SessionStats, WorldSession};
pub use store::{ChunkEntry, ChunkStore, GpuMesh};
pub use stream::StreamScheduler;

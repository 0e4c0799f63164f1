//! Archive core: pure job logic with no IO.
mod chunk;
mod config;
mod dedup;
mod limit;
mod naming;
mod reply;
mod state;
mod target;

pub use chunk::{Chunk, ChunkBuffer, ChunkPolicy};
pub use config::{ContentKind, JobConfig, DEFAULT_CHUNK_SIZE};
pub use dedup::{ContentHash, Deduplicator};
pub use limit::{Flow, RecordLimit};
pub use naming::{chunk_file_name, sanitize_name, DEFAULT_NAME, OUTPUT_EXTENSION};
pub use reply::{is_reply_marker, rewrite_reply_href, REPLY_MARKER};
pub use state::{StateError, TaskState};
pub use target::{TargetError, ThreadTarget, Username};

/// Fixed version string reported by the version query.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The crate version, same as [`VERSION`].
pub fn version() -> &'static str {
    VERSION
}

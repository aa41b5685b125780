//! Part planning, byte sources and progress tracking for pre-signed uploads.
//!
//! Everything in this crate is transport-agnostic: it decides how a file is
//! split, hands out the exact bytes for each part and keeps per-file progress.

mod naming;
mod plan;
mod progress;
mod source;

pub use naming::{
    DEFAULT_KEY_PREFIX, DEFAULT_KEY_SUBPATH, KeyLayout, content_type_for_key, default_folder_name,
    file_extension, sanitize_folder_name, sanitize_game_name,
};
pub use plan::{ChunkPlan, PartSpec, plan};
pub use progress::{ProgressSink, ProgressState, default_status};
pub use source::{ByteStream, STREAM_CHUNK_SIZE, UploadSource};

pub use relaydrop_protocol::constants::{DEFAULT_CHUNK_SIZE, MAX_PART_COUNT};

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,

    #[error("file needs {count} parts, more than the {max} allowed")]
    TooManyParts { count: usize, max: usize },

    #[error("byte range {start}..{end} outside source of {size} bytes")]
    RangeOutOfBounds { start: u64, end: u64, size: u64 },
}

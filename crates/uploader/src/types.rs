//! Data types for the upload flow.

use relaydrop_protocol::StorageKey;
use relaydrop_protocol::constants::DEFAULT_CHUNK_SIZE;
use relaydrop_transfer::{KeyLayout, UploadSource};

use crate::links::ResultLinks;

/// Role of a file within a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Full-game video footage.
    Video,
    /// Archive produced by the manifest editor.
    Archive,
    Other,
}

/// A file selected for upload, before its destination is known.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Original file name; its extension ends up in the object key.
    pub name: String,
    pub kind: FileKind,
    pub source: UploadSource,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, kind: FileKind, source: UploadSource) -> Self {
        Self {
            name: name.into(),
            kind,
            source,
        }
    }
}

/// One file to upload with its resolved destination.
#[derive(Debug, Clone)]
pub struct UploadTarget {
    /// Unique id used for progress reporting.
    pub id: String,
    pub name: String,
    pub kind: FileKind,
    pub source: UploadSource,
    pub destination: StorageKey,
}

/// Input of one batch upload.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    /// Logical (already sanitized) name every object is stored under.
    pub game_name: String,
    /// Destination folder (already sanitized).
    pub folder: String,
    pub files: Vec<UploadFile>,
}

/// Multipart session handed out by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartSession {
    pub upload_id: String,
    pub content_type: String,
    pub key: StorageKey,
}

/// How a file was transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPath {
    Single,
    Multipart { parts: usize },
}

/// A file that reached terminal success.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_id: String,
    pub name: String,
    pub kind: FileKind,
    pub key: StorageKey,
    pub size: u64,
    pub path: UploadPath,
}

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct UploadReport {
    pub game_name: String,
    pub folder: String,
    pub files: Vec<UploadedFile>,
    pub links: Option<ResultLinks>,
}

/// Event emitted while a batch is running.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    /// A file has been planned and is about to start.
    Started {
        file_id: String,
        name: String,
        key: String,
        size: u64,
    },
    /// Progress update.
    Progress {
        file_id: String,
        fraction: f64,
        status: Option<String>,
    },
    /// The file reached terminal success.
    Completed { file_id: String, key: String },
    /// The file failed.
    Failed { file_id: String, error: String },
}

/// Settings shared by every upload of a coordinator.
#[derive(Debug, Clone)]
pub struct UploaderConfig {
    pub bucket: String,
    /// Region used for result links only.
    pub region: String,
    pub chunk_size: u64,
    pub layout: KeyLayout,
}

impl UploaderConfig {
    /// Config for `bucket` with the default chunk size and key layout.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: String::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            layout: KeyLayout::default(),
        }
    }
}

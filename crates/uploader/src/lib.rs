//! Pre-signed upload coordinator.
//!
//! This crate implements the **business logic** for pushing files into an
//! object-storage bucket through a backend that hands out pre-signed URLs.
//! Transport is abstracted behind the [`Backend`] and [`Storage`] traits;
//! [`HttpBackend`] and [`HttpStorage`] are the `reqwest` implementations.
//!
//! # Pipeline
//!
//! 1. **Plan**: files smaller than the chunk size take a single PUT,
//!    everything else is split into fixed-size parts
//! 2. **Single PUT**: fetch one pre-signed URL, stream the body
//! 3. **Multipart**: create session, fetch part URLs, upload parts
//!    concurrently, complete with ETags in part order
//! 4. **Batch**: run every file concurrently, fail on the first error

pub mod backend;
pub mod coordinator;
pub mod error;
pub mod links;
pub mod multipart;
pub mod session;
pub mod single;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export primary types for convenience.
pub use backend::{Backend, HttpBackend};
pub use coordinator::UploadCoordinator;
pub use error::UploadError;
pub use links::ResultLinks;
pub use multipart::MultipartUpload;
pub use session::UploadSession;
pub use single::upload_single;
pub use storage::{ByteProgress, HttpStorage, Storage};
pub use types::{
    BatchRequest, FileKind, MultipartSession, UploadEvent, UploadFile, UploadPath, UploadReport,
    UploadTarget, UploadedFile, UploaderConfig,
};

/// Boxed future returned by the transport traits.
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::TransferError;

/// Granularity of streamed request bodies, and therefore of byte progress.
pub const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// A boxed stream of body chunks, ready for an HTTP client.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send + 'static>>;

/// The payload of one upload, with its size known up front.
#[derive(Debug, Clone)]
pub enum UploadSource {
    /// Bytes already in memory, e.g. a regenerated archive.
    Memory(Bytes),
    /// A file on disk; byte ranges are read on demand.
    File { path: PathBuf, size: u64 },
}

impl UploadSource {
    /// Opens a file source, recording its size.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, TransferError> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            )
            .into());
        }
        Ok(Self::File {
            path: path.to_path_buf(),
            size: metadata.len(),
        })
    }

    /// Total payload size in bytes.
    pub fn size(&self) -> u64 {
        match self {
            UploadSource::Memory(data) => data.len() as u64,
            UploadSource::File { size, .. } => *size,
        }
    }

    /// Streams exactly the bytes in `[start, end)`, in chunks of at most
    /// `chunk_size` bytes.
    ///
    /// File ranges are read lazily, so only one chunk per stream is held in
    /// memory at a time.
    pub async fn stream_range(
        &self,
        start: u64,
        end: u64,
        chunk_size: usize,
    ) -> Result<ByteStream, TransferError> {
        let size = self.size();
        if start > end || end > size {
            return Err(TransferError::RangeOutOfBounds { start, end, size });
        }

        let chunk_size = chunk_size.max(1);
        match self {
            UploadSource::Memory(data) => Ok(slice_stream(
                data.slice(start as usize..end as usize),
                chunk_size,
            )),
            UploadSource::File { path, .. } => {
                let mut file = tokio::fs::File::open(path).await?;
                file.seek(SeekFrom::Start(start)).await?;
                Ok(Box::pin(ReaderStream::with_capacity(
                    file.take(end - start),
                    chunk_size,
                )))
            }
        }
    }

    /// Streams the whole payload in chunks of at most `chunk_size` bytes.
    pub async fn stream(&self, chunk_size: usize) -> Result<ByteStream, TransferError> {
        self.stream_range(0, self.size(), chunk_size).await
    }
}

fn slice_stream(data: Bytes, chunk_size: usize) -> ByteStream {
    let len = data.len();
    let chunks: Vec<std::io::Result<Bytes>> = (0..len)
        .step_by(chunk_size)
        .map(|offset| Ok(data.slice(offset..(offset + chunk_size).min(len))))
        .collect();
    Box::pin(futures_util::stream::iter(chunks))
}

impl From<Bytes> for UploadSource {
    fn from(data: Bytes) -> Self {
        UploadSource::Memory(data)
    }
}

impl From<Vec<u8>> for UploadSource {
    fn from(data: Vec<u8>) -> Self {
        UploadSource::Memory(Bytes::from(data))
    }
}

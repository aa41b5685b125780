use crate::{MAX_PART_COUNT, TransferError};

/// One part of a multipart upload: a 1-based index and a half-open byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartSpec {
    pub index: u32,
    pub byte_start: u64,
    /// Exclusive.
    pub byte_end: u64,
}

impl PartSpec {
    /// Number of bytes in this part.
    pub fn len(&self) -> u64 {
        self.byte_end - self.byte_start
    }

    pub fn is_empty(&self) -> bool {
        self.byte_end == self.byte_start
    }
}

/// Upload plan for one file.
///
/// When `is_single` is set the file goes through one pre-signed PUT and
/// `parts` is empty. Otherwise `parts` covers `[0, size)` contiguously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    pub is_single: bool,
    pub parts: Vec<PartSpec>,
}

impl ChunkPlan {
    /// Number of parts (0 for a single PUT).
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }
}

/// Splits a file of `size` bytes into parts of `chunk_size` bytes.
///
/// Files strictly smaller than `chunk_size` are uploaded with a single PUT.
pub fn plan(size: u64, chunk_size: u64) -> Result<ChunkPlan, TransferError> {
    if chunk_size == 0 {
        return Err(TransferError::ZeroChunkSize);
    }

    if size < chunk_size {
        return Ok(ChunkPlan {
            is_single: true,
            parts: Vec::new(),
        });
    }

    let count = size.div_ceil(chunk_size);
    if count > MAX_PART_COUNT as u64 {
        return Err(TransferError::TooManyParts {
            count: usize::try_from(count).unwrap_or(usize::MAX),
            max: MAX_PART_COUNT,
        });
    }

    tracing::debug!(size, chunk_size, parts = count, "planned multipart upload");

    let parts = (0..count)
        .map(|i| {
            let byte_start = i * chunk_size;
            PartSpec {
                index: (i + 1) as u32,
                byte_start,
                byte_end: (byte_start + chunk_size).min(size),
            }
        })
        .collect();

    Ok(ChunkPlan {
        is_single: false,
        parts,
    })
}

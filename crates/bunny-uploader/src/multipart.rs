//! Part boundaries and byte reads for multipart uploads.
//!
//! The server decides how many parts a file has by the number of part URLs it
//! returns; the client only divides the file evenly across them.

use std::io::SeekFrom;
use std::ops::Range;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use bunny_core::models::MediaSource;
use bunny_core::{AppError, AppResult};

/// Byte ranges of `part_count` contiguous parts covering `size` bytes.
///
/// Part sizes differ by at most one byte, larger parts first, so no part is empty
/// while `size >= part_count`.
pub fn part_ranges(size: u64, part_count: usize) -> Vec<Range<u64>> {
    if part_count == 0 {
        return Vec::new();
    }
    let count = part_count as u64;
    let base = size / count;
    let remainder = size % count;
    let mut start = 0;
    (0..count)
        .map(|index| {
            let len = base + u64::from(index < remainder);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

/// Read a whole source into memory.
pub async fn read_all(source: &MediaSource) -> AppResult<Bytes> {
    match source {
        MediaSource::Memory(data) => Ok(data.clone()),
        MediaSource::Path(path) => Ok(Bytes::from(tokio::fs::read(path).await?)),
    }
}

/// Read one byte range of a source.
pub async fn read_range(source: &MediaSource, range: Range<u64>) -> AppResult<Bytes> {
    match source {
        MediaSource::Memory(data) => {
            let end = usize::try_from(range.end)
                .map_err(|_| AppError::Internal("Part range out of bounds".to_string()))?;
            let start = usize::try_from(range.start)
                .map_err(|_| AppError::Internal("Part range out of bounds".to_string()))?;
            if end > data.len() || start > end {
                return Err(AppError::Internal(format!(
                    "Part range {}..{} exceeds {} bytes",
                    start,
                    end,
                    data.len()
                )));
            }
            Ok(data.slice(start..end))
        }
        MediaSource::Path(path) => {
            let mut file = tokio::fs::File::open(path).await?;
            file.seek(SeekFrom::Start(range.start)).await?;
            let mut buffer = vec![0u8; (range.end - range.start) as usize];
            file.read_exact(&mut buffer).await?;
            Ok(Bytes::from(buffer))
        }
    }
}

//! ChunkReader domain service - bounded positional reads within a range.
//!
//! The reader never relies on a descriptor's own file position: each read is
//! issued at the cursor's offset, so streams over the same adopted descriptor
//! with different ranges do not disturb each other when run one after another.

use crate::domain::{
    entities::{DescriptorHandle, ReadCursor},
    error::StreamError,
    ports::FileAccess,
    value_objects::{BufferSize, Chunk},
};

/// Result of a single read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Bytes were read.
    Chunk(Chunk),
    /// The range is exhausted or the file ended.
    Eof,
}

/// Issues one bounded read at a time on behalf of a stream.
///
/// # Examples
///
/// ```ignore
/// let reader = ChunkReader::new(BufferSize::new(4096));
/// let mut cursor = ReadCursor::new(&range);
///
/// while let ReadOutcome::Chunk(chunk) = reader.read_next(&files, &handle, &mut cursor).await? {
///     consume(chunk);
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ChunkReader {
    buffer_size: BufferSize,
}

impl ChunkReader {
    /// Create a reader requesting at most `buffer_size` bytes per read.
    pub const fn new(buffer_size: BufferSize) -> Self {
        Self { buffer_size }
    }

    /// Maximum bytes per read.
    #[inline]
    pub const fn buffer_size(&self) -> BufferSize {
        self.buffer_size
    }

    /// Read the next chunk at the cursor's position.
    ///
    /// # Behavior
    ///
    /// - An exhausted cursor yields [`ReadOutcome::Eof`] without any I/O
    /// - The request length is `min(buffer_size, limit - position)`
    /// - A zero-byte result is end of file; there is no retry
    /// - The cursor advances by exactly the number of bytes returned
    ///
    /// # Errors
    ///
    /// - [`StreamError::NotOpen`] / [`StreamError::Destroyed`] if the handle
    ///   cannot be read through
    /// - [`StreamError::Read`] carrying the file access error
    pub async fn read_next<F>(
        &self,
        files: &F,
        handle: &DescriptorHandle<F::Descriptor>,
        cursor: &mut ReadCursor,
    ) -> Result<ReadOutcome, StreamError<F::Error>>
    where
        F: FileAccess,
    {
        if cursor.is_exhausted() {
            return Ok(ReadOutcome::Eof);
        }

        let Some(descriptor) = handle.descriptor() else {
            return Err(StreamError::NotOpen);
        };
        if !handle.is_readable() {
            return Err(StreamError::Destroyed);
        }

        let offset = cursor.position();
        let len = cursor.next_request_len(self.buffer_size.get());

        let mut buf = files
            .read_at(descriptor, offset, vec![0u8; len])
            .await
            .map_err(|source| StreamError::Read { offset, source })?;
        buf.truncate(len);
        let count = buf.len();
        log::trace!(
            "read {} of {} bytes at offset {} from {:?}",
            count,
            len,
            offset,
            descriptor
        );

        if count == 0 {
            return Ok(ReadOutcome::Eof);
        }

        cursor.advance(count);
        Ok(ReadOutcome::Chunk(Chunk::new(offset, buf)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryFiles;
    use crate::domain::value_objects::ByteRange;

    async fn collect(
        files: &MemoryFiles,
        handle: &DescriptorHandle<crate::adapters::MemoryFd>,
        range: ByteRange,
        buffer_size: usize,
    ) -> (Vec<Chunk>, ReadCursor) {
        let reader = ChunkReader::new(BufferSize::new(buffer_size));
        let mut cursor = ReadCursor::new(&range);
        let mut chunks = Vec::new();
        while let ReadOutcome::Chunk(chunk) =
            reader.read_next(files, handle, &mut cursor).await.unwrap()
        {
            chunks.push(chunk);
        }
        (chunks, cursor)
    }

    #[tokio::test]
    async fn test_range_is_clipped() {
        let files = MemoryFiles::new();
        let fd = files.adopt_bytes(b"xyz\n".to_vec());
        let handle = DescriptorHandle::adopt(fd);

        let (chunks, cursor) =
            collect(&files, &handle, ByteRange::new(1, Some(2)).unwrap(), 1).await;
        let offsets: Vec<u64> = chunks.iter().map(Chunk::offset).collect();
        assert_eq!(offsets, vec![1, 2]);
        assert_eq!(chunks.concat_bytes(), b"yz");
        assert_eq!(cursor.bytes_read(), 2);
    }

    #[tokio::test]
    async fn test_short_file_ends_on_zero_read() {
        let files = MemoryFiles::new();
        let fd = files.adopt_bytes(b"xyz\n".to_vec());
        let handle = DescriptorHandle::adopt(fd);

        // End beyond the file: stops at the real end
        let (chunks, cursor) =
            collect(&files, &handle, ByteRange::new(0, Some(100)).unwrap(), 3).await;
        assert_eq!(chunks.concat_bytes(), b"xyz\n");
        assert_eq!(cursor.position(), 4);
    }

    #[tokio::test]
    async fn test_exhausted_cursor_issues_no_io() {
        let files = MemoryFiles::new();
        let fd = files.adopt_bytes(b"xyz\n".to_vec());
        let handle = DescriptorHandle::adopt(fd);
        let reader = ChunkReader::new(BufferSize::DEFAULT);

        let mut cursor = ReadCursor::new(&ByteRange::new(0, Some(0)).unwrap());
        cursor.advance(1);
        let before = files.reads_issued();
        assert_eq!(
            reader.read_next(&files, &handle, &mut cursor).await.unwrap(),
            ReadOutcome::Eof
        );
        assert_eq!(files.reads_issued(), before);
    }

    #[tokio::test]
    async fn test_read_error_carries_offset() {
        let files = MemoryFiles::new();
        let fd = files.adopt_bytes(b"xyz\n".to_vec());
        files.fail_reads(fd);
        let handle = DescriptorHandle::adopt(fd);
        let reader = ChunkReader::new(BufferSize::DEFAULT);
        let mut cursor = ReadCursor::new(&ByteRange::new(2, None).unwrap());

        let err = reader.read_next(&files, &handle, &mut cursor).await.unwrap_err();
        assert!(matches!(err, StreamError::Read { offset: 2, .. }));
        assert_eq!(cursor.bytes_read(), 0);
    }

    #[tokio::test]
    async fn test_unopened_handle_is_refused() {
        let files = MemoryFiles::new();
        let handle = DescriptorHandle::unopened();
        let reader = ChunkReader::new(BufferSize::DEFAULT);
        let mut cursor = ReadCursor::new(&ByteRange::full());

        let err = reader.read_next(&files, &handle, &mut cursor).await.unwrap_err();
        assert!(matches!(err, StreamError::NotOpen));
        assert_eq!(files.reads_issued(), 0);
    }

    trait ConcatBytes {
        fn concat_bytes(&self) -> Vec<u8>;
    }

    impl ConcatBytes for Vec<Chunk> {
        fn concat_bytes(&self) -> Vec<u8> {
            self.iter().flat_map(|c| c.bytes().iter().copied()).collect()
        }
    }
}

//! FileAccess port - Secondary (driven) port for descriptor-level file I/O.
//!
//! This port defines what the domain needs from the operating system (or any
//! other file provider) to stream a file: open a path, read at an explicit
//! offset, and close. Adapters implement this trait to connect the domain to
//! real descriptors or to in-memory test doubles.

use core::error::Error;
use core::fmt::Debug;
use std::path::Path;

/// Port for descriptor-level file access.
///
/// This is a **secondary (driven) port** in hexagonal architecture terms.
/// The stream lifecycle depends on this abstraction, and the adapter layer
/// (or a platform crate) provides concrete implementations.
///
/// ```text
/// ┌─────────────────────┐
/// │   Domain Layer      │
/// │  (ChunkReader)      │
/// └──────────┬──────────┘
///            │ depends on
///            ▼
/// ┌─────────────────────┐
/// │  FileAccess Port    │  ◄── This trait
/// └──────────┬──────────┘
///            │ implemented by
///            ▼
/// ┌─────────────────────┐
/// │  MemoryFiles /      │
/// │  PosixFiles         │
/// └─────────────────────┘
/// ```
///
/// # Positional reads
///
/// The port has no `seek`. Every read names its own offset, and
/// implementations must not move or consult the descriptor's shared file
/// position.
#[allow(async_fn_in_trait)]
pub trait FileAccess {
    /// Handle identifying an open file (a raw descriptor on POSIX).
    type Descriptor: Copy + Eq + Debug;

    /// The error type for file operations.
    type Error: Error + 'static;

    /// Open the file at `path` for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be accessed, or is
    /// not a readable target.
    async fn open(&self, path: &Path) -> Result<Self::Descriptor, Self::Error>;

    /// Read up to `buf.len()` bytes starting at byte `offset`.
    ///
    /// The buffer is handed over by value and returned truncated to the bytes
    /// read, so an implementation can fill it on another thread without a
    /// second copy. An empty result for a non-empty `buf` means end of file.
    ///
    /// # Errors
    ///
    /// Returns an error if the descriptor is invalid or the read fails.
    async fn read_at(
        &self,
        descriptor: Self::Descriptor,
        offset: u64,
        buf: Vec<u8>,
    ) -> Result<Vec<u8>, Self::Error>;

    /// Release the descriptor.
    ///
    /// Callers must not use `descriptor` after this returns, whether or not it
    /// succeeded.
    async fn close(&self, descriptor: Self::Descriptor) -> Result<(), Self::Error>;
}

impl<T: FileAccess> FileAccess for &T {
    type Descriptor = T::Descriptor;
    type Error = T::Error;

    async fn open(&self, path: &Path) -> Result<Self::Descriptor, Self::Error> {
        (**self).open(path).await
    }

    async fn read_at(
        &self,
        descriptor: Self::Descriptor,
        offset: u64,
        buf: Vec<u8>,
    ) -> Result<Vec<u8>, Self::Error> {
        (**self).read_at(descriptor, offset, buf).await
    }

    async fn close(&self, descriptor: Self::Descriptor) -> Result<(), Self::Error> {
        (**self).close(descriptor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    // Minimal single-file provider for exercising the trait surface
    struct FixedFile {
        path: PathBuf,
        data: Vec<u8>,
        open: Mutex<HashMap<u8, ()>>,
    }

    #[derive(Debug)]
    struct FixedError;

    impl fmt::Display for FixedError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "fixed file error")
        }
    }

    impl Error for FixedError {}

    impl FileAccess for FixedFile {
        type Descriptor = u8;
        type Error = FixedError;

        async fn open(&self, path: &Path) -> Result<u8, FixedError> {
            if path != self.path {
                return Err(FixedError);
            }
            self.open.lock().unwrap().insert(7, ());
            Ok(7)
        }

        async fn read_at(
            &self,
            fd: u8,
            offset: u64,
            mut buf: Vec<u8>,
        ) -> Result<Vec<u8>, FixedError> {
            if !self.open.lock().unwrap().contains_key(&fd) {
                return Err(FixedError);
            }
            let start = (offset as usize).min(self.data.len());
            let n = buf.len().min(self.data.len() - start);
            buf[..n].copy_from_slice(&self.data[start..start + n]);
            buf.truncate(n);
            Ok(buf)
        }

        async fn close(&self, fd: u8) -> Result<(), FixedError> {
            self.open.lock().unwrap().remove(&fd).ok_or(FixedError)
        }
    }

    fn fixture() -> FixedFile {
        FixedFile {
            path: PathBuf::from("/fixed"),
            data: b"hello".to_vec(),
            open: Mutex::new(HashMap::new()),
        }
    }

    #[tokio::test]
    async fn test_positional_read_through_reference() {
        let file = fixture();
        let access = &file;

        let fd = access.open(Path::new("/fixed")).await.unwrap();
        assert_eq!(access.read_at(fd, 2, vec![0; 3]).await.unwrap(), b"llo");

        // Same offset twice yields the same bytes; no hidden cursor
        assert_eq!(access.read_at(fd, 2, vec![0; 3]).await.unwrap(), b"llo");

        assert!(access.read_at(fd, 5, vec![0; 3]).await.unwrap().is_empty());
        access.close(fd).await.unwrap();
        assert!(access.read_at(fd, 0, vec![0; 3]).await.is_err());
    }

    #[tokio::test]
    async fn test_open_unknown_path_fails() {
        let file = fixture();
        assert!(file.open(Path::new("/missing")).await.is_err());
    }
}

//! In-memory implementation of the `FileAccess` port.
//!
//! Files are byte vectors registered under a path. Descriptors are small
//! integers handed out by `open` (or `adopt_bytes`, which stands in for a
//! descriptor the caller opened elsewhere). The adapter also counts reads and
//! closes and can hold reads back or make them fail, which is what the
//! lifecycle tests need to observe flow control and disposal precisely.

use crate::adapters::MemoryError;
use crate::domain::ports::FileAccess;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

/// Descriptor issued by [`MemoryFiles`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemoryFd(u32);

impl MemoryFd {
    /// Numeric value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for MemoryFd {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "fd({})", self.0)
    }
}

#[derive(Default)]
struct Inner {
    files: HashMap<PathBuf, Arc<Vec<u8>>>,
    open: HashMap<MemoryFd, Arc<Vec<u8>>>,
    failing: HashSet<MemoryFd>,
    next_fd: u32,
    reads_issued: usize,
    closes: usize,
}

impl Inner {
    fn allocate(&mut self, data: Arc<Vec<u8>>) -> MemoryFd {
        // Start above the standard streams, like a real process
        let fd = MemoryFd(self.next_fd + 3);
        self.next_fd += 1;
        self.open.insert(fd, data);
        fd
    }
}

/// Shared in-memory file table.
///
/// Cloning is cheap and every clone sees the same files and descriptors,
/// so several streams can be run against one table.
///
/// # Examples
///
/// ```
/// use fdstream::adapters::MemoryFiles;
///
/// let files = MemoryFiles::new();
/// files.insert("/x.txt", b"xyz\n".to_vec());
/// let fd = files.adopt_bytes(b"caller-owned".to_vec());
/// assert!(files.is_open(fd));
/// ```
#[derive(Clone, Default)]
pub struct MemoryFiles {
    inner: Arc<Mutex<Inner>>,
    gate: Option<Arc<Semaphore>>,
}

impl MemoryFiles {
    /// An empty table whose reads complete immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty table whose reads wait for [`release_reads`](Self::release_reads).
    pub fn gated() -> Self {
        Self {
            inner: Arc::default(),
            gate: Some(Arc::new(Semaphore::new(0))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register (or replace) a file.
    pub fn insert(&self, path: impl AsRef<Path>, data: Vec<u8>) {
        self.lock()
            .files
            .insert(path.as_ref().to_path_buf(), Arc::new(data));
    }

    /// Open an anonymous file, as if the caller had opened it elsewhere.
    pub fn adopt_bytes(&self, data: Vec<u8>) -> MemoryFd {
        self.lock().allocate(Arc::new(data))
    }

    /// Whether `fd` is currently open.
    pub fn is_open(&self, fd: MemoryFd) -> bool {
        self.lock().open.contains_key(&fd)
    }

    /// Release `fd` without going through the port.
    pub fn close_now(&self, fd: MemoryFd) {
        self.lock().open.remove(&fd);
    }

    /// Make every later read on `fd` fail.
    pub fn fail_reads(&self, fd: MemoryFd) {
        self.lock().failing.insert(fd);
    }

    /// Number of reads issued so far, including ones still waiting at the gate.
    pub fn reads_issued(&self) -> usize {
        self.lock().reads_issued
    }

    /// Number of successful closes through the port.
    pub fn close_count(&self) -> usize {
        self.lock().closes
    }

    /// Let `count` gated reads complete. No effect on an ungated table.
    pub fn release_reads(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }
}

impl core::fmt::Debug for MemoryFiles {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.lock();
        f.debug_struct("MemoryFiles")
            .field("files", &inner.files.len())
            .field("open", &inner.open.len())
            .field("gated", &self.gate.is_some())
            .finish()
    }
}

impl FileAccess for MemoryFiles {
    type Descriptor = MemoryFd;
    type Error = MemoryError;

    async fn open(&self, path: &Path) -> Result<MemoryFd, MemoryError> {
        let mut inner = self.lock();
        let data = inner
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| MemoryError::NotFound(path.to_path_buf()))?;
        Ok(inner.allocate(data))
    }

    async fn read_at(
        &self,
        descriptor: MemoryFd,
        offset: u64,
        mut buf: Vec<u8>,
    ) -> Result<Vec<u8>, MemoryError> {
        self.lock().reads_issued += 1;

        if let Some(gate) = &self.gate {
            // A closed semaphore lets the read through
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let inner = self.lock();
        let data = inner
            .open
            .get(&descriptor)
            .ok_or(MemoryError::BadDescriptor(descriptor))?;
        if inner.failing.contains(&descriptor) {
            return Err(MemoryError::Injected { descriptor, offset });
        }

        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(data.len());
        let count = buf.len().min(data.len() - start);
        buf[..count].copy_from_slice(&data[start..start + count]);
        buf.truncate(count);
        Ok(buf)
    }

    async fn close(&self, descriptor: MemoryFd) -> Result<(), MemoryError> {
        let mut inner = self.lock();
        inner
            .open
            .remove(&descriptor)
            .ok_or(MemoryError::BadDescriptor(descriptor))?;
        inner.failing.remove(&descriptor);
        inner.closes += 1;
        Ok(())
    }
}

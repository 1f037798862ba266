//! POSIX descriptors through `open(2)`, `pread(2)` and `close(2)`.

use fdstream::FileAccess;
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use std::collections::HashMap;
use std::os::fd::RawFd;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinError;

/// Errors raised by [`PosixFiles`].
#[derive(Debug)]
pub enum PosixError {
    /// The syscall failed.
    Os(Errno),
    /// The blocking task panicked or was cancelled.
    Join(JoinError),
}

impl PosixError {
    /// The OS error number, if the syscall itself failed.
    pub fn errno(&self) -> Option<Errno> {
        match self {
            Self::Os(errno) => Some(*errno),
            Self::Join(_) => None,
        }
    }
}

impl core::fmt::Display for PosixError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Os(errno) => write!(f, "{}", errno),
            Self::Join(e) => write!(f, "Blocking task failed: {}", e),
        }
    }
}

impl core::error::Error for PosixError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Os(errno) => Some(errno),
            Self::Join(e) => Some(e),
        }
    }
}

impl From<Errno> for PosixError {
    fn from(errno: Errno) -> Self {
        Self::Os(errno)
    }
}

impl From<JoinError> for PosixError {
    fn from(e: JoinError) -> Self {
        Self::Join(e)
    }
}

/// Run `f` on the blocking pool, or inline when there is no tokio runtime.
async fn maybe_spawn_blocking<F, T>(f: F) -> Result<T, PosixError>
where
    F: FnOnce() -> Result<T, PosixError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => runtime.spawn_blocking(f).await?,
        Err(_) => f(),
    }
}

/// File access through POSIX descriptors.
///
/// Paths are opened read-only with `O_CLOEXEC`. Reads are positional
/// (`pread`), so an adopted descriptor's file offset is never moved and the
/// same descriptor can be streamed again from a different `start`.
///
/// Descriptors that cannot seek (pipes, terminals, sockets) fail `pread`
/// with `ESPIPE`. For those the adapter counts the bytes it has consumed
/// and reads sequentially, discarding input up to the requested offset.
/// A request behind what was already consumed fails with `ESPIPE`. Clones
/// share these counts.
#[derive(Debug, Clone, Default)]
pub struct PosixFiles {
    consumed: Arc<Mutex<HashMap<RawFd, u64>>>,
}

impl PosixFiles {
    /// Create an adapter with no descriptors consumed yet.
    pub fn new() -> Self {
        Self::default()
    }

    fn consumed(&self) -> MutexGuard<'_, HashMap<RawFd, u64>> {
        self.consumed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pread(&self, fd: RawFd, buf: &mut [u8], offset: u64) -> Result<usize, PosixError> {
        let pos = libc::off_t::try_from(offset).map_err(|_| Errno::EOVERFLOW)?;
        // SAFETY: `buf` is valid for writes of `buf.len()` bytes for the whole call
        let count = unsafe { libc::pread(fd, buf.as_mut_ptr().cast(), buf.len(), pos) };

        match Errno::result(count) {
            Ok(count) => Ok(count as usize),
            Err(Errno::ESPIPE) => self.read_sequential(fd, buf, offset),
            Err(errno) => Err(errno.into()),
        }
    }

    fn read_sequential(
        &self,
        fd: RawFd,
        buf: &mut [u8],
        offset: u64,
    ) -> Result<usize, PosixError> {
        let mut consumed = self.consumed().get(&fd).copied().unwrap_or(0);
        if offset < consumed {
            log::debug!(
                "{} is not seekable and already at {}, wanted {}",
                fd,
                consumed,
                offset
            );
            return Err(Errno::ESPIPE.into());
        }

        log::trace!("{} is not seekable, reading sequentially from {}", fd, consumed);
        let result = Self::skip_and_read(fd, buf, offset, &mut consumed);
        self.consumed().insert(fd, consumed);
        result
    }

    fn skip_and_read(
        fd: RawFd,
        buf: &mut [u8],
        offset: u64,
        consumed: &mut u64,
    ) -> Result<usize, PosixError> {
        if buf.is_empty() {
            return Ok(0);
        }

        while *consumed < offset {
            let gap = usize::try_from(offset - *consumed).unwrap_or(usize::MAX);
            let len = gap.min(buf.len());
            let skipped = Self::read(fd, &mut buf[..len])?;
            if skipped == 0 {
                return Ok(0);
            }
            *consumed += skipped as u64;
        }

        let count = Self::read(fd, buf)?;
        *consumed += count as u64;
        Ok(count)
    }

    fn read(fd: RawFd, buf: &mut [u8]) -> Result<usize, PosixError> {
        // SAFETY: as for `pread`
        let count = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        Ok(Errno::result(count)? as usize)
    }
}

impl FileAccess for PosixFiles {
    type Descriptor = RawFd;
    type Error = PosixError;

    async fn open(&self, path: &Path) -> Result<RawFd, PosixError> {
        let path = path.to_path_buf();
        maybe_spawn_blocking(move || {
            let fd = nix::fcntl::open(&path, OFlag::O_RDONLY | OFlag::O_CLOEXEC, Mode::empty())?;
            log::debug!("open({}) = {}", path.display(), fd);
            Ok(fd)
        })
        .await
    }

    async fn read_at(
        &self,
        fd: RawFd,
        offset: u64,
        mut buf: Vec<u8>,
    ) -> Result<Vec<u8>, PosixError> {
        let files = self.clone();
        maybe_spawn_blocking(move || {
            let count = files.pread(fd, &mut buf, offset)?;
            buf.truncate(count);
            Ok(buf)
        })
        .await
    }

    async fn close(&self, fd: RawFd) -> Result<(), PosixError> {
        self.consumed().remove(&fd);
        maybe_spawn_blocking(move || {
            nix::unistd::close(fd)?;
            log::debug!("close({})", fd);
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::fd::IntoRawFd;

    #[tokio::test]
    async fn test_pread_does_not_move_offset() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();

        let files = PosixFiles::new();
        let fd = files.open(file.path()).await.unwrap();
        assert_eq!(files.read_at(fd, 6, vec![0; 5]).await.unwrap(), b"world");
        assert_eq!(files.read_at(fd, 0, vec![0; 5]).await.unwrap(), b"hello");
        assert!(files.read_at(fd, 11, vec![0; 5]).await.unwrap().is_empty());

        files.close(fd).await.unwrap();
    }

    #[tokio::test]
    async fn test_pipe_reads_forward_only() {
        let (read_end, write_end) = nix::unistd::pipe().unwrap();
        std::fs::File::from(write_end).write_all(b"wxyz\n").unwrap();
        let fd = read_end.into_raw_fd();

        let files = PosixFiles::new();
        assert_eq!(files.read_at(fd, 1, vec![0; 2]).await.unwrap(), b"xy");
        assert_eq!(files.read_at(fd, 3, vec![0; 8]).await.unwrap(), b"z\n");
        assert!(files.read_at(fd, 5, vec![0; 8]).await.unwrap().is_empty());

        let err = files.read_at(fd, 0, vec![0; 2]).await.unwrap_err();
        assert_eq!(err.errno(), Some(Errno::ESPIPE));

        files.close(fd).await.unwrap();
    }

    #[tokio::test]
    async fn test_pipe_skip_past_end_is_eof() {
        let (read_end, write_end) = nix::unistd::pipe().unwrap();
        std::fs::File::from(write_end).write_all(b"abc").unwrap();
        let fd = read_end.into_raw_fd();

        let files = PosixFiles::new();
        assert!(files.read_at(fd, 10, vec![0; 2]).await.unwrap().is_empty());
        files.close(fd).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_enoent() {
        let dir = tempfile::tempdir().unwrap();
        let err = PosixFiles::new()
            .open(&dir.path().join("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.errno(), Some(Errno::ENOENT));
    }

    #[tokio::test]
    async fn test_bad_descriptor() {
        let err = PosixFiles::new()
            .read_at(13337, 0, vec![0; 1])
            .await
            .unwrap_err();
        assert_eq!(err.errno(), Some(Errno::EBADF));
    }
}

//! Descriptor handle entity - ownership and disposal state of one descriptor.

use crate::domain::ports::FileAccess;
use std::path::Path;

/// One file descriptor together with who owns it and how far it has been
/// torn down.
///
/// A handle is either **owned** (the stream opened it from a path) or
/// **adopted** (the caller supplied an already-open descriptor). `closed`
/// and `destroyed` only ever go from `false` to `true`; all transitions go
/// through [`close`](Self::close) and [`destroy`](Self::destroy), both of
/// which are idempotent.
///
/// # Disposal rules
///
/// | call | owned | adopted |
/// |------|-------|---------|
/// | `close(force = false)` | physically closes | marks the wrapper only |
/// | `close(force = true)` | physically closes | physically closes |
/// | `destroy(force)` | marks destroyed, then `close` | marks destroyed; closes only if `force` |
///
/// When the open itself failed there is nothing to release: `destroy` leaves
/// `closed == false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorHandle<D> {
    descriptor: Option<D>,
    owned: bool,
    closed: bool,
    destroyed: bool,
}

impl<D: Copy + Eq + core::fmt::Debug> DescriptorHandle<D> {
    /// An owned handle whose descriptor has not been opened yet.
    pub const fn unopened() -> Self {
        Self {
            descriptor: None,
            owned: true,
            closed: false,
            destroyed: false,
        }
    }

    /// Wrap a caller-supplied descriptor. No I/O is performed.
    pub const fn adopt(descriptor: D) -> Self {
        Self {
            descriptor: Some(descriptor),
            owned: false,
            closed: false,
            destroyed: false,
        }
    }

    /// Open `path` through `files` and take ownership of the descriptor.
    ///
    /// Returns the existing descriptor without I/O if one is already present
    /// (an adopted handle, or a second call).
    ///
    /// # Errors
    ///
    /// Returns the file access error unchanged; the handle stays without a
    /// descriptor.
    pub async fn open<F>(&mut self, files: &F, path: &Path) -> Result<D, F::Error>
    where
        F: FileAccess<Descriptor = D>,
    {
        if let Some(descriptor) = self.descriptor {
            return Ok(descriptor);
        }
        debug_assert!(!self.destroyed, "open on a destroyed handle");

        let descriptor = files.open(path).await?;
        log::debug!("opened {} as {:?}", path.display(), descriptor);
        self.descriptor = Some(descriptor);
        Ok(descriptor)
    }

    /// Close the handle.
    ///
    /// No-op when already closed or when there is no descriptor. The
    /// descriptor is physically released when the handle is owned or `force`
    /// is set; otherwise only the wrapper is marked closed.
    ///
    /// # Errors
    ///
    /// Returns the file access error if the physical close fails. The handle
    /// is marked closed regardless, so the descriptor is never closed twice.
    pub async fn close<F>(&mut self, files: &F, force: bool) -> Result<(), F::Error>
    where
        F: FileAccess<Descriptor = D>,
    {
        if self.closed {
            return Ok(());
        }
        let Some(descriptor) = self.descriptor else {
            return Ok(());
        };

        self.closed = true;
        if self.owned || force {
            log::debug!("closing {:?} (owned: {})", descriptor, self.owned);
            files.close(descriptor).await?;
        }
        Ok(())
    }

    /// Destroy the handle: no further reads will be issued through it.
    ///
    /// Also closes it when owned or when `force` is set. Second and later
    /// calls are no-ops.
    ///
    /// # Errors
    ///
    /// Propagates a failed physical close. The handle is marked destroyed
    /// (and closed) regardless.
    pub async fn destroy<F>(&mut self, files: &F, force: bool) -> Result<(), F::Error>
    where
        F: FileAccess<Descriptor = D>,
    {
        if self.destroyed {
            return Ok(());
        }
        self.destroyed = true;
        if self.owned || force {
            self.close(files, true).await?;
        }
        Ok(())
    }

    /// The descriptor, once available.
    #[inline]
    pub const fn descriptor(&self) -> Option<D> {
        self.descriptor
    }

    /// Whether the stream opened the descriptor itself.
    #[inline]
    pub const fn is_owned(&self) -> bool {
        self.owned
    }

    /// Whether the handle has been closed.
    #[inline]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether the handle has been destroyed.
    #[inline]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether reads may be issued through this handle.
    #[inline]
    pub const fn is_readable(&self) -> bool {
        self.descriptor.is_some() && !self.closed && !self.destroyed
    }
}

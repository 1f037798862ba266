//! Adapter-level errors.

use crate::adapters::MemoryFd;
use std::path::PathBuf;

/// Errors raised by [`MemoryFiles`](crate::adapters::MemoryFiles).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// No file was registered under the path.
    NotFound(PathBuf),
    /// The descriptor is not open.
    BadDescriptor(MemoryFd),
    /// A failure injected with `fail_reads`.
    Injected {
        /// Descriptor the read was issued on.
        descriptor: MemoryFd,
        /// Offset of the failed read.
        offset: u64,
    },
}

impl core::fmt::Display for MemoryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "No such file: {}", path.display()),
            Self::BadDescriptor(fd) => write!(f, "Bad descriptor: {}", fd),
            Self::Injected { descriptor, offset } => {
                write!(f, "Injected read failure on {} at offset {}", descriptor, offset)
            }
        }
    }
}

impl core::error::Error for MemoryError {}

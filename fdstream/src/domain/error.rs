//! Domain-level errors.
//!
//! [`ConfigError`] is raised synchronously while a configuration is built and
//! never reaches the stream lifecycle. [`StreamError`] is what the lifecycle
//! reports through its `error` event; its `E` parameter is the error type of
//! the [`FileAccess`](crate::domain::FileAccess) implementation in use.

use core::fmt;
use std::path::PathBuf;

/// Invalid range or option combination.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// `start` is past `end`.
    InvalidRange {
        /// Requested first byte.
        start: u64,
        /// Requested last byte.
        end: u64,
    },
    /// The encoding tag is not supported.
    UnknownEncoding(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRange { start, end } => write!(
                f,
                "\"start\" option must be <= \"end\" option (start: {}, end: {})",
                start, end
            ),
            Self::UnknownEncoding(tag) => write!(f, "Unknown encoding: {:?}", tag),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Why a [`DecodeError`] was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Bytes that can never form a character.
    Invalid,
    /// The stream ended in the middle of a multi-byte character.
    Incomplete,
}

/// Bytes that could not be decoded as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    kind: DecodeErrorKind,
    offset: u64,
    bytes: Vec<u8>,
}

impl DecodeError {
    pub(crate) fn new(kind: DecodeErrorKind, offset: u64, bytes: Vec<u8>) -> Self {
        Self {
            kind,
            offset,
            bytes,
        }
    }

    /// Invalid or truncated.
    #[inline]
    pub const fn kind(&self) -> DecodeErrorKind {
        self.kind
    }

    /// File offset of the first offending byte.
    #[inline]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// The offending bytes.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DecodeErrorKind::Invalid => write!(
                f,
                "Invalid byte sequence {:02x?} at offset {}",
                self.bytes, self.offset
            ),
            DecodeErrorKind::Incomplete => write!(
                f,
                "Stream ended inside a multi-byte character: {:02x?} at offset {}",
                self.bytes, self.offset
            ),
        }
    }
}

impl core::error::Error for DecodeError {}

/// Errors surfaced by a running stream.
///
/// Every variant is terminal for the stream that raised it.
#[derive(Debug)]
#[non_exhaustive]
pub enum StreamError<E> {
    /// Opening the path failed. No descriptor was obtained.
    Open {
        /// The path that could not be opened.
        path: PathBuf,
        /// Error from the file access layer.
        source: E,
    },

    /// A read failed after the descriptor was available.
    Read {
        /// Offset of the failed read.
        offset: u64,
        /// Error from the file access layer.
        source: E,
    },

    /// Text decoding failed.
    Decode(DecodeError),

    /// Releasing the descriptor failed. The handle is still marked closed.
    Close(E),

    /// A read was requested on a handle that has no descriptor yet.
    NotOpen,

    /// A read was requested on a closed or destroyed handle.
    Destroyed,
}

impl<E: fmt::Display> fmt::Display for StreamError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "Failed to open {}: {}", path.display(), source)
            }
            Self::Read { offset, source } => {
                write!(f, "Read failed at offset {}: {}", offset, source)
            }
            Self::Decode(e) => write!(f, "Decode error: {}", e),
            Self::Close(e) => write!(f, "Failed to close descriptor: {}", e),
            Self::NotOpen => write!(f, "Descriptor is not open"),
            Self::Destroyed => write!(f, "Descriptor has been closed or destroyed"),
        }
    }
}

impl<E: core::error::Error + 'static> core::error::Error for StreamError<E> {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Read { source, .. } => Some(source),
            Self::Close(e) => Some(e),
            Self::Decode(e) => Some(e),
            Self::NotOpen | Self::Destroyed => None,
        }
    }
}

impl<E> StreamError<E> {
    /// Whether the error came from opening the source.
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// Whether the error came from a read.
    pub const fn is_read(&self) -> bool {
        matches!(self, Self::Read { .. })
    }

    /// Whether the error came from text decoding.
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

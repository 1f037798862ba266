//! Stream configuration and the validator that builds it.
//!
//! A [`StreamConfig`] is validated once, when it is built, and never changes
//! afterwards. It can be built either from typed values through
//! [`StreamConfigBuilder`] or from a loosely-typed [`RawOptions`] bag (as a
//! CLI or a foreign caller would supply) through [`RangeValidator`].

use crate::domain::{
    error::ConfigError,
    value_objects::{BufferSize, ByteRange, Encoding},
};
use std::path::{Path, PathBuf};

/// What to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source<D> {
    /// A path the stream opens, and therefore owns.
    Path(PathBuf),
    /// A descriptor the caller already opened; the stream borrows it.
    Descriptor(D),
}

impl<D> Source<D> {
    /// The path, when reading from one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => Some(path),
            Self::Descriptor(_) => None,
        }
    }
}

/// Validated, immutable stream configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig<D> {
    source: Source<D>,
    range: ByteRange,
    buffer_size: BufferSize,
    encoding: Option<Encoding>,
    auto_close: bool,
    emit_close: bool,
}

impl<D> StreamConfig<D> {
    /// Start building a configuration for `source`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fdstream::domain::{Source, StreamConfig};
    ///
    /// let config = StreamConfig::<i32>::builder(Source::Path("x.txt".into()))
    ///     .start(1)
    ///     .end(2)
    ///     .buffer_size(1)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.range().len(), Some(2));
    ///
    /// let err = StreamConfig::<i32>::builder(Source::Path("x.txt".into()))
    ///     .start(10)
    ///     .end(2)
    ///     .build();
    /// assert!(err.is_err());
    /// ```
    pub fn builder(source: Source<D>) -> StreamConfigBuilder<D> {
        StreamConfigBuilder::new(source)
    }

    /// What to read.
    #[inline]
    pub fn source(&self) -> &Source<D> {
        &self.source
    }

    /// Byte range to deliver.
    #[inline]
    pub const fn range(&self) -> ByteRange {
        self.range
    }

    /// Maximum bytes per read.
    #[inline]
    pub const fn buffer_size(&self) -> BufferSize {
        self.buffer_size
    }

    /// Text encoding, if chunks are decoded.
    #[inline]
    pub const fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    /// Whether the descriptor is released automatically at end / on error.
    #[inline]
    pub const fn auto_close(&self) -> bool {
        self.auto_close
    }

    /// Whether the final `close` event is emitted.
    #[inline]
    pub const fn emit_close(&self) -> bool {
        self.emit_close
    }
}

/// Typed builder for [`StreamConfig`].
#[derive(Debug, Clone)]
pub struct StreamConfigBuilder<D> {
    source: Source<D>,
    start: Option<u64>,
    end: Option<u64>,
    buffer_size: BufferSize,
    encoding: Option<Encoding>,
    auto_close: bool,
    emit_close: bool,
}

impl<D> StreamConfigBuilder<D> {
    fn new(source: Source<D>) -> Self {
        Self {
            source,
            start: None,
            end: None,
            buffer_size: BufferSize::DEFAULT,
            encoding: None,
            auto_close: true,
            emit_close: true,
        }
    }

    /// Inclusive first byte (default 0).
    pub fn start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }

    /// Inclusive last byte (default: end of file).
    pub fn end(mut self, end: u64) -> Self {
        self.end = Some(end);
        self
    }

    /// Maximum bytes per read; `0` selects the default.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = BufferSize::new(size);
        self
    }

    /// Decode chunks as text.
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Release the descriptor automatically (default `true`).
    pub fn auto_close(mut self, auto_close: bool) -> Self {
        self.auto_close = auto_close;
        self
    }

    /// Emit the final `close` event (default `true`).
    pub fn emit_close(mut self, emit_close: bool) -> Self {
        self.emit_close = emit_close;
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRange`] when `start > end`.
    pub fn build(self) -> Result<StreamConfig<D>, ConfigError> {
        Ok(StreamConfig {
            source: self.source,
            range: RangeValidator::range(self.start, self.end)?,
            buffer_size: self.buffer_size,
            encoding: self.encoding,
            auto_close: self.auto_close,
            emit_close: self.emit_close,
        })
    }
}

/// The loosely-typed option bag.
///
/// Every field is optional; missing fields take their defaults. `buffer_size`
/// is a float so that callers can pass whatever number they were given and
/// let [`RangeValidator`] coerce it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOptions {
    /// Inclusive first byte.
    pub start: Option<u64>,
    /// Inclusive last byte.
    pub end: Option<u64>,
    /// Requested bytes per read, before coercion.
    pub buffer_size: Option<f64>,
    /// Encoding tag such as `"utf8"`.
    pub encoding: Option<String>,
    /// Release the descriptor automatically.
    pub auto_close: Option<bool>,
    /// Emit the final `close` event.
    pub emit_close: Option<bool>,
}

/// Validates and normalizes range and buffer options.
///
/// Pure: no I/O, no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeValidator;

impl RangeValidator {
    /// Build a [`StreamConfig`] from an option bag.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidRange`] when `start > end`
    /// - [`ConfigError::UnknownEncoding`] for an unsupported tag
    pub fn validate<D>(source: Source<D>, raw: &RawOptions) -> Result<StreamConfig<D>, ConfigError> {
        let encoding = raw
            .encoding
            .as_deref()
            .map(str::parse::<Encoding>)
            .transpose()?;

        Ok(StreamConfig {
            source,
            range: Self::range(raw.start, raw.end)?,
            buffer_size: Self::buffer_size(raw.buffer_size),
            encoding,
            auto_close: raw.auto_close.unwrap_or(true),
            emit_close: raw.emit_close.unwrap_or(true),
        })
    }

    /// Validate a range; a missing start means 0, a missing end means EOF.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRange`] when both ends are given and
    /// `start > end`.
    pub fn range(start: Option<u64>, end: Option<u64>) -> Result<ByteRange, ConfigError> {
        ByteRange::new(start.unwrap_or(0), end)
    }

    /// Coerce a raw buffer size. Missing values use the default.
    pub fn buffer_size(raw: Option<f64>) -> BufferSize {
        raw.map(BufferSize::from_lossy).unwrap_or_default()
    }
}

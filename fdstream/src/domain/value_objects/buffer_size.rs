//! Read buffer size value object.

/// Default number of bytes requested per read (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Largest number of bytes requested per read (16 MiB). Larger sizes are
/// clamped to it.
pub const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Maximum number of bytes requested by a single read. Always positive.
///
/// Raw sizes are coerced rather than rejected: zero, negative, NaN and
/// infinite values fall back to [`DEFAULT_BUFFER_SIZE`]. Fractional values are
/// truncated toward zero and anything above [`MAX_BUFFER_SIZE`] is clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferSize(usize);

impl BufferSize {
    /// The default buffer size.
    pub const DEFAULT: Self = Self(DEFAULT_BUFFER_SIZE);

    /// Create a buffer size; `0` falls back to the default.
    ///
    /// # Examples
    ///
    /// ```
    /// use fdstream::domain::{BufferSize, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE};
    ///
    /// assert_eq!(BufferSize::new(16).get(), 16);
    /// assert_eq!(BufferSize::new(0).get(), DEFAULT_BUFFER_SIZE);
    /// assert_eq!(BufferSize::new(usize::MAX).get(), MAX_BUFFER_SIZE);
    /// ```
    pub const fn new(size: usize) -> Self {
        if size == 0 {
            Self::DEFAULT
        } else if size > MAX_BUFFER_SIZE {
            Self(MAX_BUFFER_SIZE)
        } else {
            Self(size)
        }
    }

    /// Coerce an arbitrary numeric value.
    ///
    /// # Examples
    ///
    /// ```
    /// use fdstream::domain::{BufferSize, DEFAULT_BUFFER_SIZE};
    ///
    /// assert_eq!(BufferSize::from_lossy(1.23).get(), 1);
    /// assert_eq!(BufferSize::from_lossy(-4.0).get(), DEFAULT_BUFFER_SIZE);
    /// assert_eq!(BufferSize::from_lossy(f64::NAN).get(), DEFAULT_BUFFER_SIZE);
    /// ```
    pub fn from_lossy(raw: f64) -> Self {
        if !raw.is_finite() || raw < 1.0 {
            return Self::DEFAULT;
        }
        if raw >= MAX_BUFFER_SIZE as f64 {
            return Self(MAX_BUFFER_SIZE);
        }
        Self::new(raw.trunc() as usize)
    }

    /// Coerce a textual value; anything that is not a number uses the default.
    pub fn parse_lossy(raw: &str) -> Self {
        raw.trim()
            .parse::<f64>()
            .map(Self::from_lossy)
            .unwrap_or(Self::DEFAULT)
    }

    /// The size in bytes.
    #[inline]
    pub const fn get(&self) -> usize {
        self.0
    }
}

impl Default for BufferSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<usize> for BufferSize {
    fn from(size: usize) -> Self {
        Self::new(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_is_truncated() {
        assert_eq!(BufferSize::from_lossy(1.23).get(), 1);
        assert_eq!(BufferSize::from_lossy(4096.99).get(), 4096);
    }

    #[test]
    fn test_below_one_falls_back_to_default() {
        assert_eq!(BufferSize::from_lossy(0.5), BufferSize::DEFAULT);
        assert_eq!(BufferSize::from_lossy(0.0), BufferSize::DEFAULT);
        assert_eq!(BufferSize::from_lossy(-1.0), BufferSize::DEFAULT);
    }

    #[test]
    fn test_non_finite_falls_back_to_default() {
        assert_eq!(BufferSize::from_lossy(f64::INFINITY), BufferSize::DEFAULT);
        assert_eq!(BufferSize::from_lossy(f64::NEG_INFINITY), BufferSize::DEFAULT);
        assert_eq!(BufferSize::from_lossy(f64::NAN), BufferSize::DEFAULT);
    }

    #[test]
    fn test_oversized_is_clamped() {
        assert_eq!(BufferSize::from_lossy(1e20).get(), MAX_BUFFER_SIZE);
        assert_eq!(BufferSize::from_lossy(8e9).get(), MAX_BUFFER_SIZE);
        assert_eq!(BufferSize::from_lossy(f64::MAX).get(), MAX_BUFFER_SIZE);
        assert_eq!(BufferSize::new(usize::MAX).get(), MAX_BUFFER_SIZE);
        assert_eq!(BufferSize::new(MAX_BUFFER_SIZE).get(), MAX_BUFFER_SIZE);
        assert_eq!(BufferSize::parse_lossy("1e20").get(), MAX_BUFFER_SIZE);
    }

    #[test]
    fn test_parse_lossy() {
        assert_eq!(BufferSize::parse_lossy(" 8 ").get(), 8);
        assert_eq!(BufferSize::parse_lossy("1.23").get(), 1);
        assert_eq!(BufferSize::parse_lossy("lots"), BufferSize::DEFAULT);
        assert_eq!(BufferSize::parse_lossy(""), BufferSize::DEFAULT);
    }
}

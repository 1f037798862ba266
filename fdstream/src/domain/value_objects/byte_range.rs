//! Inclusive byte range value object.

use crate::domain::error::ConfigError;

/// The inclusive `[start, end]` byte interval of a file to stream.
///
/// `end == None` means "until end of file". A range with a finite end always
/// satisfies `start <= end`; construction fails otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    start: u64,
    end: Option<u64>,
}

impl ByteRange {
    /// Create a validated range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRange`] when `end` is finite and smaller
    /// than `start`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fdstream::domain::ByteRange;
    ///
    /// let range = ByteRange::new(1, Some(2)).unwrap();
    /// assert_eq!(range.len(), Some(2));
    /// assert!(ByteRange::new(10, Some(2)).is_err());
    /// ```
    pub const fn new(start: u64, end: Option<u64>) -> Result<Self, ConfigError> {
        if let Some(end) = end {
            if start > end {
                return Err(ConfigError::InvalidRange { start, end });
            }
        }
        Ok(Self { start, end })
    }

    /// The whole file.
    pub const fn full() -> Self {
        Self {
            start: 0,
            end: None,
        }
    }

    /// Inclusive first byte offset.
    #[inline]
    pub const fn start(&self) -> u64 {
        self.start
    }

    /// Inclusive last byte offset, if bounded.
    #[inline]
    pub const fn end(&self) -> Option<u64> {
        self.end
    }

    /// Exclusive upper bound (`end + 1`), if bounded.
    #[inline]
    pub const fn limit(&self) -> Option<u64> {
        match self.end {
            Some(end) => Some(end.saturating_add(1)),
            None => None,
        }
    }

    /// Number of bytes covered, if bounded.
    #[inline]
    pub const fn len(&self) -> Option<u64> {
        match self.limit() {
            Some(limit) => Some(limit - self.start),
            None => None,
        }
    }

    /// Whether the range reaches end of file.
    #[inline]
    pub const fn is_unbounded(&self) -> bool {
        self.end.is_none()
    }
}

impl Default for ByteRange {
    fn default() -> Self {
        Self::full()
    }
}

impl core::fmt::Display for ByteRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.end {
            Some(end) => write!(f, "[{}, {}]", self.start, end),
            None => write!(f, "[{}, EOF]", self.start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_byte_range() {
        let range = ByteRange::new(0, Some(0)).unwrap();
        assert_eq!(range.limit(), Some(1));
        assert_eq!(range.len(), Some(1));
    }

    #[test]
    fn test_start_after_end_is_rejected() {
        let err = ByteRange::new(10, Some(2)).unwrap_err();
        assert_eq!(err, ConfigError::InvalidRange { start: 10, end: 2 });
    }

    #[test]
    fn test_unbounded_range() {
        let range = ByteRange::new(1, None).unwrap();
        assert!(range.is_unbounded());
        assert_eq!(range.limit(), None);
        assert_eq!(range.len(), None);
        assert_eq!(range.to_string(), "[1, EOF]");
    }

    #[test]
    fn test_limit_saturates_at_max_offset() {
        let range = ByteRange::new(0, Some(u64::MAX)).unwrap();
        assert_eq!(range.limit(), Some(u64::MAX));
    }
}

//! Read cursor entity.

use crate::domain::value_objects::ByteRange;

/// Where the next read starts and how much has been read so far.
///
/// Invariant: `start <= position <= limit`. `bytes_read` counts raw bytes
/// and never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadCursor {
    start: u64,
    position: u64,
    bytes_read: u64,
    limit: Option<u64>,
}

impl ReadCursor {
    /// A cursor positioned at the start of `range`.
    pub const fn new(range: &ByteRange) -> Self {
        Self {
            start: range.start(),
            position: range.start(),
            bytes_read: 0,
            limit: range.limit(),
        }
    }

    /// Offset of the next read.
    #[inline]
    pub const fn position(&self) -> u64 {
        self.position
    }

    /// Total raw bytes read.
    #[inline]
    pub const fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Exclusive upper bound, if any.
    #[inline]
    pub const fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Bytes left before the limit, if bounded.
    #[inline]
    pub const fn remaining(&self) -> Option<u64> {
        match self.limit {
            Some(limit) => Some(limit.saturating_sub(self.position)),
            None => None,
        }
    }

    /// Whether the range is fully consumed.
    #[inline]
    pub const fn is_exhausted(&self) -> bool {
        match self.limit {
            Some(limit) => self.position >= limit,
            None => false,
        }
    }

    /// Length of the next read: `min(buffer_size, limit - position)`.
    pub fn next_request_len(&self, buffer_size: usize) -> usize {
        match self.remaining() {
            Some(remaining) => remaining.min(buffer_size as u64) as usize,
            None => buffer_size,
        }
    }

    /// Record `count` bytes returned by a read at [`position`](Self::position).
    pub fn advance(&mut self, count: usize) {
        let count = count as u64;
        self.position += count;
        self.bytes_read += count;
        debug_assert!(self.position >= self.start);
        debug_assert!(self.limit.is_none_or(|limit| self.position <= limit));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_len_is_clipped_to_range() {
        let range = ByteRange::new(1, Some(2)).unwrap();
        let mut cursor = ReadCursor::new(&range);

        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.next_request_len(64), 2);

        cursor.advance(1);
        assert_eq!(cursor.next_request_len(64), 1);
        cursor.advance(1);
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.next_request_len(64), 0);
        assert_eq!(cursor.bytes_read(), 2);
    }

    #[test]
    fn test_unbounded_cursor_uses_buffer_size() {
        let cursor = ReadCursor::new(&ByteRange::full());
        assert_eq!(cursor.next_request_len(16), 16);
        assert!(!cursor.is_exhausted());
        assert_eq!(cursor.remaining(), None);
    }

    #[test]
    fn test_small_buffer_within_large_range() {
        let range = ByteRange::new(0, Some(99)).unwrap();
        let cursor = ReadCursor::new(&range);
        assert_eq!(cursor.next_request_len(8), 8);
        assert_eq!(cursor.remaining(), Some(100));
    }
}

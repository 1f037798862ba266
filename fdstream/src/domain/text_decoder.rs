//! TextDecoder domain service - incremental decoding across chunk boundaries.

use crate::domain::{
    error::{DecodeError, DecodeErrorKind},
    value_objects::{Chunk, Encoding},
};

/// Text decoded from one or more chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    offset: u64,
    text: String,
}

impl TextChunk {
    /// File offset of the first byte of the first character.
    #[inline]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// The decoded text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Take ownership of the decoded text.
    pub fn into_string(self) -> String {
        self.text
    }
}

/// Decodes a sequence of chunks as text.
///
/// A character whose bytes straddle two chunks is held back in a small carry
/// buffer and emitted with the chunk that completes it. Invalid sequences
/// fail immediately; a carry left over at [`finish`](Self::finish) fails as
/// incomplete.
#[derive(Debug, Clone)]
pub struct TextDecoder {
    encoding: Encoding,
    carry: Vec<u8>,
    carry_offset: u64,
}

impl TextDecoder {
    /// Create a decoder for `encoding`.
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            carry: Vec::with_capacity(encoding.max_char_len()),
            carry_offset: 0,
        }
    }

    /// The configured encoding.
    #[inline]
    pub const fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Bytes held back waiting for the rest of a character.
    #[inline]
    pub fn pending(&self) -> &[u8] {
        &self.carry
    }

    /// Decode `chunk`, prefixed by any carried bytes.
    ///
    /// Returns `None` when the chunk completed no character.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeErrorKind::Invalid`] for bytes that can never start or
    /// continue a character.
    pub fn decode(&mut self, chunk: &Chunk) -> Result<Option<TextChunk>, DecodeError> {
        match self.encoding {
            Encoding::Utf8 => self.decode_utf8(chunk),
        }
    }

    /// Flush the decoder at end of stream.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeErrorKind::Incomplete`] if bytes are still carried.
    pub fn finish(&mut self) -> Result<(), DecodeError> {
        if self.carry.is_empty() {
            return Ok(());
        }
        let bytes = core::mem::take(&mut self.carry);
        Err(DecodeError::new(
            DecodeErrorKind::Incomplete,
            self.carry_offset,
            bytes,
        ))
    }

    fn decode_utf8(&mut self, chunk: &Chunk) -> Result<Option<TextChunk>, DecodeError> {
        let offset = if self.carry.is_empty() {
            chunk.offset()
        } else {
            self.carry_offset
        };

        let mut input = core::mem::take(&mut self.carry);
        input.extend_from_slice(chunk.bytes());

        let text = match String::from_utf8(input) {
            Ok(text) => text,
            Err(err) => {
                let utf8_error = err.utf8_error();
                let valid = utf8_error.valid_up_to();

                if let Some(bad_len) = utf8_error.error_len() {
                    let bytes = err.into_bytes();
                    return Err(DecodeError::new(
                        DecodeErrorKind::Invalid,
                        offset + valid as u64,
                        bytes[valid..valid + bad_len].to_vec(),
                    ));
                }

                // Truncated character at the end: carry it into the next chunk
                let mut bytes = err.into_bytes();
                self.carry = bytes.split_off(valid);
                self.carry_offset = offset + valid as u64;
                String::from_utf8(bytes).map_err(|e| {
                    DecodeError::new(DecodeErrorKind::Invalid, offset, e.into_bytes())
                })?
            }
        };

        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(TextChunk { offset, text }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(bytes: &[u8], chunk_len: usize) -> Result<String, DecodeError> {
        let mut decoder = TextDecoder::new(Encoding::Utf8);
        let mut out = String::new();
        for (i, piece) in bytes.chunks(chunk_len).enumerate() {
            let chunk = Chunk::new((i * chunk_len) as u64, piece.to_vec());
            if let Some(text) = decoder.decode(&chunk)? {
                out.push_str(text.text());
            }
        }
        decoder.finish()?;
        Ok(out)
    }

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(decode_all(b"xyz\n", 1).unwrap(), "xyz\n");
    }

    #[test]
    fn test_split_character_every_split_point() {
        // 2-, 3- and 4-byte characters
        for text in ["é", "…", "𝄞", "a…b", "𝄞x𝄞"] {
            let bytes = text.as_bytes();
            for split in 1..bytes.len() {
                let mut decoder = TextDecoder::new(Encoding::Utf8);
                let mut out = String::new();
                let first = Chunk::new(0, bytes[..split].to_vec());
                let second = Chunk::new(split as u64, bytes[split..].to_vec());
                for chunk in [first, second] {
                    if let Some(t) = decoder.decode(&chunk).unwrap() {
                        out.push_str(t.text());
                    }
                }
                decoder.finish().unwrap();
                assert_eq!(out, text, "split at {split}");
            }
        }
    }

    #[test]
    fn test_single_byte_chunks_of_multibyte_text() {
        let text = "……………";
        assert_eq!(decode_all(text.as_bytes(), 1).unwrap(), text);
        assert_eq!(decode_all(text.as_bytes(), 2).unwrap(), text);
    }

    #[test]
    fn test_partial_character_yields_nothing_yet() {
        let mut decoder = TextDecoder::new(Encoding::Utf8);
        let out = decoder.decode(&Chunk::new(0, vec![0xe2, 0x80])).unwrap();
        assert!(out.is_none());
        assert_eq!(decoder.pending(), &[0xe2, 0x80]);

        let out = decoder.decode(&Chunk::new(2, vec![0xa6, b'!'])).unwrap().unwrap();
        assert_eq!(out.text(), "…!");
        assert_eq!(out.offset(), 0);
    }

    #[test]
    fn test_trailing_partial_character_is_an_error() {
        let mut decoder = TextDecoder::new(Encoding::Utf8);
        let out = decoder.decode(&Chunk::new(0, vec![b'a', 0xe2])).unwrap().unwrap();
        assert_eq!(out.text(), "a");

        let err = decoder.finish().unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::Incomplete);
        assert_eq!(err.offset(), 1);
        assert_eq!(err.bytes(), &[0xe2]);
    }

    #[test]
    fn test_invalid_byte_is_an_error() {
        let mut decoder = TextDecoder::new(Encoding::Utf8);
        let err = decoder.decode(&Chunk::new(10, vec![b'o', b'k', 0xff])).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::Invalid);
        assert_eq!(err.offset(), 12);
        assert_eq!(err.bytes(), &[0xff]);
    }
}

//! Streaming - the read loop and the events it emits.
//!
//! A [`ReadStream`] drives a single file (or descriptor) from open to close,
//! calling a [`StreamListener`] synchronously for every event:
//!
//! ```text
//!   open(fd) ──► data(chunk) ──► data(chunk) ... ──► end ──► close
//!        │              │
//!        └──────────────┴─────► error ──► close
//! ```
//!
//! `close` is always last and is only suppressed by `emit_close(false)`.
//! Flow control goes through the [`StreamControl`] handed to every callback;
//! it can also be cloned and used from another task.

mod flow;
mod read_stream;

pub use flow::{FlowController, Gate, StreamControl};
pub use read_stream::ReadStream;

use crate::domain::{Chunk, StreamError, TextChunk};

/// Payload of a `data` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkData {
    /// Raw bytes, when no encoding is configured.
    Bytes(Chunk),
    /// Decoded text. Never empty.
    Text(TextChunk),
}

impl ChunkData {
    /// File offset of the first byte the payload was produced from.
    pub fn offset(&self) -> u64 {
        match self {
            Self::Bytes(chunk) => chunk.offset(),
            Self::Text(text) => text.offset(),
        }
    }

    /// The payload as bytes (UTF-8 for text).
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Bytes(chunk) => chunk.bytes(),
            Self::Text(text) => text.text().as_bytes(),
        }
    }

    /// The decoded text, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Bytes(_) => None,
            Self::Text(text) => Some(text.text()),
        }
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One lifecycle event.
#[derive(Debug)]
pub enum StreamEvent<D, E> {
    /// The descriptor is available. Not emitted when opening fails.
    Open(D),
    /// One chunk, in file order.
    Data(ChunkData),
    /// The range was fully delivered.
    End,
    /// The stream is finished; always the final event.
    Close,
    /// The stream failed (or disposal failed).
    Error(StreamError<E>),
}

impl<D, E> StreamEvent<D, E> {
    /// Short event name, as used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Open(_) => "open",
            Self::Data(_) => "data",
            Self::End => "end",
            Self::Close => "close",
            Self::Error(_) => "error",
        }
    }
}

/// Receives the events of a [`ReadStream`].
///
/// Callbacks run on the read loop itself, so a `pause` issued from inside a
/// callback takes effect before the next read is issued. Closures
/// implement this trait.
pub trait StreamListener<D, E> {
    /// Handle one event.
    fn on_event(&mut self, event: StreamEvent<D, E>, control: &StreamControl);
}

impl<D, E, T> StreamListener<D, E> for T
where
    T: FnMut(StreamEvent<D, E>, &StreamControl),
{
    fn on_event(&mut self, event: StreamEvent<D, E>, control: &StreamControl) {
        self(event, control)
    }
}

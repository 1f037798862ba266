//! Ranged, flow-controlled file read streams.
//!
//! This crate reads a byte range of a file (or of an already-open
//! descriptor) as a sequence of chunks, with pause/resume backpressure,
//! incremental text decoding across chunk boundaries and explicit
//! descriptor ownership. It is structured using hexagonal architecture
//! (ports and adapters pattern).
//!
//! # Architecture
//!
//! The crate is organized into three layers:
//!
//! ## Domain Layer (`domain`)
//! Stream rules with no runtime dependencies:
//! - **Entities**: `DescriptorHandle`, `ReadCursor`, `Lifecycle`
//! - **Value Objects**: `ByteRange`, `BufferSize`, `Encoding`, `Chunk`
//! - **Services**: `ChunkReader`, `TextDecoder`, `RangeValidator`
//! - **Ports**: `FileAccess` interface
//!
//! ## Adapter Layer (`adapters`)
//! Implementations of the port:
//! - **`MemoryFiles`**: in-memory files with read gating and fault injection
//!
//! POSIX descriptors live in the `fdstream-platform` crate.
//!
//! ## Infrastructure Layer (`infrastructure`)
//! - **`ReadStream`**: drives one stream from open to close
//! - **`StreamControl`**: pause / resume / destroy from anywhere
//!
//! # Quick Start
//!
//! ```ignore
//! use fdstream::{ReadStream, Source, StreamConfig, StreamEvent};
//!
//! let config = StreamConfig::builder(Source::Path("data.txt".into()))
//!     .start(1)
//!     .end(2)
//!     .build()?;
//! let mut stream = ReadStream::new(files, config);
//!
//! stream
//!     .run(&mut |event, control: &StreamControl| match event {
//!         StreamEvent::Data(data) => {
//!             control.pause();
//!             consume(data.as_bytes());
//!         }
//!         StreamEvent::Error(e) => eprintln!("{}", e),
//!         _ => {}
//!     })
//!     .await;
//! ```
//!
//! # Events
//!
//! `open` → `data`* → `end` → `close` on success; `error` → `close` on
//! failure. `open` is never emitted when the path cannot be opened.

#![warn(missing_docs)]
#![allow(async_fn_in_trait)]

// Core layers
pub mod adapters;
pub mod domain;
pub mod infrastructure;

pub use domain::{
    BufferSize, ByteRange, Chunk, ConfigError, DEFAULT_BUFFER_SIZE, DecodeError, DecodeErrorKind,
    Encoding, FileAccess, MAX_BUFFER_SIZE, RawOptions, Source, StreamConfig, StreamError,
    StreamState, TextChunk,
};
pub use infrastructure::{ChunkData, ReadStream, StreamControl, StreamEvent, StreamListener};

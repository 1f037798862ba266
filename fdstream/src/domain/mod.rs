//! Domain layer - the stream's rules with no runtime or OS dependencies.
//!
//! The domain layer contains:
//! - **Value Objects**: validated immutable data (`ByteRange`, `BufferSize`,
//!   `Encoding`, `Chunk`)
//! - **Entities**: state that changes over a stream's life (`DescriptorHandle`,
//!   `ReadCursor`, `Lifecycle`)
//! - **Domain Services**: `ChunkReader`, `TextDecoder`, `RangeValidator`
//! - **Ports**: the `FileAccess` interface to the outside world
//! - **Domain Errors**: `ConfigError`, `StreamError`
//!
//! ```text
//!     ┌──────────────────────────────────┐
//!     │      Domain Layer (Core)         │
//!     │                                  │
//!     │  ┌────────────────────────────┐  │
//!     │  │  Entities & Value Objects  │  │
//!     │  │  DescriptorHandle, Chunk   │  │
//!     │  └────────────────────────────┘  │
//!     │              ▲                   │
//!     │  ┌────────────────────────────┐  │
//!     │  │    Domain Services         │  │
//!     │  │  ChunkReader, TextDecoder  │  │
//!     │  └────────────────────────────┘  │
//!     │              │                   │
//!     │              ▼                   │
//!     │  ┌────────────────────────────┐  │
//!     │  │    Ports (Interfaces)      │  │
//!     │  │    FileAccess              │  │
//!     │  └────────────────────────────┘  │
//!     └──────────────────────────────────┘
//!                    ▲
//!                    │ implemented by
//!     ┌──────────────────────────────────┐
//!     │  MemoryFiles / PosixFiles        │
//!     └──────────────────────────────────┘
//! ```

pub mod entities;
pub mod error;
pub mod ports;
pub mod value_objects;

mod chunk_reader;
mod config;
mod text_decoder;

pub use chunk_reader::{ChunkReader, ReadOutcome};
pub use config::{RangeValidator, RawOptions, Source, StreamConfig, StreamConfigBuilder};
pub use entities::{DescriptorHandle, Lifecycle, ReadCursor, StreamState};
pub use error::{ConfigError, DecodeError, DecodeErrorKind, StreamError};
pub use ports::FileAccess;
pub use text_decoder::{TextChunk, TextDecoder};
pub use value_objects::{
    BufferSize, ByteRange, Chunk, DEFAULT_BUFFER_SIZE, Encoding, MAX_BUFFER_SIZE,
};

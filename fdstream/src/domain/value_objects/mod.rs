//! Value objects for the domain layer.
//!
//! Value objects are immutable, validated data types. Validation happens once,
//! when they are built, so the read loop never re-checks them.

mod buffer_size;
mod byte_range;
mod chunk;
mod encoding;

pub use buffer_size::{BufferSize, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE};
pub use byte_range::ByteRange;
pub use chunk::Chunk;
pub use encoding::Encoding;

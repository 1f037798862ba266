//! Domain entities: objects whose state changes over a stream's life.

mod descriptor_handle;
mod read_cursor;
mod stream_state;

pub use descriptor_handle::DescriptorHandle;
pub use read_cursor::ReadCursor;
pub use stream_state::{Lifecycle, StreamState};

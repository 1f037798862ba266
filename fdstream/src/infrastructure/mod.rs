//! Infrastructure layer - the runtime-facing stream built on the domain.
//!
//! This module turns the domain services into a driven lifecycle: it owns
//! the read loop, the pause gate and event delivery.

pub mod streaming;

pub use streaming::{
    ChunkData, FlowController, Gate, ReadStream, StreamControl, StreamEvent, StreamListener,
};

//! Adapter layer - implementations of the domain's ports.
//!
//! ```text
//!     ┌──────────────────────────────────┐
//!     │      Domain Layer                │
//!     │  - ChunkReader (service)         │
//!     │  - FileAccess (port)             │
//!     └────────────┬─────────────────────┘
//!                  │
//!                  │ implements
//!                  ▼
//!     ┌──────────────────────────────────┐
//!     │      Adapter Layer               │  ◄── This module
//!     │  - MemoryFiles                   │
//!     └──────────────────────────────────┘
//! ```
//!
//! Operating-system descriptors are provided by the `fdstream-platform` crate.

mod error;
mod memory_files;

pub use error::MemoryError;
pub use memory_files::{MemoryFd, MemoryFiles};

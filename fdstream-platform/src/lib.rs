//! Operating-system implementations of the `fdstream` file access port.
//!
//! | Platform | Adapter | Descriptor |
//! |----------|---------|------------|
//! | Linux / macOS / other unix | [`PosixFiles`] | `RawFd` |
//!
//! Every syscall runs on tokio's blocking pool when a runtime is available,
//! so a slow disk never stalls the reactor.
//!
//! # Example
//!
//! ```ignore
//! use fdstream::{ReadStream, Source, StreamConfig};
//! use fdstream_platform::PosixFiles;
//!
//! let config = StreamConfig::builder(Source::Path("/etc/hostname".into())).build()?;
//! let mut stream = ReadStream::new(PosixFiles::new(), config);
//! stream.run(&mut listener).await;
//! ```

#![warn(missing_docs)]

#[cfg(unix)]
mod posix;

#[cfg(unix)]
pub use posix::{PosixError, PosixFiles};

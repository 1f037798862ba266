//! `fdcat` - print a byte range of a file or descriptor.
//!
//! The binary is a thin wrapper around [`cli::run`]; the pieces are exposed
//! as a library so they can be tested and reused.

pub mod app;
pub mod cli;
pub mod source_spec;

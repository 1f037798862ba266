//! Ports define the interfaces between the domain and the outside world.
//!
//! This module contains the **secondary (driven) ports** that the domain
//! depends on for infrastructure concerns like file access.

mod file_access;

pub use file_access::FileAccess;

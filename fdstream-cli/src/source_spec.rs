//! Parsing of `fdcat` source and range arguments.
//!
//! # Source Notation
//!
//! - `fd:N` - an inherited, already-open descriptor (e.g. `fd:3`)
//! - `-` - standard input (descriptor 0)
//! - anything else - a path on the host filesystem
//!
//! A file literally named `fd:3` can still be read as `./fd:3`.

use anyhow::{Context, Result};
use fdstream::Source;
use std::os::fd::RawFd;
use std::path::PathBuf;
use std::str::FromStr;

const STDIN_FD: RawFd = 0;

/// A parsed source argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// A path the stream opens itself.
    Path(PathBuf),
    /// A descriptor inherited from the parent process.
    Descriptor(RawFd),
    /// Standard input.
    Stdin,
}

impl SourceSpec {
    /// Parse a source argument.
    ///
    /// # Examples
    ///
    /// ```
    /// use fdstream_cli::source_spec::SourceSpec;
    ///
    /// assert_eq!(SourceSpec::parse("fd:3").unwrap(), SourceSpec::Descriptor(3));
    /// assert_eq!(SourceSpec::parse("-").unwrap(), SourceSpec::Stdin);
    /// assert!(matches!(SourceSpec::parse("notes.txt").unwrap(), SourceSpec::Path(_)));
    /// ```
    pub fn parse(spec: &str) -> Result<Self> {
        if spec.is_empty() {
            anyhow::bail!("Source must not be empty");
        }
        if spec == "-" {
            return Ok(Self::Stdin);
        }
        if let Some(number) = spec.strip_prefix("fd:") {
            let fd: RawFd = number
                .parse()
                .with_context(|| format!("Invalid descriptor number in '{}'", spec))?;
            if fd < 0 {
                anyhow::bail!("Descriptor must not be negative: {}", fd);
            }
            return Ok(Self::Descriptor(fd));
        }
        Ok(Self::Path(PathBuf::from(spec)))
    }

    /// Whether the stream adopts a descriptor instead of opening one.
    pub fn is_adopted(&self) -> bool {
        !matches!(self, Self::Path(_))
    }

    /// The stream source.
    pub fn to_source(&self) -> Source<RawFd> {
        match self {
            Self::Path(path) => Source::Path(path.clone()),
            Self::Descriptor(fd) => Source::Descriptor(*fd),
            Self::Stdin => Source::Descriptor(STDIN_FD),
        }
    }
}

impl FromStr for SourceSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl core::fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Descriptor(fd) => write!(f, "fd:{}", fd),
            Self::Stdin => write!(f, "<stdin>"),
        }
    }
}

/// An inclusive byte span given as `A-B`, `A-` or `-B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteSpan {
    /// First byte, if given.
    pub start: Option<u64>,
    /// Last byte, if given.
    pub end: Option<u64>,
}

/// Parse a byte span.
///
/// Ordering is not checked here; `start > end` is reported by the stream
/// configuration with its own message.
pub fn parse_span(spec: &str) -> Result<ByteSpan> {
    let (start, end) = spec
        .split_once('-')
        .with_context(|| format!("Range '{}' must look like A-B, A- or -B", spec))?;

    let bound = |text: &str, name: &str| -> Result<Option<u64>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        text.parse()
            .map(Some)
            .with_context(|| format!("Invalid {} offset '{}' in range '{}'", name, text, spec))
    };

    Ok(ByteSpan {
        start: bound(start, "start")?,
        end: bound(end, "end")?,
    })
}

//! Text encoding tag.

use crate::domain::error::ConfigError;
use core::fmt;
use core::str::FromStr;

/// Codec used to turn raw chunks into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Encoding {
    /// UTF-8.
    Utf8,
}

impl Encoding {
    /// Canonical tag.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf8",
        }
    }

    /// Longest byte sequence encoding a single character.
    pub const fn max_char_len(&self) -> usize {
        match self {
            Self::Utf8 => 4,
        }
    }
}

impl FromStr for Encoding {
    type Err = ConfigError;

    /// Parse a codec tag, ignoring case. `utf8` and `utf-8` are accepted.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            _ => Err(ConfigError::UnknownEncoding(tag.to_string())),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

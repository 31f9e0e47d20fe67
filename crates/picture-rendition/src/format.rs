//! Output formats and the format registry

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

/// Formats accepted by the `format-X` filter operation
pub const SUPPORTED_FORMATS: [&str; 5] = ["jpeg", "png", "gif", "webp", "avif"];

/// An output encoding requested for a rendition
///
/// Ordering compares format names lexically, which is the fallback order
/// the resolver uses (descending).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutputFormat {
    /// `jpeg` (files use the `.jpg` extension)
    Jpeg,
    /// `png`
    Png,
    /// `gif`
    Gif,
    /// `webp`
    Webp,
    /// `avif`
    Avif,
    /// Any other name; rejected by filter validation
    Other(String),
}

impl OutputFormat {
    /// Format name as used in `format-X`
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
            Self::Avif => "avif",
            Self::Other(name) => name,
        }
    }

    /// File extension (without dot)
    #[must_use]
    pub fn extension(&self) -> &str {
        match self {
            Self::Jpeg => "jpg",
            other => other.as_str(),
        }
    }

    /// Whether the format registry accepts this format
    #[inline]
    #[must_use]
    pub fn is_registered(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Guess the format of an original from its file extension
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Self::Jpeg,
            other => Self::from(other),
        }
    }
}

impl From<&str> for OutputFormat {
    fn from(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "jpeg" => Self::Jpeg,
            "png" => Self::Png,
            "gif" => Self::Gif,
            "webp" => Self::Webp,
            "avif" => Self::Avif,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for OutputFormat {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<OutputFormat> for String {
    fn from(format: OutputFormat) -> Self {
        format.as_str().to_string()
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialOrd for OutputFormat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OutputFormat {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

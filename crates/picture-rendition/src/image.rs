//! Catalogued source images

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Region of interest used by cropping operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FocalPoint {
    /// Centre x
    pub x: u32,
    /// Centre y
    pub y: u32,
    /// Region width
    pub width: u32,
    /// Region height
    pub height: u32,
}

/// An original image as exposed by the image catalog
///
/// Read-only to the picture tag. `file_hash` identifies the pixel content
/// and feeds the markup cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceImage {
    /// Catalog identifier
    pub id: u64,
    /// Title, used as alt text
    pub title: String,
    /// Original file name (basename)
    pub filename: String,
    /// Stable content hash of the original file
    pub file_hash: String,
    /// Natural width in pixels
    pub width: u32,
    /// Natural height in pixels
    pub height: u32,
    /// Optional focal point
    #[serde(default)]
    pub focal_point: Option<FocalPoint>,
}

impl SourceImage {
    /// Create image without focal point
    #[must_use]
    pub fn new(
        id: u64,
        title: impl Into<String>,
        filename: impl Into<String>,
        file_hash: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            filename: filename.into(),
            file_hash: file_hash.into(),
            width,
            height,
            focal_point: None,
        }
    }

    /// With focal point
    #[inline]
    #[must_use]
    pub fn with_focal_point(mut self, focal_point: FocalPoint) -> Self {
        self.focal_point = Some(focal_point);
        self
    }

    /// Alt text for the rendered `<img>`
    #[inline]
    #[must_use]
    pub fn alt(&self) -> &str {
        &self.title
    }

    /// File name without directory and extension
    #[must_use]
    pub fn stem(&self) -> &str {
        Path::new(&self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.filename)
    }

    /// Extension of the original file (without dot, may be empty)
    #[must_use]
    pub fn extension(&self) -> &str {
        Path::new(&self.filename)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
    }
}

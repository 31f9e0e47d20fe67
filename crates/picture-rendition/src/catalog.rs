//! Image catalog lookup

use crate::image::SourceImage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolves a template image expression to a catalogued image
pub trait ImageCatalog: Send + Sync {
    /// `None` when the expression names no image
    fn resolve(&self, expr: &str) -> Option<SourceImage>;
}

/// Catalog backed by a name → image map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemoryCatalog {
    images: BTreeMap<String, SourceImage>,
}

impl InMemoryCatalog {
    /// Create empty catalog
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With image bound to `name`
    #[must_use]
    pub fn with_image(mut self, name: impl Into<String>, image: SourceImage) -> Self {
        self.insert(name, image);
        self
    }

    /// Bind `name` to `image`
    pub fn insert(&mut self, name: impl Into<String>, image: SourceImage) {
        self.images.insert(name.into(), image);
    }

    /// Parse a JSON object of name → image
    ///
    /// # Errors
    /// Returns error if the JSON does not describe a catalog.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Number of images
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the catalog is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageCatalog for InMemoryCatalog {
    fn resolve(&self, expr: &str) -> Option<SourceImage> {
        self.images.get(expr.trim()).cloned()
    }
}

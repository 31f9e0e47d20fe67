//! Renditions and the rendition service contract

use crate::error::RenditionError;
use crate::filter::FilterSpec;
use crate::image::SourceImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A concrete generated variant of a source image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendition {
    /// Full spec the rendition was produced for (including `format-X`)
    pub filter_spec: String,
    /// Public URL
    pub url: String,
    /// Stored file name; its extension determines the MIME type
    pub file_name: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Stored byte size; `None` when the file is missing from storage
    pub file_size: Option<u64>,
}

impl Rendition {
    /// Extension of the stored file (without dot, may be empty)
    #[must_use]
    pub fn extension(&self) -> &str {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
    }
}

/// A derived variant to register with the rendition store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRendition {
    /// Spec the variant is registered under
    pub filter_spec: String,
    /// Focal-point key the variant is registered under
    pub focal_point_key: String,
    /// File name to store the data as
    pub file_name: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Encoded bytes
    pub data: Vec<u8>,
}

/// Storage backend that produces and looks up renditions
///
/// Implementations own pixel work and storage; the picture tag only
/// selects and orders what they return. Calls may be slow; no timeouts are
/// imposed by callers.
pub trait RenditionService: Send + Sync {
    /// Validate a spec against this backend
    ///
    /// # Errors
    /// Returns [`RenditionError::InvalidFilterSpec`] for specs the backend
    /// cannot process.
    fn validate(&self, spec: &str) -> Result<FilterSpec, RenditionError> {
        FilterSpec::parse(spec).map_err(|e| RenditionError::invalid_spec(spec, e))
    }

    /// Key capturing everything besides the spec that varies a rendition
    fn cache_key(&self, image: &SourceImage, spec: &FilterSpec) -> String {
        spec.focal_point_key(image)
    }

    /// Get or generate the rendition for `spec`
    ///
    /// # Errors
    /// [`RenditionError::InvalidFilterSpec`] for malformed or unsupported
    /// specs; other variants for backend failures.
    fn get_rendition(&self, image: &SourceImage, spec: &str) -> Result<Rendition, RenditionError>;

    /// Look up an already registered rendition without generating one
    fn find_rendition(
        &self,
        image: &SourceImage,
        spec: &str,
        focal_point_key: &str,
    ) -> Option<Rendition>;

    /// Encode `source` as AVIF
    ///
    /// # Errors
    /// [`RenditionError::Encode`] if the encoder is unavailable or fails.
    fn encode_avif(&self, source: &Rendition) -> Result<Vec<u8>, RenditionError>;

    /// Register a derived variant, returning the existing one if a
    /// rendition with the same spec and focal-point key is already stored
    ///
    /// # Errors
    /// [`RenditionError::Storage`] if the variant cannot be stored.
    fn register_rendition(
        &self,
        image: &SourceImage,
        rendition: NewRendition,
    ) -> Result<Rendition, RenditionError>;
}

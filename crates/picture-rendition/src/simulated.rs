//! Deterministic in-memory rendition backend
//!
//! Computes geometry from the filter grammar and names files the way a
//! storage-backed service does:
//!
//! ```text
//! <stem>.<focal-point key>.<spec with | as .>.<ext>
//! mock_img.2c6a1f0e.fill-100x100.format-webp.webp
//! ```
//!
//! Byte sizes are estimated per format so that AVIF < WebP < JPEG < PNG for
//! the same geometry.

use crate::error::{FilterSpecError, RenditionError};
use crate::filter::FilterSpec;
use crate::format::OutputFormat;
use crate::image::SourceImage;
use crate::rendition::{NewRendition, Rendition, RenditionService};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Simulator behaviour switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Prefix prepended to file names to form URLs
    pub url_prefix: String,
    /// Accept `format-avif` directly
    pub native_avif: bool,
    /// Whether [`RenditionService::encode_avif`] succeeds
    pub avif_encoder: bool,
    /// Report byte sizes (off simulates files missing from storage)
    pub report_file_sizes: bool,
    /// Maximum stored file name length
    pub max_file_name: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            url_prefix: "/images".to_string(),
            native_avif: false,
            avif_encoder: true,
            report_file_sizes: true,
            max_file_name: 59,
        }
    }
}

impl SimulatorConfig {
    /// With native AVIF support
    #[inline]
    #[must_use]
    pub fn with_native_avif(mut self, enabled: bool) -> Self {
        self.native_avif = enabled;
        self
    }

    /// With AVIF encoder availability
    #[inline]
    #[must_use]
    pub fn with_avif_encoder(mut self, enabled: bool) -> Self {
        self.avif_encoder = enabled;
        self
    }

    /// With byte size reporting
    #[inline]
    #[must_use]
    pub fn with_file_sizes(mut self, enabled: bool) -> Self {
        self.report_file_sizes = enabled;
        self
    }
}

type StoreKey = (u64, String, String);

/// In-memory [`RenditionService`]
///
/// Every generated or registered rendition is kept so repeated requests
/// return the same variant. Counts calls that would reach storage.
#[derive(Debug, Default)]
pub struct SimulatedRenditionService {
    config: SimulatorConfig,
    store: Mutex<HashMap<StoreKey, Rendition>>,
    calls: AtomicUsize,
}

impl SimulatedRenditionService {
    /// Create with default behaviour
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with specific behaviour
    #[inline]
    #[must_use]
    pub fn with_config(config: SimulatorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Behaviour switches
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Storage calls made so far (get, find, encode, register)
    #[inline]
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Reset the call counter
    #[inline]
    pub fn reset_calls(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }

    /// Number of stored renditions
    #[must_use]
    pub fn rendition_count(&self) -> usize {
        self.store.lock().len()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn file_name(&self, image: &SourceImage, suffix: &str) -> String {
        let budget = self
            .config
            .max_file_name
            .saturating_sub(suffix.chars().count())
            .max(1);
        let stem: String = image.stem().chars().take(budget).collect();
        format!("{stem}.{suffix}")
    }

    fn url(&self, file_name: &str) -> String {
        format!("{}/{}", self.config.url_prefix.trim_end_matches('/'), file_name)
    }

    fn estimate_size(&self, format: &OutputFormat, width: u32, height: u32) -> Option<u64> {
        if !self.config.report_file_sizes {
            return None;
        }
        let per_pixel = match format {
            OutputFormat::Avif => 0.05,
            OutputFormat::Webp => 0.08,
            OutputFormat::Jpeg => 0.12,
            OutputFormat::Gif => 0.3,
            OutputFormat::Png => 0.5,
            OutputFormat::Other(_) => 1.0,
        };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let bytes = (f64::from(width) * f64::from(height) * per_pixel).ceil() as u64;
        Some(bytes.max(1))
    }
}

impl RenditionService for SimulatedRenditionService {
    fn get_rendition(&self, image: &SourceImage, spec: &str) -> Result<Rendition, RenditionError> {
        self.record_call();
        let filter = self.validate(spec)?;
        let format = filter
            .output_format()
            .cloned()
            .unwrap_or_else(|| OutputFormat::from_extension(image.extension()));
        if format == OutputFormat::Avif && !self.config.native_avif {
            return Err(RenditionError::invalid_spec(
                spec,
                FilterSpecError::UnsupportedFormat(format.to_string()),
            ));
        }

        let focal_point_key = self.cache_key(image, &filter);
        let mut store = self.store.lock();
        let key = (image.id, filter.as_str().to_string(), focal_point_key.clone());
        if let Some(existing) = store.get(&key) {
            return Ok(existing.clone());
        }

        let (width, height) = filter.output_size(image.width, image.height);
        let suffix = if focal_point_key.is_empty() {
            format!("{}.{}", filter.file_suffix(), format.extension())
        } else {
            format!("{focal_point_key}.{}.{}", filter.file_suffix(), format.extension())
        };
        let file_name = self.file_name(image, &suffix);
        let rendition = Rendition {
            filter_spec: filter.as_str().to_string(),
            url: self.url(&file_name),
            file_name,
            width,
            height,
            file_size: self.estimate_size(&format, width, height),
        };
        tracing::debug!(spec, file = %rendition.file_name, "generated rendition");
        store.insert(key, rendition.clone());
        Ok(rendition)
    }

    fn find_rendition(
        &self,
        image: &SourceImage,
        spec: &str,
        focal_point_key: &str,
    ) -> Option<Rendition> {
        self.record_call();
        self.store
            .lock()
            .get(&(image.id, spec.to_string(), focal_point_key.to_string()))
            .cloned()
    }

    fn encode_avif(&self, source: &Rendition) -> Result<Vec<u8>, RenditionError> {
        self.record_call();
        if !self.config.avif_encoder {
            return Err(RenditionError::Encode("no AVIF encoder available".to_string()));
        }
        let size = self
            .estimate_size(&OutputFormat::Avif, source.width, source.height)
            .unwrap_or(1);
        Ok(vec![0; usize::try_from(size).unwrap_or(1)])
    }

    fn register_rendition(
        &self,
        image: &SourceImage,
        rendition: NewRendition,
    ) -> Result<Rendition, RenditionError> {
        self.record_call();
        let report_sizes = self.config.report_file_sizes;
        let key = (
            image.id,
            rendition.filter_spec.clone(),
            rendition.focal_point_key.clone(),
        );
        let stored = self
            .store
            .lock()
            .entry(key)
            .or_insert_with(|| Rendition {
                url: self.url(&rendition.file_name),
                filter_spec: rendition.filter_spec,
                file_name: rendition.file_name,
                width: rendition.width,
                height: rendition.height,
                file_size: report_sizes.then_some(rendition.data.len() as u64),
            })
            .clone();
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> SourceImage {
        SourceImage::new(1, "mock", "mock_img.jpg", "hash", 100, 100)
    }

    #[test]
    fn names_follow_storage_convention() {
        let service = SimulatedRenditionService::new();
        let rendition = service.get_rendition(&image(), "width-50|format-jpeg").unwrap();
        assert_eq!(rendition.file_name, "mock_img.width-50.format-jpeg.jpg");
        assert_eq!(rendition.url, "/images/mock_img.width-50.format-jpeg.jpg");
        assert_eq!((rendition.width, rendition.height), (50, 50));
    }

    #[test]
    fn fill_names_carry_focal_point_key() {
        let service = SimulatedRenditionService::new();
        let rendition = service.get_rendition(&image(), "fill-10x10|format-webp").unwrap();
        let parts: Vec<_> = rendition.file_name.split('.').collect();
        assert_eq!(parts[0], "mock_img");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(&parts[2..], ["fill-10x10", "format-webp", "webp"]);
    }

    #[test]
    fn avif_requires_native_support() {
        let service = SimulatedRenditionService::new();
        let err = service
            .get_rendition(&image(), "width-50|format-avif")
            .unwrap_err();
        assert!(err.is_invalid_filter_spec());

        let native = SimulatedRenditionService::with_config(
            SimulatorConfig::default().with_native_avif(true),
        );
        assert!(native.get_rendition(&image(), "width-50|format-avif").is_ok());
    }

    #[test]
    fn sizes_order_formats() {
        let service = SimulatedRenditionService::new();
        let size = |spec: &str| service.get_rendition(&image(), spec).unwrap().file_size.unwrap();
        assert!(size("width-50|format-webp") < size("width-50|format-jpeg"));
        assert!(size("width-50|format-jpeg") < size("width-50|format-png"));
    }

    #[test]
    fn missing_sizes_when_disabled() {
        let service = SimulatedRenditionService::with_config(
            SimulatorConfig::default().with_file_sizes(false),
        );
        let rendition = service.get_rendition(&image(), "width-50|format-webp").unwrap();
        assert!(rendition.file_size.is_none());
    }

    #[test]
    fn register_is_get_or_create() {
        let service = SimulatedRenditionService::new();
        let new = NewRendition {
            filter_spec: "width-50|format-avif".to_string(),
            focal_point_key: String::new(),
            file_name: "mock_img.width-50.format-avif.avif".to_string(),
            width: 50,
            height: 50,
            data: vec![0; 10],
        };
        let first = service.register_rendition(&image(), new.clone()).unwrap();
        let second = service
            .register_rendition(&image(), NewRendition { data: vec![0; 99], ..new })
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first.file_size, Some(10));
        assert_eq!(
            service.find_rendition(&image(), "width-50|format-avif", ""),
            Some(first)
        );
        assert_eq!(service.calls(), 3);
    }

    #[test]
    fn encoder_can_be_disabled() {
        let service = SimulatedRenditionService::with_config(
            SimulatorConfig::default().with_avif_encoder(false),
        );
        let base = service.get_rendition(&image(), "width-50|format-webp").unwrap();
        assert!(matches!(
            service.encode_avif(&base),
            Err(RenditionError::Encode(_))
        ));
    }
}

//! Per-spec rendition retrieval
//!
//! Every non-AVIF format is requested directly as `<spec>|format-<fmt>`, in
//! descending name order. AVIF goes through a fallback chain because many
//! backends cannot produce it from a filter spec:
//!
//! 1. direct: `get_rendition("<spec>|format-avif")`
//! 2. registry: an AVIF variant registered earlier under the same spec and
//!    focal-point key
//! 3. derive: encode the spec's first rendition as AVIF and register it
//!
//! Step 2 only runs when step 1 rejects the spec. Any failure omits AVIF for
//! that spec.

use crate::formats::FormatSet;
use picture_rendition::{
    FilterSpec, NewRendition, OutputFormat, Rendition, RenditionError, RenditionService,
    SourceImage,
};

/// Why no AVIF rendition was produced
#[derive(Debug, thiserror::Error)]
pub enum AvifError {
    /// Derivation needs a rendition of the same spec to encode from
    #[error("no base rendition to derive AVIF from")]
    NoBaseRendition,

    /// The rendition service failed
    #[error(transparent)]
    Rendition(#[from] RenditionError),
}

/// Renditions produced for one filter spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRenditions {
    /// The validated spec
    pub spec: FilterSpec,
    /// Renditions in retrieval order (AVIF last)
    pub renditions: Vec<Rendition>,
}

/// Requests renditions for each format of a spec
#[derive(Clone, Copy)]
pub struct FormatResolver<'a> {
    service: &'a dyn RenditionService,
    avif_name_budget: usize,
}

impl std::fmt::Debug for FormatResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatResolver")
            .field("avif_name_budget", &self.avif_name_budget)
            .finish_non_exhaustive()
    }
}

impl<'a> FormatResolver<'a> {
    /// Create resolver over a rendition service
    #[inline]
    #[must_use]
    pub fn new(service: &'a dyn RenditionService, avif_name_budget: usize) -> Self {
        Self {
            service,
            avif_name_budget,
        }
    }

    /// Renditions of `spec` in every requested format
    ///
    /// `None` when the spec is empty or fails validation. Individual
    /// formats the service cannot produce are skipped.
    #[must_use]
    pub fn resolve(
        &self,
        image: &SourceImage,
        spec: &str,
        formats: &FormatSet,
    ) -> Option<SpecRenditions> {
        if spec.is_empty() {
            return None;
        }
        let filter = match self.service.validate(spec) {
            Ok(filter) => filter,
            Err(e) => {
                tracing::debug!(spec, error = %e, "skipping invalid filter spec");
                return None;
            }
        };

        let mut renditions = Vec::with_capacity(formats.len());
        for format in formats.direct_formats() {
            match self.service.get_rendition(image, &filter.with_format(format)) {
                Ok(rendition) => renditions.push(rendition),
                Err(e) => {
                    tracing::warn!(spec, %format, error = %e, "format unavailable for spec");
                }
            }
        }

        if formats.wants_avif() {
            match self.avif_rendition(image, &filter, renditions.first()) {
                Ok(rendition) => renditions.push(rendition),
                Err(e) => tracing::debug!(spec, error = %e, "omitting AVIF"),
            }
        }

        Some(SpecRenditions {
            spec: filter,
            renditions,
        })
    }

    /// Run the AVIF fallback chain for one spec
    ///
    /// # Errors
    /// [`AvifError`] when every step fails; callers omit AVIF.
    pub fn avif_rendition(
        &self,
        image: &SourceImage,
        filter: &FilterSpec,
        base: Option<&Rendition>,
    ) -> Result<Rendition, AvifError> {
        let avif_spec = filter.with_format(&OutputFormat::Avif);
        let focal_point_key = self.service.cache_key(image, filter);

        match self.service.get_rendition(image, &avif_spec) {
            Ok(rendition) => return Ok(rendition),
            Err(e) if e.is_invalid_filter_spec() => {
                tracing::debug!(spec = %avif_spec, "direct AVIF unsupported, checking registry");
            }
            Err(e) => return Err(e.into()),
        }

        if let Some(rendition) = self
            .service
            .find_rendition(image, &avif_spec, &focal_point_key)
        {
            return Ok(rendition);
        }

        let base = base.ok_or(AvifError::NoBaseRendition)?;
        let data = self.service.encode_avif(base)?;
        let file_name = avif_file_name(
            image.stem(),
            &avif_spec,
            &focal_point_key,
            self.avif_name_budget,
        );
        tracing::debug!(spec = %avif_spec, file = %file_name, "registering derived AVIF");
        let rendition = self.service.register_rendition(
            image,
            NewRendition {
                filter_spec: avif_spec,
                focal_point_key,
                file_name,
                width: base.width,
                height: base.height,
                data,
            },
        )?;
        Ok(rendition)
    }
}

/// File name for a derived AVIF variant
///
/// `<stem>.<focal-point key.>?<spec with | as .>.avif`, with the stem
/// truncated so the whole name fits in `budget` characters. The suffix is
/// never truncated and at least one stem character is always kept.
#[must_use]
pub fn avif_file_name(stem: &str, avif_spec: &str, focal_point_key: &str, budget: usize) -> String {
    let mut suffix = format!("{}.avif", avif_spec.replace('|', "."));
    if !focal_point_key.is_empty() {
        suffix = format!("{focal_point_key}.{suffix}");
    }
    let keep = budget.saturating_sub(suffix.chars().count()).max(1);
    let stem: String = stem.chars().take(keep).collect();
    format!("{stem}.{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use picture_rendition::{SimulatedRenditionService, SimulatorConfig};

    fn image() -> SourceImage {
        SourceImage::new(1, "mock", "mock_img.jpg", "hash", 100, 100)
    }

    fn formats(names: &[&str]) -> FormatSet {
        FormatSet::new(names.iter().map(|n| OutputFormat::from(*n)), &[])
    }

    #[test]
    fn avif_name_without_focal_key() {
        assert_eq!(
            avif_file_name("mock_img", "width-50|format-avif", "", 59),
            "mock_img.width-50.format-avif.avif"
        );
    }

    #[test]
    fn avif_name_truncates_stem_only() {
        let stem = "a".repeat(80);
        let name = avif_file_name(&stem, "fill-10x10|format-avif", "deadbeef", 59);
        assert_eq!(name.chars().count(), 59 + 1);
        assert!(name.ends_with(".deadbeef.fill-10x10.format-avif.avif"));

        let name = avif_file_name(&stem, "fill-10x10|format-avif", "deadbeef", 5);
        assert_eq!(name, "a.deadbeef.fill-10x10.format-avif.avif");
    }

    #[test]
    fn avif_name_keeps_a_stem_character_when_suffix_exceeds_budget() {
        assert_eq!(
            avif_file_name("mock_img", "fill-10x10|format-avif", "deadbeef", 20),
            "m.deadbeef.fill-10x10.format-avif.avif"
        );
        assert_eq!(
            avif_file_name("mock_img", "width-50|format-avif", "", 0),
            "m.width-50.format-avif.avif"
        );
    }

    #[test]
    fn resolves_direct_formats_descending_then_avif() {
        let service = SimulatedRenditionService::new();
        let resolver = FormatResolver::new(&service, 59);
        let resolved = resolver
            .resolve(&image(), "width-50", &formats(&["jpeg", "avif", "webp", "png"]))
            .unwrap();
        let specs: Vec<_> = resolved
            .renditions
            .iter()
            .map(|r| r.filter_spec.as_str())
            .collect();
        assert_eq!(
            specs,
            [
                "width-50|format-webp",
                "width-50|format-png",
                "width-50|format-jpeg",
                "width-50|format-avif"
            ]
        );
    }

    #[test]
    fn invalid_and_empty_specs_resolve_to_nothing() {
        let service = SimulatedRenditionService::new();
        let resolver = FormatResolver::new(&service, 59);
        assert!(resolver.resolve(&image(), "bogus-1", &formats(&["webp"])).is_none());
        assert!(resolver.resolve(&image(), "", &formats(&["webp"])).is_none());
        assert_eq!(service.calls(), 0);
    }

    #[test]
    fn avif_prefers_direct_rendition() {
        let service = SimulatedRenditionService::with_config(
            SimulatorConfig::default().with_native_avif(true),
        );
        let resolver = FormatResolver::new(&service, 59);
        let filter = FilterSpec::parse("width-50").unwrap();
        let rendition = resolver.avif_rendition(&image(), &filter, None).unwrap();
        assert_eq!(rendition.file_name, "mock_img.width-50.format-avif.avif");
        assert_eq!(service.calls(), 1);
    }

    #[test]
    fn avif_derives_then_reuses_registered_variant() {
        let service = SimulatedRenditionService::new();
        let resolver = FormatResolver::new(&service, 59);
        let filter = FilterSpec::parse("width-50").unwrap();
        let base = service.get_rendition(&image(), "width-50|format-webp").unwrap();
        service.reset_calls();

        let derived = resolver.avif_rendition(&image(), &filter, Some(&base)).unwrap();
        assert_eq!(derived.file_name, "mock_img.width-50.format-avif.avif");
        assert_eq!((derived.width, derived.height), (base.width, base.height));
        // direct, registry miss, encode, register
        assert_eq!(service.calls(), 4);

        service.reset_calls();
        let again = resolver.avif_rendition(&image(), &filter, None).unwrap();
        assert_eq!(again, derived);
        assert_eq!(service.calls(), 2);
    }

    #[test]
    fn avif_without_base_is_omitted() {
        let service = SimulatedRenditionService::new();
        let resolver = FormatResolver::new(&service, 59);
        let resolved = resolver
            .resolve(&image(), "width-50", &formats(&["avif"]))
            .unwrap();
        assert!(resolved.renditions.is_empty());

        let filter = FilterSpec::parse("width-50").unwrap();
        assert!(matches!(
            resolver.avif_rendition(&image(), &filter, None),
            Err(AvifError::NoBaseRendition)
        ));
    }

    #[test]
    fn avif_encoder_failure_is_omitted() {
        let service = SimulatedRenditionService::with_config(
            SimulatorConfig::default().with_avif_encoder(false),
        );
        let resolver = FormatResolver::new(&service, 59);
        let resolved = resolver
            .resolve(&image(), "width-50", &formats(&["webp", "avif"]))
            .unwrap();
        assert_eq!(resolved.renditions.len(), 1);
        assert_eq!(resolved.renditions[0].extension(), "webp");
    }
}

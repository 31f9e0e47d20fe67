//! Rendition ordering and grouping
//!
//! Within a spec, renditions are ordered smallest file first so the base
//! `<img>` and the first srcset candidates are the cheapest. Across specs,
//! srcset entries are grouped by MIME type in first-seen order.

use crate::directive::PictureRequest;
use crate::markup::mime_type;
use crate::resolve::{FormatResolver, SpecRenditions};
use indexmap::IndexMap;
use picture_rendition::{Rendition, SourceImage};
use std::collections::BTreeSet;

/// Sort by ascending byte size
///
/// Leaves the order untouched and returns `false` if any rendition has no
/// size (its file is missing from storage).
pub fn sort_by_file_size(renditions: &mut [Rendition]) -> bool {
    if renditions.iter().any(|r| r.file_size.is_none()) {
        tracing::debug!("file size unavailable, keeping retrieval order");
        return false;
    }
    renditions.sort_by_key(|r| r.file_size);
    true
}

/// Everything the markup needs from the rendition service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenditionPlan {
    specs: Vec<SpecRenditions>,
    sources: IndexMap<String, Vec<String>>,
    widths: BTreeSet<u32>,
}

impl RenditionPlan {
    /// Resolve and order renditions for every spec of `request`
    #[must_use]
    pub fn build(resolver: &FormatResolver<'_>, image: &SourceImage, request: &PictureRequest) -> Self {
        let mut plan = Self::default();
        for spec in request.filter_specs() {
            if plan.contains_spec(spec) {
                tracing::debug!(%spec, "filter spec repeated, skipping");
                continue;
            }
            if let Some(resolved) = resolver.resolve(image, spec, request.formats()) {
                plan.push(resolved);
            }
        }
        plan
    }

    /// Add one spec's renditions
    ///
    /// A spec that is already planned is ignored so its srcset entries are
    /// not repeated.
    pub fn push(&mut self, mut resolved: SpecRenditions) {
        if self.contains_spec(resolved.spec.as_str()) {
            return;
        }
        sort_by_file_size(&mut resolved.renditions);
        for rendition in &resolved.renditions {
            self.sources
                .entry(mime_type(rendition.extension()))
                .or_default()
                .push(format!("{} {}w", rendition.url, rendition.width));
            self.widths.insert(rendition.width);
        }
        self.specs.push(resolved);
    }

    /// Whether `spec` already has renditions in the plan
    #[must_use]
    pub fn contains_spec(&self, spec: &str) -> bool {
        self.specs.iter().any(|s| s.spec.as_str() == spec.trim())
    }

    /// Rendition used for `<img src>`: the first of the first spec that
    /// produced any
    #[must_use]
    pub fn base(&self) -> Option<&Rendition> {
        self.specs.iter().flat_map(|s| s.renditions.iter()).next()
    }

    /// Whether nothing was produced
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.base().is_none()
    }

    /// Per-spec renditions in tag order (invalid specs omitted)
    #[inline]
    #[must_use]
    pub fn specs(&self) -> &[SpecRenditions] {
        &self.specs
    }

    /// MIME type → srcset entries (`<url> <width>w`)
    #[inline]
    #[must_use]
    pub fn sources(&self) -> &IndexMap<String, Vec<String>> {
        &self.sources
    }

    /// Distinct produced widths, ascending
    #[inline]
    #[must_use]
    pub fn widths(&self) -> &BTreeSet<u32> {
        &self.widths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::parse_directive;
    use picture_rendition::{SimulatedRenditionService, SimulatorConfig};

    fn image() -> SourceImage {
        SourceImage::new(1, "mock", "mock_img.jpg", "hash", 100, 100)
    }

    fn rendition(name: &str, size: Option<u64>) -> Rendition {
        Rendition {
            filter_spec: String::new(),
            url: format!("/images/{name}"),
            file_name: name.to_string(),
            width: 10,
            height: 10,
            file_size: size,
        }
    }

    #[test]
    fn sorts_smallest_first() {
        let mut renditions = vec![
            rendition("a.png", Some(30)),
            rendition("a.webp", Some(10)),
            rendition("a.jpg", Some(20)),
        ];
        assert!(sort_by_file_size(&mut renditions));
        let names: Vec<_> = renditions.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, ["a.webp", "a.jpg", "a.png"]);
    }

    #[test]
    fn missing_size_keeps_order() {
        let mut renditions = vec![rendition("a.png", Some(30)), rendition("a.webp", None)];
        assert!(!sort_by_file_size(&mut renditions));
        assert_eq!(renditions[0].file_name, "a.png");
    }

    #[test]
    fn groups_by_mime_across_specs() {
        let service = SimulatedRenditionService::new();
        let resolver = FormatResolver::new(&service, 59);
        let request = parse_directive(&["img", "width-30", "width-60", "format-webp", "format-jpeg"]).unwrap();
        let plan = RenditionPlan::build(&resolver, &image(), &request);

        assert_eq!(plan.specs().len(), 2);
        assert_eq!(
            plan.sources().keys().collect::<Vec<_>>(),
            ["image/webp", "image/jpeg"]
        );
        assert_eq!(
            plan.sources()["image/webp"],
            [
                "/images/mock_img.width-30.format-webp.webp 30w",
                "/images/mock_img.width-60.format-webp.webp 60w"
            ]
        );
        assert_eq!(plan.widths().iter().copied().collect::<Vec<_>>(), [30, 60]);
        assert_eq!(plan.base().unwrap().file_name, "mock_img.width-30.format-webp.webp");
    }

    #[test]
    fn unsorted_plan_uses_retrieval_order() {
        let service = SimulatedRenditionService::with_config(
            SimulatorConfig::default().with_file_sizes(false),
        );
        let resolver = FormatResolver::new(&service, 59);
        let request = parse_directive(&["img", "width-30", "format-jpeg", "format-png"]).unwrap();
        let plan = RenditionPlan::build(&resolver, &image(), &request);
        assert_eq!(plan.base().unwrap().extension(), "png");
    }

    #[test]
    fn repeated_spec_is_planned_once() {
        let service = SimulatedRenditionService::new();
        let resolver = FormatResolver::new(&service, 59);
        let request = parse_directive(&["img", "width-50", "width-50", "format-webp"]).unwrap();
        let plan = RenditionPlan::build(&resolver, &image(), &request);

        assert_eq!(plan.specs().len(), 1);
        assert_eq!(
            plan.sources()["image/webp"],
            ["/images/mock_img.width-50.format-webp.webp 50w"]
        );

        let single = SimulatedRenditionService::new();
        let single_request = parse_directive(&["img", "width-50", "format-webp"]).unwrap();
        RenditionPlan::build(&FormatResolver::new(&single, 59), &image(), &single_request);
        assert_eq!(service.calls(), single.calls());

        let again = plan.specs()[0].clone();
        let mut plan = plan;
        plan.push(again);
        assert_eq!(plan.specs().len(), 1);
        assert_eq!(plan.sources()["image/webp"].len(), 1);
    }

    #[test]
    fn empty_when_every_spec_is_invalid() {
        let service = SimulatedRenditionService::new();
        let resolver = FormatResolver::new(&service, 59);
        let request = parse_directive(&["img", "bogus", "fill-x"]).unwrap();
        let plan = RenditionPlan::build(&resolver, &image(), &request);
        assert!(plan.is_empty());
        assert!(plan.sources().is_empty());
    }
}

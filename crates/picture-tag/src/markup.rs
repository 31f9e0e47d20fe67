//! `<picture>` markup assembly

use crate::config::SizesStrategy;
use crate::directive::PictureRequest;
use crate::plan::RenditionPlan;
use crate::sizes::{derived_breakpoints, explicit_sizes, media_condition};
use indexmap::IndexMap;
use picture_rendition::SourceImage;
use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};

/// MIME type for a file extension
///
/// Case-insensitive, ignores surrounding dots; `jpg` maps to `image/jpeg`.
#[must_use]
pub fn mime_type(ext: &str) -> String {
    let ext = ext.trim_matches('.').to_ascii_lowercase();
    let kind = if ext == "jpg" { "jpeg" } else { ext.as_str() };
    format!("image/{kind}")
}

/// Escape a value for a double-quoted HTML attribute
#[must_use]
pub fn escape_attr(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '"', '<', '>']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Ordered element attributes
///
/// Renders as `name="value"` pairs in insertion order. `loading="eager"` is
/// the browser default and is never emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs {
    entries: IndexMap<&'static str, String>,
}

impl Attrs {
    /// Create empty attribute list
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With attribute appended (or replaced in place)
    #[must_use]
    pub fn with(mut self, name: &'static str, value: impl ToString) -> Self {
        self.insert(name, value);
        self
    }

    /// Append (or replace in place) an attribute
    pub fn insert(&mut self, name: &'static str, value: impl ToString) {
        self.entries.insert(name, value.to_string());
    }

    /// Attribute string without surrounding whitespace
    #[must_use]
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .filter(|(name, value)| !(**name == "loading" && value.as_str() == "eager"))
            .map(|(name, value)| format!("{name}=\"{}\"", escape_attr(value)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Display for Attrs {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Build the `<picture>` element
///
/// Empty when the plan produced no rendition.
#[must_use]
pub fn assemble(
    plan: &RenditionPlan,
    request: &PictureRequest,
    image: &SourceImage,
    strategy: SizesStrategy,
) -> String {
    let Some(base) = plan.base() else {
        return String::new();
    };

    let sources = match strategy {
        SizesStrategy::Srcset => srcset_sources(plan, request),
        SizesStrategy::MediaQuery => media_sources(plan),
    };

    let img = Attrs::new()
        .with("src", &base.url)
        .with("alt", image.alt())
        .with("width", base.width)
        .with("height", base.height)
        .with("loading", request.loading().as_str());

    let mut picture = String::from("<picture>\n");
    for source in &sources {
        picture.push_str(&format!("    <source {source} />\n"));
    }
    picture.push_str(&format!("    <img {img} />\n</picture>"));
    picture
}

fn srcset_sources(plan: &RenditionPlan, request: &PictureRequest) -> Vec<Attrs> {
    let sizes = if request.has_sizes() {
        explicit_sizes(request.sizes())
    } else {
        derived_breakpoints(plan.widths().iter().copied())
    };
    plan.sources()
        .iter()
        .map(|(mime, srcset)| {
            Attrs::new()
                .with("srcset", srcset.join(", "))
                .with("type", mime)
                .with("sizes", &sizes)
        })
        .collect()
}

fn media_sources(plan: &RenditionPlan) -> Vec<Attrs> {
    let mut sources = Vec::new();
    for spec in plan.specs() {
        for rendition in &spec.renditions {
            let mut attrs = Attrs::new()
                .with("srcset", &rendition.url)
                .with("type", mime_type(rendition.extension()));
            let media = media_condition(&spec.spec, rendition);
            if !media.is_empty() {
                attrs.insert("media", media);
            }
            sources.push(attrs);
        }
    }
    sources
}

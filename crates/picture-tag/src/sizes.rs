//! `sizes` and `media` attribute values
//!
//! Three ways to tell the browser how wide each candidate renders:
//!
//! - explicit `size-...` words → one shared `sizes` value
//! - produced rendition widths → staged breakpoints ending in a default
//! - per-filter-spec media conditions (one `<source>` per breakpoint)
//!
//! [`parse_size`] and [`derived_breakpoints`] are pure and memoized
//! process-wide.

use moka::sync::Cache;
use once_cell::sync::Lazy;
use picture_rendition::{FilterSpec, Operation, Rendition};
use regex::Regex;
use std::fmt::{self, Display, Formatter};

/// Value used for unparseable size words
pub const DEFAULT_SIZE: &str = "100vw";

static SIZE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^size-(((?P<mod>min|max)(?P<width>\d+))-)?(?P<size>\d+(px|vw))$")
        .unwrap_or_else(|e| unreachable!("size pattern is valid: {e}"))
});

static PARSED_SIZES: Lazy<Cache<String, String>> = Lazy::new(|| Cache::new(1_024));
static BREAKPOINTS: Lazy<Cache<Vec<u32>, String>> = Lazy::new(|| Cache::new(1_024));

/// Width bound of a media condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthModifier {
    /// `(min-width: Npx)`
    Min(u32),
    /// `(max-width: Npx)`
    Max(u32),
}

impl Display for WidthModifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Min(px) => write!(f, "(min-width: {px}px)"),
            Self::Max(px) => write!(f, "(max-width: {px}px)"),
        }
    }
}

/// A parsed `size-[min|max<N>-]<N>(px|vw)` word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeSpec {
    /// Optional viewport bound
    pub modifier: Option<WidthModifier>,
    /// CSS length, e.g. `25px` or `50vw`
    pub size: String,
}

impl SizeSpec {
    /// Parse a size word; `None` if it does not match the grammar
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let caps = SIZE_REGEX.captures(raw)?;
        let size = caps.name("size")?.as_str().to_string();
        let modifier = match (caps.name("mod"), caps.name("width")) {
            (Some(m), Some(w)) => {
                let px = w.as_str().parse().ok()?;
                Some(if m.as_str() == "min" {
                    WidthModifier::Min(px)
                } else {
                    WidthModifier::Max(px)
                })
            }
            _ => None,
        };
        Some(Self { modifier, size })
    }
}

impl Display for SizeSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.modifier {
            Some(modifier) => write!(f, "{modifier} {}", self.size),
            None => f.write_str(&self.size),
        }
    }
}

/// Render one size word as a `sizes` entry; unparseable words give `100vw`
#[must_use]
pub fn parse_size(raw: &str) -> String {
    PARSED_SIZES.get_with(raw.to_string(), || {
        SizeSpec::parse(raw).map_or_else(|| DEFAULT_SIZE.to_string(), |spec| spec.to_string())
    })
}

/// `sizes` value from explicit size words, in tag order
#[must_use]
pub fn explicit_sizes<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|w| parse_size(w.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `sizes` value staged over the produced widths
///
/// Widths are sorted and de-duplicated. For `{33, 50, 56}`:
///
/// ```text
/// (max-width: 33px) 33px, (min-width: 33px) and (max-width: 50px) 50px, 56px
/// ```
///
/// Empty input gives an empty string.
#[must_use]
pub fn derived_breakpoints(widths: impl IntoIterator<Item = u32>) -> String {
    let mut widths: Vec<u32> = widths.into_iter().collect();
    widths.sort_unstable();
    widths.dedup();
    BREAKPOINTS.get_with(widths.clone(), || stage_widths(&widths))
}

fn stage_widths(widths: &[u32]) -> String {
    let Some((last, staged)) = widths.split_last() else {
        return String::new();
    };
    let mut stages = Vec::with_capacity(widths.len());
    let mut prev: Option<u32> = None;
    for &width in staged {
        stages.push(match prev {
            None => format!("(max-width: {width}px) {width}px"),
            Some(p) => format!("(min-width: {p}px) and (max-width: {width}px) {width}px"),
        });
        prev = Some(width);
    }
    stages.push(format!("{last}px"));
    stages.join(", ")
}

/// Media condition for one filter spec's `<source>`
///
/// Empty when the operation has no natural breakpoint.
#[must_use]
pub fn media_condition(spec: &FilterSpec, rendition: &Rendition) -> String {
    let Some(operation) = spec.primary() else {
        return String::new();
    };
    let modifier = match operation {
        Operation::Fill { .. } | Operation::Width(_) => {
            operation.spec_size().map(WidthModifier::Max)
        }
        Operation::Min { .. } => operation.spec_size().map(WidthModifier::Min),
        Operation::Max { .. } | Operation::Height(_) | Operation::Scale(_) | Operation::Original => {
            Some(WidthModifier::Max(rendition.width))
        }
        Operation::Format(_) | Operation::Quality { .. } => None,
    };
    modifier.map(|m| m.to_string()).unwrap_or_default()
}

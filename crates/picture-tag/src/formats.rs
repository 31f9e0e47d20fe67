//! Output format selection
//!
//! Group words expand through a fixed table; explicit `format-X` words add a
//! single format. The resulting set is de-duplicated in first-seen order and
//! never empty.

use once_cell::sync::Lazy;
use picture_rendition::OutputFormat;

/// Formats used when a tag requests none
pub static DEFAULT_FORMATS: Lazy<Vec<OutputFormat>> = Lazy::new(|| {
    vec![
        OutputFormat::Webp,
        OutputFormat::Jpeg,
        OutputFormat::Png,
        OutputFormat::Avif,
    ]
});

static TRANSPARENT: [OutputFormat; 3] = [OutputFormat::Png, OutputFormat::Webp, OutputFormat::Avif];
static PHOTO: [OutputFormat; 3] = [OutputFormat::Jpeg, OutputFormat::Webp, OutputFormat::Avif];

/// Formats a group word expands to, if `word` is a group
#[must_use]
pub fn group_formats(word: &str) -> Option<&'static [OutputFormat]> {
    match word {
        "transparent" => Some(&TRANSPARENT),
        "photo" => Some(&PHOTO),
        _ => None,
    }
}

/// De-duplicated, non-empty list of requested output formats
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSet {
    formats: Vec<OutputFormat>,
}

impl FormatSet {
    /// Build from requested formats, falling back to `defaults` (and then
    /// to [`DEFAULT_FORMATS`]) when nothing was requested
    #[must_use]
    pub fn new(requested: impl IntoIterator<Item = OutputFormat>, defaults: &[OutputFormat]) -> Self {
        let mut formats = dedup(requested);
        if formats.is_empty() {
            formats = dedup(defaults.iter().cloned());
        }
        if formats.is_empty() {
            formats = DEFAULT_FORMATS.clone();
        }
        Self { formats }
    }

    /// Formats in first-seen order
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[OutputFormat] {
        &self.formats
    }

    /// Whether `format` was requested
    #[inline]
    #[must_use]
    pub fn contains(&self, format: &OutputFormat) -> bool {
        self.formats.contains(format)
    }

    /// Whether AVIF was requested
    #[inline]
    #[must_use]
    pub fn wants_avif(&self) -> bool {
        self.contains(&OutputFormat::Avif)
    }

    /// Formats requested directly from the rendition service: everything
    /// except AVIF, in descending name order
    #[must_use]
    pub fn direct_formats(&self) -> Vec<&OutputFormat> {
        let mut direct: Vec<_> = self
            .formats
            .iter()
            .filter(|f| **f != OutputFormat::Avif)
            .collect();
        direct.sort_by(|a, b| b.cmp(a));
        direct
    }

    /// Number of formats (never zero)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    /// Whether the set is empty (never after [`FormatSet::new`])
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

fn dedup(formats: impl IntoIterator<Item = OutputFormat>) -> Vec<OutputFormat> {
    let mut out: Vec<OutputFormat> = Vec::new();
    for format in formats {
        if !out.contains(&format) {
            out.push(format);
        }
    }
    out
}

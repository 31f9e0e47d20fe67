//! Tag directive parsing
//!
//! ```text
//! picture <image-expr> [<filter-spec>|format-<fmt>|transparent|photo|size-...|lazy]*
//! ```
//!
//! Only the first token is positional. Directive words never fail to
//! parse: anything unrecognised is kept as a filter spec and validated
//! later by the rendition service.

use crate::config::PictureConfig;
use crate::error::DirectiveError;
use crate::formats::{group_formats, FormatSet, DEFAULT_FORMATS};
use picture_rendition::OutputFormat;
use serde::{Deserialize, Serialize};

/// `<img loading>` value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Loading {
    /// Browser default
    #[default]
    Eager,
    /// Defer until near the viewport
    Lazy,
}

impl Loading {
    /// Attribute value
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eager => "eager",
            Self::Lazy => "lazy",
        }
    }
}

/// A compiled `picture` tag invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureRequest {
    image_expr: String,
    filter_specs: Vec<String>,
    formats: FormatSet,
    loading: Loading,
    sizes: Vec<String>,
}

impl PictureRequest {
    /// Expression naming the image
    #[inline]
    #[must_use]
    pub fn image_expr(&self) -> &str {
        &self.image_expr
    }

    /// Filter specs in tag order
    #[inline]
    #[must_use]
    pub fn filter_specs(&self) -> &[String] {
        &self.filter_specs
    }

    /// Requested formats
    #[inline]
    #[must_use]
    pub fn formats(&self) -> &FormatSet {
        &self.formats
    }

    /// Loading mode
    #[inline]
    #[must_use]
    pub fn loading(&self) -> Loading {
        self.loading
    }

    /// Raw `size-...` words in tag order
    #[inline]
    #[must_use]
    pub fn sizes(&self) -> &[String] {
        &self.sizes
    }

    /// Whether explicit sizes were given
    #[inline]
    #[must_use]
    pub fn has_sizes(&self) -> bool {
        !self.sizes.is_empty()
    }
}

/// Compiles tag arguments into a [`PictureRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveParser {
    default_formats: Vec<OutputFormat>,
}

impl Default for DirectiveParser {
    fn default() -> Self {
        Self {
            default_formats: DEFAULT_FORMATS.clone(),
        }
    }
}

impl DirectiveParser {
    /// Create parser with the built-in default formats
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create parser using the configured default formats
    #[must_use]
    pub fn from_config(config: &PictureConfig) -> Self {
        Self {
            default_formats: config.default_formats.clone(),
        }
    }

    /// Parse tag arguments; the first is the image expression
    ///
    /// # Errors
    /// [`DirectiveError::MissingImage`] when `tokens` is empty.
    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> Result<PictureRequest, DirectiveError> {
        let (image_expr, words) = tokens.split_first().ok_or(DirectiveError::MissingImage)?;

        let mut filter_specs = Vec::new();
        let mut formats = Vec::new();
        let mut loading = Loading::Eager;
        let mut sizes = Vec::new();

        for word in words.iter().map(|w| w.as_ref()) {
            if let Some(group) = group_formats(word) {
                formats.extend_from_slice(group);
            } else if let Some(rest) = word.strip_prefix("format-") {
                match rest.split('-').next() {
                    Some(name) if !name.is_empty() => formats.push(OutputFormat::from(name)),
                    _ => tracing::debug!(word, "ignoring format directive without a format"),
                }
            } else if word.starts_with("size-") {
                sizes.push(word.to_string());
            } else if word == "lazy" {
                loading = Loading::Lazy;
            } else {
                filter_specs.push(word.to_string());
            }
        }

        Ok(PictureRequest {
            image_expr: image_expr.as_ref().to_string(),
            filter_specs,
            formats: FormatSet::new(formats, &self.default_formats),
            loading,
            sizes,
        })
    }
}

/// Parse tag arguments with the built-in default formats
///
/// # Errors
/// [`DirectiveError::MissingImage`] when `tokens` is empty.
pub fn parse_directive<S: AsRef<str>>(tokens: &[S]) -> Result<PictureRequest, DirectiveError> {
    DirectiveParser::new().parse(tokens)
}

//! Error types for filter specs and rendition retrieval

/// Errors in the filter spec grammar
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterSpecError {
    /// Spec (or one `|`-separated operation) is empty
    #[error("empty filter spec")]
    Empty,

    /// Operation name is not registered
    #[error("unrecognised operation: '{0}'")]
    UnknownOperation(String),

    /// Operation arguments are malformed
    #[error("invalid arguments for '{operation}': '{args}'")]
    InvalidArguments { operation: String, args: String },

    /// `format-X` names a format outside the registry
    #[error("Format must be either 'jpeg', 'png', 'gif', 'webp' or 'avif', got '{0}'")]
    UnsupportedFormat(String),
}

impl FilterSpecError {
    /// Create invalid arguments error
    pub fn invalid_arguments(operation: impl Into<String>, args: impl Into<String>) -> Self {
        Self::InvalidArguments {
            operation: operation.into(),
            args: args.into(),
        }
    }
}

/// Errors raised by a [`crate::RenditionService`]
#[derive(Debug, thiserror::Error)]
pub enum RenditionError {
    /// The spec is not valid for this rendition backend
    #[error("invalid filter spec '{spec}': {source}")]
    InvalidFilterSpec {
        spec: String,
        #[source]
        source: FilterSpecError,
    },

    /// No stored rendition matches
    #[error("rendition not found: {0}")]
    NotFound(String),

    /// Encoding a derived variant failed
    #[error("encode failed: {0}")]
    Encode(String),

    /// Backend storage failure
    #[error("storage error: {0}")]
    Storage(String),
}

impl RenditionError {
    /// Create invalid filter spec error
    pub fn invalid_spec(spec: impl Into<String>, source: FilterSpecError) -> Self {
        Self::InvalidFilterSpec {
            spec: spec.into(),
            source,
        }
    }

    /// Whether the backend rejected the spec itself
    #[inline]
    #[must_use]
    pub fn is_invalid_filter_spec(&self) -> bool {
        matches!(self, Self::InvalidFilterSpec { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_display() {
        let err = FilterSpecError::UnsupportedFormat("bmp".to_string());
        assert_eq!(
            err.to_string(),
            "Format must be either 'jpeg', 'png', 'gif', 'webp' or 'avif', got 'bmp'"
        );
    }

    #[test]
    fn invalid_spec_is_classified() {
        let err = RenditionError::invalid_spec("fill-x", FilterSpecError::Empty);
        assert!(err.is_invalid_filter_spec());
        assert!(err.to_string().contains("fill-x"));
        assert!(!RenditionError::NotFound("a".to_string()).is_invalid_filter_spec());
    }
}

//! Error types for the picture tag
//!
//! Rendering itself never fails: every error below is either reported at
//! template compile time ([`DirectiveError`], [`ConfigError`]) or absorbed
//! inside a render with a tracing event ([`CacheError`], rendition errors).

use picture_rendition::RenditionError;
use std::path::PathBuf;

/// Errors while compiling a tag invocation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    /// The invocation has no image expression
    #[error("'picture' tag requires an image expression")]
    MissingImage,
}

/// Errors reported by a markup cache backend
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Backend is not configured or not reachable; caching is skipped
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    /// Backend failed an individual operation
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Errors loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Config is not valid TOML for [`crate::PictureConfig`]
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Config parsed but violates a constraint
    #[error("config validation failed: {0}")]
    Validation(String),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Combined picture tag error
#[derive(Debug, thiserror::Error)]
pub enum PictureError {
    /// Tag invocation rejected
    #[error("directive error: {0}")]
    Directive(#[from] DirectiveError),

    /// Markup cache backend failed
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// Configuration could not be loaded
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Rendition service failed
    #[error("rendition error: {0}")]
    Rendition(#[from] RenditionError),
}

/// Result type alias for picture tag operations
pub type PictureResult<T> = Result<T, PictureError>;

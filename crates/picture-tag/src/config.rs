//! Renderer configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! strategy = "srcset"            # or "media_query"
//! default_formats = ["webp", "jpeg", "png", "avif"]
//! avif_name_budget = 59
//!
//! [cache]
//! enabled = true
//! max_capacity = 10000
//! ttl_secs = 3600
//! ```

use crate::error::ConfigError;
use crate::formats::DEFAULT_FORMATS;
use picture_rendition::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// How `<source>` elements describe their viewport fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizesStrategy {
    /// One `<source>` per MIME type with `srcset` + `sizes`
    #[default]
    Srcset,
    /// One `<source>` per rendition with a `media` condition per filter spec
    MediaQuery,
}

/// Markup cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Use the cache backend at all
    pub enabled: bool,
    /// Maximum cached markup entries
    pub max_capacity: u64,
    /// Entry time-to-live; `None` keeps entries until evicted
    pub ttl_secs: Option<u64>,
}

impl CacheConfig {
    /// Entry time-to-live
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_capacity: 10_000,
            ttl_secs: None,
        }
    }
}

/// Picture renderer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PictureConfig {
    /// Markup strategy
    pub strategy: SizesStrategy,
    /// Formats used when a tag names none
    pub default_formats: Vec<OutputFormat>,
    /// Maximum length of derived AVIF file names
    pub avif_name_budget: usize,
    /// Markup cache settings
    pub cache: CacheConfig,
}

impl PictureConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With markup strategy
    #[inline]
    #[must_use]
    pub fn with_strategy(mut self, strategy: SizesStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// With default formats
    #[inline]
    #[must_use]
    pub fn with_default_formats(mut self, formats: Vec<OutputFormat>) -> Self {
        self.default_formats = formats;
        self
    }

    /// With AVIF file name budget
    #[inline]
    #[must_use]
    pub fn with_avif_name_budget(mut self, budget: usize) -> Self {
        self.avif_name_budget = budget;
        self
    }

    /// With cache settings
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// [`ConfigError::Toml`] for malformed input, [`ConfigError::Validation`]
    /// for constraint violations.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        Self::from_toml_str(&raw)
    }

    /// Check constraints
    ///
    /// # Errors
    /// [`ConfigError::Validation`] if no default format is set, a default
    /// format is not a registered output format, or the AVIF name budget is
    /// zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_formats.is_empty() {
            return Err(ConfigError::Validation(
                "default_formats must not be empty".to_string(),
            ));
        }
        if let Some(format) = self.default_formats.iter().find(|f| !f.is_registered()) {
            return Err(ConfigError::Validation(format!(
                "default_formats contains unsupported format '{format}'"
            )));
        }
        if self.avif_name_budget == 0 {
            return Err(ConfigError::Validation(
                "avif_name_budget must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PictureConfig {
    fn default() -> Self {
        Self {
            strategy: SizesStrategy::default(),
            default_formats: DEFAULT_FORMATS.clone(),
            avif_name_budget: 59,
            cache: CacheConfig::default(),
        }
    }
}

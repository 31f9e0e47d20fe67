//! Rendered markup cache
//!
//! Markup is keyed by a digest of the tag's filter specs, the rendition
//! service's per-spec cache keys and the source file hash. Formats and
//! loading mode are not part of the key, so two tags that differ only in
//! those share an entry.

use crate::error::CacheError;
use crate::config::CacheConfig;
use moka::sync::Cache;
use picture_rendition::{RenditionService, SourceImage};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

/// Key/value store for rendered markup
///
/// Entries are never invalidated by the renderer; backends evict on their
/// own terms.
pub trait MarkupCache: Send + Sync {
    /// Look up rendered markup
    ///
    /// # Errors
    /// [`CacheError::Unavailable`] when the backend is not usable at all,
    /// [`CacheError::Backend`] for a failed lookup.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store rendered markup
    ///
    /// # Errors
    /// As for [`MarkupCache::get`].
    fn set(&self, key: &str, markup: String) -> Result<(), CacheError>;
}

/// Hex-encoded SHA-256 digest identifying one rendering
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Digest of the given parts
    ///
    /// Parts are de-duplicated and sorted, so their order does not matter.
    #[must_use]
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parts: BTreeSet<String> = parts.into_iter().map(Into::into).collect();
        let joined = parts.into_iter().collect::<Vec<_>>().join("|");
        Self(hex::encode(Sha256::digest(joined.as_bytes())))
    }

    /// Hex digest
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cache key for rendering `specs` of `image`
///
/// Each spec contributes itself and, when the service accepts it, the
/// service's cache key for it (e.g. the focal-point key of `fill` specs).
///
/// Formats, loading mode and `size-...` words are not part of the key: tags
/// over the same image and specs that differ only in those get whichever
/// markup was stored first. Such tags must not share one cache.
#[must_use]
pub fn derive_cache_key<S: AsRef<str>>(
    service: &dyn RenditionService,
    image: &SourceImage,
    specs: &[S],
) -> CacheKey {
    let mut parts = Vec::with_capacity(specs.len() * 2 + 1);
    for spec in specs.iter().map(|s| s.as_ref()) {
        if let Ok(filter) = service.validate(spec) {
            parts.push(service.cache_key(image, &filter));
        }
        parts.push(spec.to_string());
    }
    parts.push(image.file_hash.clone());
    CacheKey::from_parts(parts)
}

/// In-process markup cache backed by moka
#[derive(Debug, Clone)]
pub struct MokaMarkupCache {
    inner: Cache<String, String>,
}

impl MokaMarkupCache {
    /// Create cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Create cache with time-based expiration
    #[inline]
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Create cache from config; `None` when caching is disabled
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        Some(match config.ttl() {
            Some(ttl) => Self::with_ttl(config.max_capacity, ttl),
            None => Self::new(config.max_capacity),
        })
    }

    /// Invalidate cache entry
    #[inline]
    pub fn invalidate(&self, key: &str) {
        self.inner.invalidate(key);
    }

    /// Invalidate all entries
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Get approximate entry count
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}

impl Default for MokaMarkupCache {
    /// Create cache with default capacity (10,000 entries)
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl MarkupCache for MokaMarkupCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.inner.get(key))
    }

    fn set(&self, key: &str, markup: String) -> Result<(), CacheError> {
        self.inner.insert(key.to_string(), markup);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picture_rendition::{FocalPoint, SimulatedRenditionService};

    fn image() -> SourceImage {
        SourceImage::new(1, "mock", "mock_img.jpg", "abc123", 100, 100)
    }

    #[test]
    fn key_is_order_independent() {
        let service = SimulatedRenditionService::new();
        let a = derive_cache_key(&service, &image(), &["fill-100x100", "width-50"]);
        let b = derive_cache_key(&service, &image(), &["width-50", "fill-100x100"]);
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn key_varies_with_specs_and_file_hash() {
        let service = SimulatedRenditionService::new();
        let base = derive_cache_key(&service, &image(), &["width-50"]);
        assert_ne!(base, derive_cache_key(&service, &image(), &["width-60"]));

        let mut other = image();
        other.file_hash = "def456".to_string();
        assert_ne!(base, derive_cache_key(&service, &other, &["width-50"]));
    }

    #[test]
    fn key_varies_with_focal_point_for_fill_only() {
        let service = SimulatedRenditionService::new();
        let moved = image().with_focal_point(FocalPoint {
            x: 10,
            y: 10,
            width: 5,
            height: 5,
        });
        assert_ne!(
            derive_cache_key(&service, &image(), &["fill-50x50"]),
            derive_cache_key(&service, &moved, &["fill-50x50"])
        );
        assert_eq!(
            derive_cache_key(&service, &image(), &["width-50"]),
            derive_cache_key(&service, &moved, &["width-50"])
        );
    }

    #[test]
    fn invalid_specs_contribute_only_themselves() {
        let service = SimulatedRenditionService::new();
        let key = derive_cache_key(&service, &image(), &["bogus"]);
        assert_eq!(key, CacheKey::from_parts(["bogus", "abc123"]));
        assert_eq!(service.calls(), 0);
    }

    #[test]
    fn moka_cache_round_trip() {
        let cache = MokaMarkupCache::default();
        assert_eq!(cache.get("k").unwrap(), None);
        cache.set("k", "<picture/>".to_string()).unwrap();
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("<picture/>"));
        assert_eq!(cache.entry_count(), 1);

        cache.invalidate("k");
        assert_eq!(cache.get("k").unwrap(), None);
    }

    #[test]
    fn disabled_config_builds_no_cache() {
        let config = CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        };
        assert!(MokaMarkupCache::from_config(&config).is_none());
        assert!(MokaMarkupCache::from_config(&CacheConfig::default()).is_some());
    }
}

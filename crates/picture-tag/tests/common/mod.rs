//! Markup cache doubles shared by the integration tests

#![allow(dead_code)]

use picture_tag::{CacheError, MarkupCache, MokaMarkupCache};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Backend that reports itself unavailable on every call
#[derive(Debug, Default)]
pub struct UnavailableCache {
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
}

impl MarkupCache for UnavailableCache {
    fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("no cache configured".to_string()))
    }

    fn set(&self, _key: &str, _markup: String) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("no cache configured".to_string()))
    }
}

/// Backend whose every operation fails
#[derive(Debug, Default)]
pub struct FailingCache {
    pub sets: AtomicUsize,
}

impl MarkupCache for FailingCache {
    fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Backend("connection reset".to_string()))
    }

    fn set(&self, _key: &str, _markup: String) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Backend("connection reset".to_string()))
    }
}

/// Moka cache that records the keys it was asked to store
#[derive(Debug, Default)]
pub struct RecordingCache {
    inner: MokaMarkupCache,
    pub keys: parking_lot::Mutex<Vec<String>>,
}

impl MarkupCache for RecordingCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, markup: String) -> Result<(), CacheError> {
        self.keys.lock().push(key.to_string());
        self.inner.set(key, markup)
    }
}

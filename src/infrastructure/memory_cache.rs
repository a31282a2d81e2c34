//! In-memory LRU icon cache.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tracing::trace;

use crate::domain::entities::{IconImage, IconKey};

/// Default maximum number of decoded icons held in memory.
pub const DEFAULT_CAPACITY: usize = 256;

/// Recency-ordered, capacity-bounded map from key to decoded icon.
///
/// No interior locking: the facade is the sole writer, so the cache is a
/// plain owned structure mutated from one context only.
pub struct IconMemoryCache {
    entries: LruCache<IconKey, Arc<IconImage>>,
    hits: u64,
    misses: u64,
}

impl IconMemoryCache {
    /// Creates a cache bounded to `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
            hits: 0,
            misses: 0,
        }
    }

    /// Looks up an icon, promoting it to most recently used on a hit.
    pub fn get(&mut self, key: &IconKey) -> Option<Arc<IconImage>> {
        if let Some(image) = self.entries.get(key) {
            self.hits += 1;
            trace!(key = %key, "memory cache hit");
            Some(image.clone())
        } else {
            self.misses += 1;
            trace!(key = %key, "memory cache miss");
            None
        }
    }

    /// Returns true if the key is cached, without touching recency.
    #[must_use]
    pub fn contains(&self, key: &IconKey) -> bool {
        self.entries.contains(key)
    }

    /// Inserts or updates an entry, evicting the least recently used entries
    /// while the cache exceeds its capacity.
    pub fn put(&mut self, key: IconKey, image: Arc<IconImage>) {
        self.entries.put(key, image);
    }

    /// Returns the number of cached icons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Snapshot of hit/miss counters.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let total = self.hits + self.misses;
        let hit_rate = if total > 0 {
            (self.hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            hit_rate,
            size: self.len(),
        }
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached icons.
    pub size: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} icons, {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.hit_rate, self.hits, self.misses
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icon() -> Arc<IconImage> {
        let img = image::DynamicImage::new_rgba8(4, 4);
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        Arc::new(IconImage::decode(&buf.into_inner(), 18).unwrap())
    }

    #[test]
    fn test_put_and_get() {
        let mut cache = IconMemoryCache::new(10);
        let key = IconKey::new("dm:1:aa");

        cache.put(key.clone(), icon());
        assert!(cache.get(&key).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_eviction_at_capacity() {
        let mut cache = IconMemoryCache::new(2);
        let img = icon();

        cache.put(IconKey::new("k1"), img.clone());
        cache.put(IconKey::new("k2"), img.clone());
        cache.put(IconKey::new("k3"), img);

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&IconKey::new("k1")));
        assert!(cache.contains(&IconKey::new("k2")));
        assert!(cache.contains(&IconKey::new("k3")));
    }

    #[test]
    fn test_get_promotes_recency() {
        let mut cache = IconMemoryCache::new(2);
        let img = icon();

        cache.put(IconKey::new("k1"), img.clone());
        cache.put(IconKey::new("k2"), img.clone());

        // k1 becomes most recent, so k2 is the eviction victim.
        let _ = cache.get(&IconKey::new("k1"));
        cache.put(IconKey::new("k3"), img);

        assert!(cache.contains(&IconKey::new("k1")));
        assert!(!cache.contains(&IconKey::new("k2")));
    }

    #[test]
    fn test_contains_does_not_promote() {
        let mut cache = IconMemoryCache::new(2);
        let img = icon();

        cache.put(IconKey::new("k1"), img.clone());
        cache.put(IconKey::new("k2"), img.clone());

        assert!(cache.contains(&IconKey::new("k1")));
        cache.put(IconKey::new("k3"), img);

        assert!(!cache.contains(&IconKey::new("k1")));
    }

    #[test]
    fn test_stats() {
        let mut cache = IconMemoryCache::new(10);
        cache.put(IconKey::new("k1"), icon());

        let _ = cache.get(&IconKey::new("k1"));
        let _ = cache.get(&IconKey::new("missing"));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }
}

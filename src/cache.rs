//! TTL-bounded cache for resolved component instances.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::key::Key;
use crate::traits::AnyArc;

/// Default lifetime of a cached resolution.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Cache hit/miss counters, taken as a point-in-time snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing or an expired entry.
    pub misses: u64,
    /// Entries currently stored, expired or not.
    pub entries: usize,
}

impl CacheStats {
    /// Hit ratio in `[0.0, 1.0]`; zero when nothing has been looked up.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Entry {
    value: AnyArc,
    stored_at: Instant,
}

/// Resolution cache with per-entry TTL and evict-on-read expiry.
///
/// Expired entries are removed the first time a lookup touches them; an
/// expired hit counts as a miss. The cache never sits between the
/// container and transient services, so disabling it only affects lookup
/// latency, never lifetime semantics.
pub struct ResolutionCache {
    entries: Mutex<HashMap<Key, Entry>>,
    ttl: Duration,
    enabled: AtomicBool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResolutionCache {
    /// Creates an enabled cache with [`DEFAULT_TTL`].
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Creates an enabled cache with the given entry lifetime.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            enabled: AtomicBool::new(true),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Looks up an entry, evicting it first if its TTL has lapsed.
    pub fn get(&self, key: &Key) -> Option<AnyArc> {
        if !self.is_enabled() {
            return None;
        }
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Stores a resolved instance. No-op while the cache is disabled.
    pub fn put(&self, key: Key, value: AnyArc) {
        if !self.is_enabled() {
            return;
        }
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(key, Entry { value, stored_at: Instant::now() });
    }

    /// Drops a single entry, if present.
    pub fn invalidate(&self, key: &Key) {
        self.entries.lock().expect("cache lock poisoned").remove(key);
    }

    /// Proactively evicts every expired entry, returning how many were
    /// removed. Lazy eviction makes this optional housekeeping.
    pub fn invalidate_expired(&self) -> usize {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        before - entries.len()
    }

    /// Drops every entry. Counters are kept.
    pub fn clear(&self) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let dropped = entries.len();
        entries.clear();
        if dropped > 0 {
            debug!(dropped, "resolution cache cleared");
        }
    }

    /// Enables or disables the cache. Disabling also clears it so stale
    /// entries cannot outlive a disable/enable bounce.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
        if !enabled {
            self.clear();
        }
    }

    /// Whether lookups and inserts are currently active.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Point-in-time counters. `entries` may include not-yet-evicted
    /// expired entries.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.lock().expect("cache lock poisoned").len(),
        }
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn key() -> Key {
        crate::key::key_of_type::<String>()
    }

    #[test]
    fn hit_after_put() {
        let cache = ResolutionCache::new();
        cache.put(key(), Arc::new("v".to_owned()));
        assert!(cache.get(&key()).is_some());
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn expired_entry_counts_as_miss() {
        let cache = ResolutionCache::with_ttl(Duration::from_millis(10));
        cache.put(key(), Arc::new("v".to_owned()));
        thread::sleep(Duration::from_millis(25));
        assert!(cache.get(&key()).is_none());
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn sweep_reports_eviction_count() {
        let cache = ResolutionCache::with_ttl(Duration::from_millis(10));
        cache.put(key(), Arc::new("v".to_owned()));
        cache.put(crate::key::key_of_type::<u8>(), Arc::new(1u8));
        thread::sleep(Duration::from_millis(25));
        assert_eq!(cache.invalidate_expired(), 2);
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn disable_clears_entries() {
        let cache = ResolutionCache::new();
        cache.put(key(), Arc::new("v".to_owned()));
        cache.set_enabled(false);
        assert_eq!(cache.stats().entries, 0);
        cache.put(key(), Arc::new("v".to_owned()));
        assert!(cache.get(&key()).is_none());
        cache.set_enabled(true);
        assert!(cache.get(&key()).is_none());
    }
}

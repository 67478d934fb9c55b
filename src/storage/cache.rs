use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use lru::LruCache;
use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::CacheSettings;
use crate::error::{Error, Result};
use crate::feed::Post;
use crate::storage::traits::CursorStore;

/// How a read affects the expiry of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationPolicy {
    /// Expiry is fixed at insertion time.
    Fixed,
    /// Each read pushes expiry to `now + ttl`, never past `created_at + max_lifetime`.
    Sliding { max_lifetime: Duration },
}

/// Cache entry with expiration tracking
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub created_at: Instant,
    pub expires_at: Instant,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            data,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    pub fn access(&mut self, ttl: Duration, policy: ExpirationPolicy) -> &T {
        if let ExpirationPolicy::Sliding { max_lifetime } = policy {
            let hard_cap = self.created_at + max_lifetime;
            self.expires_at = (Instant::now() + ttl).min(hard_cap);
        }

        &self.data
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub total_entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }
}

/// Configuration for cursor store behavior
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub max_entries: usize,
    pub default_ttl: Duration,
    pub cleanup_interval: Duration,
    pub expiration: ExpirationPolicy,
    pub single_use: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::from(&CacheSettings::default())
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        let expiration = if settings.sliding {
            ExpirationPolicy::Sliding { max_lifetime: settings.max_lifetime() }
        } else {
            ExpirationPolicy::Fixed
        };

        Self {
            max_entries: settings.max_entries,
            default_ttl: settings.ttl(),
            cleanup_interval: settings.cleanup_interval(),
            expiration,
            single_use: settings.single_use,
        }
    }
}

/// In-memory cursor store with LRU eviction once `max_entries` is reached
#[derive(Clone)]
pub struct MemoryCursorStore {
    cache: Arc<RwLock<LruCache<String, CacheEntry<Arc<Vec<Post>>>>>>,
    stats: Arc<RwLock<CacheStats>>,
    config: CacheConfig,
}

impl MemoryCursorStore {
    pub fn new(config: CacheConfig) -> Result<Self> {
        let capacity = NonZeroUsize::new(config.max_entries)
            .ok_or_else(|| Error::Config("Cache max entries must be greater than 0".to_string()))?;

        Ok(Self {
            cache: Arc::new(RwLock::new(LruCache::new(capacity))),
            stats: Arc::new(RwLock::new(CacheStats::default())),
            config,
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Store `remaining` under `token` with a caller-chosen TTL.
    pub fn put_with_ttl(&self, token: String, remaining: Vec<Post>, ttl: Duration) -> Result<()> {
        let entry = CacheEntry::new(Arc::new(remaining), ttl);
        let mut cache = self.cache.write();
        let mut stats = self.stats.write();

        if let Some((evicted, _)) = cache.push(token.clone(), entry) {
            if evicted != token {
                stats.record_eviction();
            }
        }

        stats.total_entries = cache.len();
        Ok(())
    }

    /// Whether `token` holds an unexpired cursor. Does not count as a read.
    pub fn contains(&self, token: &str) -> bool {
        self.cache
            .read()
            .peek(token)
            .is_some_and(|entry| !entry.is_expired())
    }

    pub fn clear(&self) {
        let mut cache = self.cache.write();
        let mut stats = self.stats.write();

        cache.clear();
        stats.total_entries = 0;
    }

    /// Get all live tokens (for debugging/testing)
    pub fn keys(&self) -> Vec<String> {
        let cache = self.cache.read();
        cache.iter().map(|(k, _)| k.clone()).collect()
    }
}

impl CursorStore for MemoryCursorStore {
    fn put(&self, token: String, remaining: Vec<Post>) -> Result<()> {
        self.put_with_ttl(token, remaining, self.config.default_ttl)
    }

    fn get(&self, token: &str) -> Option<Arc<Vec<Post>>> {
        let mut cache = self.cache.write();
        let mut stats = self.stats.write();

        let Some(entry) = cache.get_mut(token) else {
            stats.record_miss();
            return None;
        };

        if entry.is_expired() {
            cache.pop(token);
            stats.record_expiration();
            stats.record_miss();
            stats.total_entries = cache.len();
            return None;
        }

        stats.record_hit();
        let remaining = Arc::clone(entry.access(self.config.default_ttl, self.config.expiration));

        if self.config.single_use {
            cache.pop(token);
            stats.total_entries = cache.len();
        }

        Some(remaining)
    }

    fn remove(&self, token: &str) -> bool {
        let mut cache = self.cache.write();
        let mut stats = self.stats.write();

        let removed = cache.pop(token).is_some();
        stats.total_entries = cache.len();
        removed
    }

    fn cleanup_expired(&self) -> usize {
        let mut cache = self.cache.write();
        let mut stats = self.stats.write();
        let now = Instant::now();

        let expired_keys: Vec<String> = cache
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        for key in expired_keys {
            cache.pop(&key);
            stats.record_expiration();
        }

        stats.total_entries = cache.len();
        count
    }

    fn stats(&self) -> CacheStats {
        let mut stats = self.stats.read().clone();
        stats.total_entries = self.len();
        stats
    }

    /// Number of unexpired cursors, whether or not a sweep has run yet.
    fn len(&self) -> usize {
        let now = Instant::now();
        self.cache
            .read()
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .count()
    }
}

/// Periodically sweep expired cursors out of `store`.
///
/// The task never finishes on its own; abort it through the returned handle.
pub fn spawn_cleanup_task(store: Arc<dyn CursorStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = store.cleanup_expired();
            let stats = store.stats();

            if removed > 0 {
                info!(removed, live = stats.total_entries, "Swept expired cursors");
            } else {
                debug!(
                    live = stats.total_entries,
                    hit_rate = stats.hit_rate(),
                    "Cursor sweep found nothing to remove"
                );
            }
        }
    })
}
